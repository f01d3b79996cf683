//! Runtime configuration, loaded once at startup.
//!
//! Every required field is enumerated here and validated before any network
//! call is made; the rest of the workspace receives the finished struct and
//! never reads the environment itself.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use directory::OrgName;

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Organisation whose membership is walked.
    pub org: OrgName,
    /// GitHub App client id, the `iss` claim of the App assertion.
    pub app_client_id: String,
    /// Path to the App's PEM-encoded RSA private key.
    pub private_key_path: PathBuf,
    /// Bucket the address-book documents are written to.
    pub bucket: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load a .env file if present (development).
        let _ = dotenv();

        let org = env::var("GITHUB_ORG").context("GITHUB_ORG must be set")?;
        Ok(Self {
            org: OrgName::new(org).context("GITHUB_ORG must not be empty")?,
            app_client_id: env::var("GITHUB_APP_CLIENT_ID")
                .context("GITHUB_APP_CLIENT_ID must be set")?,
            private_key_path: env::var("GITHUB_APP_PRIVATE_KEY_PATH")
                .context("GITHUB_APP_PRIVATE_KEY_PATH must be set")?
                .into(),
            bucket: env::var("S3_BUCKET_NAME").context("S3_BUCKET_NAME must be set")?,
        })
    }
}
