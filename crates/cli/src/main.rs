//! Address-book generator entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — load and validate [`config::Config`] from the
//!    environment before anything else runs.
//! 2. **Wire observability** — configure `tracing-subscriber` with a JSON
//!    formatter and an `EnvFilter`. All `tracing` events emitted by every
//!    crate in the workspace flow through this layer, tagged with a fresh
//!    [`RunId`].
//! 3. **Construct infrastructure** — App credentials, the GitHub membership
//!    query, and the S3 document sink, injected into the aggregation.
//! 4. **Translate the outcome** — one [`RunStatus`] per run, mapped to a
//!    distinct process exit code; never a raw panic surface.

mod config;

use std::process::ExitCode;

use tracing::{error, info, Instrument};
use tracing_subscriber::EnvFilter;

use config::Config;
use directory::{aggregate, Aggregation, DirectoryError, RunId};
use github::{AppCredentials, GithubMembership};
use storage::publish_address_book;

/// Final status of one run.
///
/// The fixed set of outcomes a scheduler or operator can branch on. Each maps
/// to its own exit code so a failed run is distinguishable without parsing
/// log output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RunStatus {
    /// Address book generated and all three documents stored.
    Success { user_entries: usize },
    /// A required configuration input is missing or invalid.
    BadConfiguration,
    /// The organisation does not exist or is inaccessible.
    NotFound,
    /// GitHub (token exchange, transport, or the query itself) failed.
    UpstreamFailure,
    /// The address book was built but could not be fully stored.
    StorageFailure,
}

impl RunStatus {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Success { .. } => ExitCode::SUCCESS,
            Self::BadConfiguration => ExitCode::from(2),
            Self::NotFound => ExitCode::from(3),
            Self::UpstreamFailure => ExitCode::from(4),
            Self::StorageFailure => ExitCode::from(5),
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { user_entries } => {
                write!(f, "address book generated and stored ({user_entries} members)")
            }
            Self::BadConfiguration => write!(f, "missing or invalid configuration"),
            Self::NotFound => write!(f, "organisation not found"),
            Self::UpstreamFailure => write!(f, "GitHub request failed"),
            Self::StorageFailure => write!(f, "failed to write address book to storage"),
        }
    }
}

/// Maps a run-failing error onto its caller-facing status.
fn failure_status(err: &DirectoryError) -> RunStatus {
    match err {
        DirectoryError::Configuration { .. } => RunStatus::BadConfiguration,
        DirectoryError::Storage { .. } => RunStatus::StorageFailure,
        DirectoryError::TokenExchange { .. }
        | DirectoryError::Transport { .. }
        | DirectoryError::Api { .. }
        | DirectoryError::Graph { .. } => RunStatus::UpstreamFailure,
    }
}

/// One full run: token exchange, membership walk, publish.
async fn run(config: &Config) -> Result<RunStatus, DirectoryError> {
    let pem = std::fs::read(&config.private_key_path).map_err(|err| {
        DirectoryError::configuration(format!(
            "cannot read App private key at '{}': {err}",
            config.private_key_path.display()
        ))
    })?;
    let credentials = AppCredentials::from_pem(&config.app_client_id, &pem)?;
    let sink = storage::s3_sink(&config.bucket)?;

    let query = GithubMembership::connect(&credentials, &config.org).await?;
    match aggregate(&query, &config.org).await? {
        Aggregation::OrgNotFound { message } => {
            error!(org = %config.org, message, "nothing stored");
            Ok(RunStatus::NotFound)
        }
        Aggregation::Complete(book) => {
            let user_entries = book.len();
            publish_address_book(&sink, &book).await?;
            Ok(RunStatus::Success { user_entries })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %format!("{err:#}"), "configuration invalid");
            return RunStatus::BadConfiguration.exit_code();
        }
    };

    let run_id = RunId::new_random();
    let span = tracing::info_span!("generate", run_id = %run_id, org = %config.org);
    let status = async {
        match run(&config).await {
            Ok(status) => status,
            Err(err) => {
                error!(error = %err, "run failed");
                failure_status(&err)
            }
        }
    }
    .instrument(span)
    .await;

    match &status {
        RunStatus::Success { .. } => info!(status = %status, "run complete"),
        _ => error!(status = %status, "run did not complete"),
    }
    status.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_kind_maps_to_a_distinct_failure_status() {
        let cases = [
            (
                DirectoryError::configuration("missing GITHUB_ORG"),
                RunStatus::BadConfiguration,
            ),
            (
                DirectoryError::TokenExchange {
                    message: "no installation".to_string(),
                },
                RunStatus::UpstreamFailure,
            ),
            (
                DirectoryError::Transport {
                    message: "connection reset".to_string(),
                },
                RunStatus::UpstreamFailure,
            ),
            (
                DirectoryError::Api {
                    status: 502,
                    body: "bad gateway".to_string(),
                },
                RunStatus::UpstreamFailure,
            ),
            (
                DirectoryError::Graph {
                    messages: vec!["rate limited".to_string()],
                },
                RunStatus::UpstreamFailure,
            ),
            (
                DirectoryError::Storage {
                    key: "AddressBook/addressBookUsernameKey.json".to_string(),
                    message: "access denied".to_string(),
                },
                RunStatus::StorageFailure,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(failure_status(&err), expected);
        }
    }

    #[test]
    fn exit_codes_are_distinct_per_status() {
        let statuses = [
            RunStatus::Success { user_entries: 0 },
            RunStatus::BadConfiguration,
            RunStatus::NotFound,
            RunStatus::UpstreamFailure,
            RunStatus::StorageFailure,
        ];
        let codes: Vec<String> = statuses.iter().map(|s| format!("{:?}", s.exit_code())).collect();
        let mut deduped = codes.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), codes.len());
    }
}
