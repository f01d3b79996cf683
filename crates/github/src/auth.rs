//! GitHub App credentials and installation-token exchange.
//!
//! A run authenticates as a GitHub App installation: a short-lived RS256
//! assertion signed with the App's private key is exchanged for an
//! installation token scoped to the target organisation. The exchange happens
//! once, before the first page request, and the minted token is reused for
//! every page. Failures are tagged [`DirectoryError::TokenExchange`] so the
//! entry point can report them distinctly from query failures.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use directory::{DirectoryError, OrgName};

/// GitHub REST base used for the token exchange.
pub(crate) const GITHUB_API: &str = "https://api.github.com";

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Claims of the App assertion.
///
/// `iat` is backdated 60 seconds to absorb clock drift between this host and
/// GitHub; `exp` stays inside GitHub's 10-minute ceiling.
#[derive(Debug, Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

/// A GitHub App identity: client id plus RS256 signing key.
pub struct AppCredentials {
    client_id: String,
    signing_key: EncodingKey,
}

impl std::fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCredentials")
            .field("client_id", &self.client_id)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

impl AppCredentials {
    /// Creates credentials from the App client id and the PEM-encoded private
    /// key downloaded from the App settings page.
    pub fn from_pem(client_id: impl Into<String>, pem: &[u8]) -> Result<Self, DirectoryError> {
        let signing_key = EncodingKey::from_rsa_pem(pem).map_err(|err| {
            DirectoryError::TokenExchange {
                message: format!("App private key is not a valid RSA PEM: {err}"),
            }
        })?;
        Ok(Self {
            client_id: client_id.into(),
            signing_key,
        })
    }

    /// Signs a fresh App assertion.
    fn app_assertion(&self) -> Result<String, DirectoryError> {
        let now = Utc::now().timestamp();
        let claims = AppClaims {
            iat: now - 60,
            exp: now + 9 * 60,
            iss: self.client_id.clone(),
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key).map_err(|err| {
            DirectoryError::TokenExchange {
                message: format!("failed to sign App assertion: {err}"),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct Installation {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct InstallationToken {
    token: String,
}

/// Exchanges the App credentials for an installation token scoped to `org`.
///
/// Resolves the organisation's installation id, then mints an access token
/// for it. A 404 on the first call means the App is not installed on the
/// organisation, which is a credential problem, not a missing organisation.
pub(crate) async fn installation_token(
    http: &reqwest::Client,
    api_base: &str,
    credentials: &AppCredentials,
    org: &OrgName,
) -> Result<String, DirectoryError> {
    let assertion = credentials.app_assertion()?;

    let url = format!("{api_base}/orgs/{org}/installation");
    let response = http
        .get(&url)
        .bearer_auth(&assertion)
        .header(reqwest::header::ACCEPT, GITHUB_JSON)
        .send()
        .await
        .map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DirectoryError::TokenExchange {
            message: format!(
                "no App installation for organisation '{org}' (status {status}): {body}"
            ),
        });
    }
    let installation: Installation = response.json().await.map_err(transport)?;
    debug!(org = %org, installation = installation.id, "resolved App installation");

    let url = format!("{api_base}/app/installations/{}/access_tokens", installation.id);
    let response = http
        .post(&url)
        .bearer_auth(&assertion)
        .header(reqwest::header::ACCEPT, GITHUB_JSON)
        .send()
        .await
        .map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(DirectoryError::TokenExchange {
            message: format!(
                "failed to mint installation token for '{org}' (status {status}): {body}"
            ),
        });
    }
    let minted: InstallationToken = response.json().await.map_err(transport)?;
    Ok(minted.token)
}

fn transport(err: reqwest::Error) -> DirectoryError {
    DirectoryError::TokenExchange {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_pem_is_a_token_exchange_error() {
        let err = AppCredentials::from_pem("Iv1.abc", b"not a pem").unwrap_err();
        assert!(matches!(err, DirectoryError::TokenExchange { .. }));
        assert!(err.to_string().contains("RSA PEM"));
    }

    #[test]
    fn app_claims_serialize_with_issuer() {
        let claims = AppClaims {
            iat: 1_700_000_000,
            exp: 1_700_000_540,
            iss: "Iv1.abc".to_string(),
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["iss"], "Iv1.abc");
        assert_eq!(value["exp"].as_i64().unwrap() - value["iat"].as_i64().unwrap(), 540);
    }
}
