//! GitHub infrastructure adapter.
//!
//! Implements the [`directory::MembershipQuery`] port over the GitHub GraphQL
//! API. All GitHub API details (authentication, the query document, HTTP
//! transport, error normalisation) are handled here; the [`directory`] crate
//! never sees them.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. It turns one
//! page request into one authenticated GraphQL call and maps the response
//! into the domain's page types, nothing more.

pub mod auth;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use directory::{
    DirectoryError, MemberId, MemberPage, MemberRecord, MembershipQuery, OrgName, PageCursor,
    PageResult,
};

pub use auth::AppCredentials;

const USER_AGENT: &str = concat!("org-address-book/", env!("CARGO_PKG_VERSION"));

/// The fixed membership query.
///
/// `organizationVerifiedDomainEmails` takes the organisation login again
/// because verification is scoped per organisation, not per user.
const MEMBERS_QUERY: &str = r#"
query ($org: String!, $cursor: String) {
    organization(login: $org) {
        membersWithRole(first: 100, after: $cursor) {
            pageInfo {
                hasNextPage
                endCursor
            }
            nodes {
                login
                organizationVerifiedDomainEmails(login: $org)
                databaseId
            }
        }
    }
}
"#;

/// A bound, authenticated membership query capability.
///
/// Construction performs the one-time installation-token exchange; afterwards
/// each [`fetch_page`](MembershipQuery::fetch_page) call is a single GraphQL
/// POST carrying the minted token.
pub struct GithubMembership {
    http: reqwest::Client,
    graphql_url: String,
    token: String,
}

impl GithubMembership {
    /// Connects against api.github.com.
    pub async fn connect(
        credentials: &AppCredentials,
        org: &OrgName,
    ) -> Result<Self, DirectoryError> {
        Self::connect_to(auth::GITHUB_API, credentials, org).await
    }

    /// Connects against a custom API base (GitHub Enterprise Server).
    pub async fn connect_to(
        api_base: &str,
        credentials: &AppCredentials,
        org: &OrgName,
    ) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| DirectoryError::Transport {
                message: err.to_string(),
            })?;
        let token = auth::installation_token(&http, api_base, credentials, org).await?;
        Ok(Self {
            http,
            graphql_url: format!("{api_base}/graphql"),
            token,
        })
    }
}

#[async_trait]
impl MembershipQuery for GithubMembership {
    async fn fetch_page(
        &self,
        org: &OrgName,
        cursor: Option<&PageCursor>,
    ) -> Result<PageResult, DirectoryError> {
        let body = serde_json::json!({
            "query": MEMBERS_QUERY,
            "variables": {
                "org": org.as_str(),
                "cursor": cursor.map(PageCursor::as_str),
            },
        });

        debug!(org = %org, cursor = ?cursor.map(PageCursor::as_str), "requesting membership page");
        let response = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|err| DirectoryError::Transport {
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GraphQlResponse =
            response
                .json()
                .await
                .map_err(|err| DirectoryError::Transport {
                    message: err.to_string(),
                })?;
        parse_page(payload)
    }
}

// ---------------------------------------------------------------------------
// Response shape and normalisation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<QueryData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Organization {
    members_with_role: MemberConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberConnection {
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<MemberNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberNode {
    #[serde(default)]
    login: String,
    organization_verified_domain_emails: Option<Vec<String>>,
    database_id: Option<u64>,
}

/// Normalises one GraphQL response into the domain's page outcome.
///
/// A populated `errors` array wins over any partial `data`; a null
/// organisation becomes [`PageResult::OrgMissing`]; absent per-member fields
/// become empty rather than deserialization failures.
fn parse_page(payload: GraphQlResponse) -> Result<PageResult, DirectoryError> {
    if let Some(errors) = payload.errors {
        if !errors.is_empty() {
            return Err(DirectoryError::Graph {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }
    }

    let organization = match payload.data.and_then(|data| data.organization) {
        Some(organization) => organization,
        None => return Ok(PageResult::OrgMissing),
    };

    let connection = organization.members_with_role;
    let members = connection
        .nodes
        .into_iter()
        .map(|node| MemberRecord {
            login: node.login,
            verified_emails: node.organization_verified_domain_emails.unwrap_or_default(),
            member_id: node.database_id.map(MemberId::new),
        })
        .collect();

    Ok(PageResult::Page(MemberPage {
        members,
        has_next_page: connection.page_info.has_next_page,
        end_cursor: connection.page_info.end_cursor.and_then(PageCursor::new),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> Result<PageResult, DirectoryError> {
        parse_page(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn full_page_maps_members_and_pagination() {
        let outcome = parse(serde_json::json!({
            "data": {
                "organization": {
                    "membersWithRole": {
                        "pageInfo": { "hasNextPage": true, "endCursor": "CUR1" },
                        "nodes": [
                            {
                                "login": "alice",
                                "organizationVerifiedDomainEmails": ["a@org.com", "a2@org.com"],
                                "databaseId": 101
                            },
                            {
                                "login": "bob",
                                "organizationVerifiedDomainEmails": [],
                                "databaseId": 102
                            }
                        ]
                    }
                }
            }
        }))
        .unwrap();

        let PageResult::Page(page) = outcome else {
            panic!("expected a page");
        };
        assert!(page.has_next_page);
        assert_eq!(page.end_cursor, PageCursor::new("CUR1"));
        assert_eq!(page.members.len(), 2);
        assert_eq!(page.members[0].login, "alice");
        assert_eq!(
            page.members[0].verified_emails,
            vec!["a@org.com".to_string(), "a2@org.com".to_string()]
        );
        assert_eq!(page.members[0].member_id, Some(MemberId::new(101)));
        assert!(page.members[1].verified_emails.is_empty());
    }

    #[test]
    fn final_page_has_no_cursor() {
        let outcome = parse(serde_json::json!({
            "data": {
                "organization": {
                    "membersWithRole": {
                        "pageInfo": { "hasNextPage": false, "endCursor": null },
                        "nodes": []
                    }
                }
            }
        }))
        .unwrap();

        let PageResult::Page(page) = outcome else {
            panic!("expected a page");
        };
        assert!(!page.has_next_page);
        assert_eq!(page.end_cursor, None);
        assert!(page.members.is_empty());
    }

    #[test]
    fn null_organization_is_org_missing() {
        let outcome = parse(serde_json::json!({
            "data": { "organization": null }
        }))
        .unwrap();
        assert_eq!(outcome, PageResult::OrgMissing);
    }

    #[test]
    fn missing_data_entirely_is_org_missing() {
        let outcome = parse(serde_json::json!({})).unwrap();
        assert_eq!(outcome, PageResult::OrgMissing);
    }

    #[test]
    fn errors_array_wins_over_partial_data() {
        let err = parse(serde_json::json!({
            "data": { "organization": null },
            "errors": [
                { "message": "API rate limit exceeded" },
                { "message": "try again later" }
            ]
        }))
        .unwrap_err();

        let DirectoryError::Graph { messages } = err else {
            panic!("expected a GraphQL error");
        };
        assert_eq!(messages, vec!["API rate limit exceeded", "try again later"]);
    }

    #[test]
    fn absent_member_fields_become_empty() {
        let outcome = parse(serde_json::json!({
            "data": {
                "organization": {
                    "membersWithRole": {
                        "pageInfo": { "hasNextPage": false, "endCursor": null },
                        "nodes": [
                            { "login": "carol", "organizationVerifiedDomainEmails": null }
                        ]
                    }
                }
            }
        }))
        .unwrap();

        let PageResult::Page(page) = outcome else {
            panic!("expected a page");
        };
        assert_eq!(page.members[0].login, "carol");
        assert!(page.members[0].verified_emails.is_empty());
        assert_eq!(page.members[0].member_id, None);
    }

    #[test]
    fn query_document_requests_full_pages() {
        assert!(MEMBERS_QUERY.contains("first: 100"));
        assert!(MEMBERS_QUERY.contains("organizationVerifiedDomainEmails(login: $org)"));
    }
}
