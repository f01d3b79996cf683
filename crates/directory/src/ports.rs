//! Port traits implemented by infrastructure crates.
//!
//! The domain sees exactly two capabilities: a way to fetch one membership
//! page ([`MembershipQuery`]) and a way to persist one finished document
//! ([`DocumentSink`]). Authentication, HTTP transport, bucket naming, and
//! storage durability all live behind these traits.

use async_trait::async_trait;

use crate::{DirectoryError, MemberPage, OrgName, PageCursor};

/// Outcome of one page request.
///
/// An absent organisation is a structured alternative, not an error; the
/// aggregator fails closed to a not-found result when it sees [`OrgMissing`]
/// on any page.
///
/// [`OrgMissing`]: PageResult::OrgMissing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    /// The organisation exists; one page of its membership.
    Page(MemberPage),
    /// The organisation is absent or inaccessible to the calling credential.
    OrgMissing,
}

/// Executes the membership query for one page.
///
/// Implementations own the query document, authentication headers, and error
/// normalisation. They must not retry: transport and protocol failures are
/// surfaced unchanged as [`DirectoryError`] values.
#[async_trait]
pub trait MembershipQuery: Send + Sync {
    /// Fetches up to one full page of members, continuing from `cursor`.
    ///
    /// `cursor = None` requests the first page.
    async fn fetch_page(
        &self,
        org: &OrgName,
        cursor: Option<&PageCursor>,
    ) -> Result<PageResult, DirectoryError>;
}

/// Persists one serialized document under a logical key.
///
/// The domain hands over a key and a payload; bucket naming, content-type
/// headers, and write durability are the implementation's concern.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Writes `body` under `key`, overwriting any previous document.
    async fn put_json(&self, key: &str, body: Vec<u8>) -> Result<(), DirectoryError>;
}
