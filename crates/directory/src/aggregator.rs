//! The paginated membership aggregation algorithm.
//!
//! One call to [`aggregate`] walks the organisation's membership connection
//! page by page and folds every accepted member into an [`AddressBook`].
//! Pagination is cursor-chained, so pages are fetched strictly sequentially;
//! the mappings are local to the call and returned whole at the end. Nothing
//! is persisted from here.

use tracing::{error, info, warn};

use crate::{AddressBook, DirectoryError, MembershipQuery, OrgName, PageCursor, PageResult};

/// Result of a completed membership walk.
///
/// An absent organisation is an expected outcome the caller must branch on,
/// kept separate from [`DirectoryError`] so it can map to a distinct
/// caller-facing status (not-found rather than upstream failure).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    /// All pages were consumed; the finished address book.
    Complete(AddressBook),
    /// The organisation does not exist or is inaccessible.
    OrgNotFound {
        /// Human-readable description naming the requested organisation.
        message: String,
    },
}

/// Walks every membership page of `org` and builds the address book.
///
/// Per-record anomalies (empty login, no verified emails) are skipped with a
/// warning and never fail the walk. A transport or protocol error from the
/// query capability fails the whole aggregation; no partial book is returned
/// and nothing is retried here. An absent organisation on *any* page fails
/// closed to [`Aggregation::OrgNotFound`]: past the first page that would be
/// a transient anomaly, and dropping the remaining pages silently would leave
/// a truncated book indistinguishable from a complete one.
pub async fn aggregate(
    query: &dyn MembershipQuery,
    org: &OrgName,
) -> Result<Aggregation, DirectoryError> {
    let mut book = AddressBook::new();
    let mut cursor: Option<PageCursor> = None;
    let mut pages: u32 = 0;

    loop {
        let page = match query.fetch_page(org, cursor.as_ref()).await? {
            PageResult::Page(page) => page,
            PageResult::OrgMissing => {
                let message = format!("Organisation '{org}' not found or inaccessible");
                error!(org = %org, page = pages, "organisation not found or inaccessible");
                return Ok(Aggregation::OrgNotFound { message });
            }
        };
        pages += 1;

        for member in page.members {
            if member.login.is_empty() {
                warn!("skipping member with empty login");
                continue;
            }
            if member.verified_emails.is_empty() {
                warn!(
                    login = %member.login,
                    "skipping member '{}' with no verified domain emails",
                    member.login
                );
                continue;
            }
            book.insert(member);
        }

        if !page.has_next_page {
            break;
        }
        // Trust the API's pagination metadata: hasNextPage drives the loop and
        // endCursor is echoed back verbatim on the next request.
        cursor = page.end_cursor;
    }

    info!(org = %org, pages, members = book.len(), "membership walk complete");
    Ok(Aggregation::Complete(book))
}
