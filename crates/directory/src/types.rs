//! Shared value types for the address-book domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! structured values that participate in the aggregation: the raw member
//! records delivered per page and the finished [`AddressBook`] mappings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{MemberId, PageCursor};

// ---------------------------------------------------------------------------
// Page-level inputs
// ---------------------------------------------------------------------------

/// One organisation member as delivered by a membership page.
///
/// `login` may be empty and `verified_emails` may be empty; both cases are
/// skipped (with a warning) by the aggregator rather than rejected upstream,
/// so the record type places no invariants on its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    /// The member's GitHub login.
    pub login: String,
    /// Verified organisation-domain email addresses, in delivered order.
    pub verified_emails: Vec<String>,
    /// GitHub's numeric id for the member, when the API supplied one.
    pub member_id: Option<MemberId>,
}

/// One page of the membership connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPage {
    /// Member records in API-delivered order. No sorting is applied anywhere.
    pub members: Vec<MemberRecord>,
    /// Whether a further page exists.
    pub has_next_page: bool,
    /// Continuation token for the next request; `None` on the final page.
    pub end_cursor: Option<PageCursor>,
}

// ---------------------------------------------------------------------------
// The finished address book
// ---------------------------------------------------------------------------

/// The three lookup tables built from one full membership walk.
///
/// All three maps are keyed deterministically (`BTreeMap`) so the serialized
/// documents are stable across runs with identical membership. The inverse
/// map flattens the one-to-many login/email relation; if the same verified
/// email were ever attributed to two logins the later-processed entry wins.
/// That collision is not expected under GitHub's domain-verification model
/// and is not detected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBook {
    /// login -> verified emails, in delivered order.
    pub emails_by_login: BTreeMap<String, Vec<String>>,
    /// email -> login, the flattened inverse of `emails_by_login`.
    pub login_by_email: BTreeMap<String, String>,
    /// login -> numeric member id, for members whose id was supplied.
    pub id_by_login: BTreeMap<String, MemberId>,
}

impl AddressBook {
    /// Creates an empty address book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one accepted member into the three mappings.
    ///
    /// The caller has already filtered out records with an empty login or no
    /// verified emails; this method applies no such checks itself.
    pub fn insert(&mut self, member: MemberRecord) {
        for email in &member.verified_emails {
            self.login_by_email
                .insert(email.clone(), member.login.clone());
        }
        if let Some(id) = member.member_id {
            self.id_by_login.insert(member.login.clone(), id);
        }
        self.emails_by_login
            .insert(member.login, member.verified_emails);
    }

    /// Number of logins in the address book.
    pub fn len(&self) -> usize {
        self.emails_by_login.len()
    }

    /// Returns `true` if no member was accepted.
    pub fn is_empty(&self) -> bool {
        self.emails_by_login.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(login: &str, emails: &[&str], id: Option<u64>) -> MemberRecord {
        MemberRecord {
            login: login.to_string(),
            verified_emails: emails.iter().map(|e| e.to_string()).collect(),
            member_id: id.map(MemberId::new),
        }
    }

    #[test]
    fn insert_builds_all_three_mappings() {
        let mut book = AddressBook::new();
        book.insert(record("alice", &["a@org.com", "a2@org.com"], Some(101)));

        assert_eq!(
            book.emails_by_login["alice"],
            vec!["a@org.com".to_string(), "a2@org.com".to_string()]
        );
        assert_eq!(book.login_by_email["a@org.com"], "alice");
        assert_eq!(book.login_by_email["a2@org.com"], "alice");
        assert_eq!(book.id_by_login["alice"], MemberId::new(101));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn insert_without_member_id_leaves_id_map_untouched() {
        let mut book = AddressBook::new();
        book.insert(record("bob", &["b@org.com"], None));

        assert_eq!(book.len(), 1);
        assert!(book.id_by_login.is_empty());
    }

    #[test]
    fn member_id_serializes_as_a_bare_integer() {
        let mut book = AddressBook::new();
        book.insert(record("alice", &["a@org.com"], Some(101)));

        let value = serde_json::to_value(&book.id_by_login).unwrap();
        assert_eq!(value, serde_json::json!({ "alice": 101 }));
    }

    #[test]
    fn duplicate_email_across_logins_keeps_the_later_entry() {
        let mut book = AddressBook::new();
        book.insert(record("alice", &["shared@org.com"], None));
        book.insert(record("bob", &["shared@org.com"], None));

        assert_eq!(book.login_by_email["shared@org.com"], "bob");
        assert_eq!(book.len(), 2);
    }
}
