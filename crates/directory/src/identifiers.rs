//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct
//! newtype wrapping a primitive. This prevents accidentally interchanging, for
//! example, an [`OrgName`] with a [`PageCursor`] even though both are `String`
//! under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// A GitHub organisation login (e.g. `"my-company"`).
    ///
    /// The organisation whose membership is walked. An empty value is rejected
    /// at construction so a missing configuration field can never reach the
    /// query layer.
    OrgName
}

string_id! {
    /// An opaque pagination token returned by the membership connection.
    ///
    /// `Option<PageCursor>` carries the position semantics: `None` means
    /// "from the start" in a request and "no further pages" in a response.
    /// The token's contents are never inspected, only echoed back.
    PageCursor
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub-integer-backed
// ---------------------------------------------------------------------------

/// Identifies an organisation member by GitHub's numeric `databaseId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(u64);

impl MemberId {
    /// Creates a new identifier from a raw integer.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single invocation of the address-book generator.
///
/// Generated fresh for every run; propagated through spans so all activity
/// from a single invocation can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_name_rejects_empty() {
        assert!(OrgName::new("").is_none());
        assert_eq!(OrgName::new("my-org").unwrap().as_str(), "my-org");
    }

    #[test]
    fn page_cursor_round_trips() {
        let cursor = PageCursor::new("Y3Vyc29yOnYyOpHOAAE=").unwrap();
        assert_eq!(cursor.to_string(), "Y3Vyc29yOnYyOpHOAAE=");
    }
}
