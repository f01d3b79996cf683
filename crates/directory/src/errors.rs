//! The cross-cutting error type for the address-book domain.
//!
//! [`DirectoryError`] covers every condition that fails a run outright.
//! An absent organisation is deliberately *not* represented here; it is an
//! expected alternative outcome modelled by
//! [`Aggregation::OrgNotFound`](crate::aggregator::Aggregation), which callers
//! must branch on explicitly.

use thiserror::Error;

/// Errors that fail an address-book run.
///
/// Every variant maps to a distinct caller-facing status at the entry point.
/// None of these are retried anywhere in this workspace; transport retries,
/// where they exist, belong to the HTTP and storage collaborators.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A required configuration input is missing or invalid.
    ///
    /// Detected before any network call is made.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The GitHub App installation token could not be obtained.
    ///
    /// Produced during the one-time credential setup, before the first page
    /// request. The aggregation never runs if this step fails.
    #[error("Installation token exchange failed: {message}")]
    TokenExchange {
        /// Description of the exchange failure.
        message: String,
    },

    /// The HTTP transport failed before a response was received.
    #[error("Transport failure: {message}")]
    Transport {
        /// Description of the underlying transport error.
        message: String,
    },

    /// The API answered with a non-success HTTP status.
    #[error("API request failed with status {status}: {body}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Response body, as returned by the API.
        body: String,
    },

    /// The GraphQL response carried an `errors` array.
    #[error("GraphQL query failed: {}", messages.join("; "))]
    Graph {
        /// Messages from the response's `errors` array, in delivered order.
        messages: Vec<String>,
    },

    /// A document could not be written to object storage.
    #[error("Failed to write '{key}' to storage: {message}")]
    Storage {
        /// Logical key of the document that failed to write.
        key: String,
        /// Description of the storage failure.
        message: String,
    },
}

impl DirectoryError {
    /// Creates a [`DirectoryError::Configuration`] from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
