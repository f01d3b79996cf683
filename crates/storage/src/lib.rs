//! Object-storage infrastructure adapter.
//!
//! Implements the [`directory::DocumentSink`] port over [`object_store`] and
//! owns the publish sequence for a finished [`AddressBook`]: each of the
//! three mappings is serialized independently (pretty-printed JSON) and
//! written under its own fixed key as its own storage call.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Bucket configuration, content-type headers, and write
//! transport live here. The [`directory`] crate sees only
//! [`directory::DocumentSink`].

use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use tracing::info;

use directory::{AddressBook, DirectoryError, DocumentSink};

/// Key of the login -> emails document.
pub const USERNAME_KEY: &str = "AddressBook/addressBookUsernameKey.json";
/// Key of the email -> login document.
pub const EMAIL_KEY: &str = "AddressBook/addressBookEmailKey.json";
/// Key of the login -> member id document.
pub const ID_KEY: &str = "AddressBook/addressBookIDKey.json";

/// A [`DocumentSink`] backed by any [`ObjectStore`] implementation.
///
/// Production runs hand this an S3 store built from [`s3_sink`]; tests hand
/// it an `InMemory` store.
pub struct ObjectStoreSink {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreSink {
    /// Wraps an existing object store.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

/// Builds an S3-backed sink for `bucket`.
///
/// Region and credentials come from the ambient AWS environment, which is how
/// the scheduled task is deployed.
pub fn s3_sink(bucket: &str) -> Result<ObjectStoreSink, DirectoryError> {
    let store = AmazonS3Builder::from_env()
        .with_bucket_name(bucket)
        .build()
        .map_err(|err| DirectoryError::Configuration {
            message: format!("cannot configure S3 bucket '{bucket}': {err}"),
        })?;
    Ok(ObjectStoreSink::new(Arc::new(store)))
}

#[async_trait]
impl DocumentSink for ObjectStoreSink {
    async fn put_json(&self, key: &str, body: Vec<u8>) -> Result<(), DirectoryError> {
        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, "application/json".into());
        let options = PutOptions {
            attributes,
            ..Default::default()
        };
        self.store
            .put_opts(&Path::from(key), PutPayload::from(body), options)
            .await
            .map_err(|err| DirectoryError::Storage {
                key: key.to_string(),
                message: err.to_string(),
            })?;
        info!(key, "document written");
        Ok(())
    }
}

/// Serializes and writes the three address-book documents.
///
/// The writes are independent and sequential, and earlier documents are not
/// rolled back when a later write fails; overlapping output from two runs
/// resolves as last-writer-wins at the storage layer.
pub async fn publish_address_book(
    sink: &dyn DocumentSink,
    book: &AddressBook,
) -> Result<(), DirectoryError> {
    sink.put_json(USERNAME_KEY, to_pretty_json(USERNAME_KEY, &book.emails_by_login)?)
        .await?;
    sink.put_json(EMAIL_KEY, to_pretty_json(EMAIL_KEY, &book.login_by_email)?)
        .await?;
    sink.put_json(ID_KEY, to_pretty_json(ID_KEY, &book.id_by_login)?)
        .await?;
    info!(members = book.len(), "address book published");
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(key: &str, value: &T) -> Result<Vec<u8>, DirectoryError> {
    serde_json::to_vec_pretty(value).map_err(|err| DirectoryError::Storage {
        key: key.to_string(),
        message: format!("serialization failed: {err}"),
    })
}
