//! The seam between the collection model and wherever collections and files are persisted.
//!
//! [`ResourceStore`] is implemented by the HTTP client in `folio_extensions` and by scripted
//! fakes in tests. Every method is a suspension point; the model itself never blocks.

use std::error::Error as StdError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::FlatRecord;

/// A file as returned by [`ResourceStore::get_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// Payload for creating or updating a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePayload {
    pub collection_id: String,
    /// `None` asks the store to create a new file.
    pub file_id: Option<String>,
    pub file_name: String,
    pub content: String,
}

impl FilePayload {
    pub fn new(
        collection_id: impl Into<String>,
        file_id: Option<String>,
        file_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            collection_id: collection_id.into(),
            file_id,
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Payload for creating a collection record directly (outside of a structure save).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCollection {
    pub collection_id: String,
    pub collection_name: String,
    pub parent_id: Option<String>,
}

/// Acknowledgement of a file write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    #[error("Store error: status={status}, message={message}")]
    Api { status: u16, message: String },

    #[error("Malformed store response: {0}")]
    Malformed(String),

    #[error("Not found in store: {0}")]
    NotFound(String),

    #[error("Store rejected the request: {0}")]
    Rejected(String),
}

/// Remote persistence for collections and files.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Flat collection records, each embedding its file list.
    async fn get_collection_structure(&self) -> Result<Vec<FlatRecord>, StoreError>;

    /// Replaces the persisted collection skeleton.
    async fn save_collection_structure(&self, records: &[FlatRecord]) -> Result<(), StoreError>;

    /// Content and metadata of one file; `Ok(None)` when the store does not know the id.
    async fn get_file(&self, file_id: &str) -> Result<Option<StoredFile>, StoreError>;

    /// Creates the file when `file_id` is absent or unknown to the store, otherwise updates it.
    async fn save_file(&self, file: &FilePayload) -> Result<SaveOutcome, StoreError>;

    /// Creates a file under a caller-generated id without probing for an existing one.
    async fn create_file(&self, file: &FilePayload) -> Result<SaveOutcome, StoreError>;

    async fn delete_file(&self, file_id: &str) -> Result<(), StoreError>;

    async fn rename_collection(&self, collection_id: &str, new_name: &str) -> Result<(), StoreError>;

    async fn delete_collection(&self, collection_id: &str) -> Result<(), StoreError>;

    async fn create_collection(&self, collection: &NewCollection) -> Result<(), StoreError>;
}
