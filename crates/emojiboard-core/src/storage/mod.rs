//! Key-value persistence for documents.

mod autosave;
mod file;
mod memory;

pub use autosave::{AutosaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::document::Document;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The persistence key for a document identity.
pub fn document_key(id: &Uuid) -> String {
    format!("Document.{id}")
}

/// A key-value store of serialized documents.
///
/// Values are full snapshots of document state, so writes are idempotent
/// and last-write-wins; implementations never need to merge.
pub trait Storage: Send + Sync {
    /// Write a document snapshot under a key.
    fn save(&self, key: &str, document: &Document) -> BoxFuture<'_, StorageResult<()>>;

    /// Read a document by key.
    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<Document>>;

    /// Delete a key. No-op when absent.
    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all stored keys.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check whether a key exists.
    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
