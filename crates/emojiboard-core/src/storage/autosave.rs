//! Write-on-change document persistence.
//!
//! Every document mutation marks the manager dirty; the host's tick
//! calls [`AutosaveManager::maybe_save`], which coalesces writes to at
//! most one per interval. Writes are full snapshots, so collapsing a
//! burst of changes into one write never loses anything but
//! intermediate states.

use crate::document::Document;
use crate::storage::{Storage, StorageError, StorageResult, document_key};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default save-coalescing interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 2;

/// Debounced persistence of one document to a storage backend.
pub struct AutosaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
}

impl<S: Storage> AutosaveManager<S> {
    /// Create a manager over the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
        }
    }

    /// Set the coalescing interval.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Mark the document as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether a save is due (dirty and the interval has elapsed).
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if due. Returns whether a write was performed.
    pub async fn maybe_save(&mut self, document: &Document) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(document).await?;
        Ok(true)
    }

    /// Write a snapshot immediately, regardless of the interval.
    pub async fn save(&mut self, document: &Document) -> StorageResult<()> {
        let key = document_key(&document.id);
        self.storage.save(&key, document).await?;
        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::debug!("saved document under {key}");
        Ok(())
    }

    /// Load the document stored under `key`, substituting an empty
    /// default when the key is missing or its value is undecodable.
    pub async fn load_or_default(&mut self, key: &str) -> Document {
        match self.storage.load(key).await {
            Ok(document) => {
                self.dirty = false;
                self.last_save = Some(Instant::now());
                document
            }
            Err(StorageError::NotFound(_)) => Document::new(),
            Err(err) => {
                log::warn!("discarding unreadable document under {key}: {err}");
                Document::new()
            }
        }
    }

    /// The storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}
