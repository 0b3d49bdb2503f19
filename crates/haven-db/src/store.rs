//! Relational store abstraction for the deletion services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use haven_core::{DeleteSelector, StoredFile};

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// The slice of the relational store the deletion services depend on.
///
/// Only the `files` and `albums` columns this crate touches are part of the
/// contract; schema management lives with the upload path.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Load candidate rows matching `selector`. When `owner` is set, only
    /// rows owned by that user are returned (the ownership filter is skipped
    /// entirely for moderators by passing `None`).
    async fn find_files(
        &self,
        selector: &DeleteSelector,
        owner: Option<i64>,
    ) -> StoreResult<Vec<StoredFile>>;

    /// Bulk-delete rows by id; returns the number of rows removed.
    async fn delete_files(&self, ids: &[i64]) -> StoreResult<u64>;

    /// Refresh `edited_at` on the given albums; returns the number of rows
    /// updated.
    async fn touch_albums(&self, album_ids: &[i64], edited_at: DateTime<Utc>) -> StoreResult<u64>;
}
