//! File deletion: the single-file unit and the bulk orchestrator.
//!
//! Physical deletion is idempotent (a file already absent counts as
//! deleted) and keeps three other places consistent with the disk: the
//! thumbnail directory, the identifier cache, and — for bulk operations —
//! the relational store, album edit times and the CDN cache.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;

use haven_core::{ext, Config, DeleteSelector, FileRef, StoredFile, User};
use haven_db::{FileStore, StoreError};

use crate::background;
use crate::cache::IdentifierCache;
use crate::purge::CachePurger;

/// Deletion errors. Missing files are not errors; only unlink failures with
/// another cause propagate.
#[derive(Debug, Error)]
pub enum DeleteError {
    #[error("failed to unlink {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of a bulk deletion.
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    /// Requested values that could not be deleted: unknown, not owned by the
    /// actor, or failed on disk. The three cases are indistinguishable by
    /// design, so the response leaks nothing about files the actor cannot
    /// access.
    pub failed: Vec<FileRef>,
    /// Values whose files were removed from disk but whose rows survived a
    /// failed database delete. Disk and store disagree for these until the
    /// next reconciliation; they are deliberately kept out of `failed`.
    pub inconsistent: Vec<FileRef>,
}

impl BulkDeleteReport {
    pub fn is_total_success(&self) -> bool {
        self.failed.is_empty() && self.inconsistent.is_empty()
    }
}

/// Removes stored files and everything derived from them.
pub struct DeletionService {
    uploads_dir: PathBuf,
    thumbs_dir: PathBuf,
    store: Arc<dyn FileStore>,
    /// Present when automatic purging after bulk deletion is configured.
    purger: Option<Arc<CachePurger>>,
}

impl DeletionService {
    pub fn new(
        uploads_dir: PathBuf,
        thumbs_dir: PathBuf,
        store: Arc<dyn FileStore>,
        purger: Option<Arc<CachePurger>>,
    ) -> Self {
        Self {
            uploads_dir,
            thumbs_dir,
            store,
            purger,
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn FileStore>,
    ) -> Result<Self, anyhow::Error> {
        let purger = if config.purge_cache {
            Some(Arc::new(CachePurger::from_config(config)?))
        } else {
            None
        };

        Ok(Self::new(
            config.uploads_dir.clone(),
            config.thumbs_dir(),
            store,
            purger,
        ))
    }

    /// Delete one stored file from disk, drop its identifier from `cache`,
    /// and unlink its thumbnail when the extension can carry one.
    pub async fn delete_file(
        &self,
        filename: &str,
        cache: Option<&dyn IdentifierCache>,
    ) -> Result<(), DeleteError> {
        remove_if_exists(self.uploads_dir.join(filename)).await?;

        let identifier = ext::identifier(filename);
        if let Some(cache) = cache {
            cache.remove(identifier);
        }

        // Thumbnail removal keys off the raw extension sets, not the
        // generation toggles: a thumbnail generated while a toggle was on
        // must still be removed after the toggle goes off.
        if ext::is_media_extension(&ext::extname(filename)) {
            remove_if_exists(self.thumbs_dir.join(format!("{identifier}.png"))).await?;
        }

        Ok(())
    }

    /// Delete every file matched by `selector` that `actor` is allowed to
    /// touch, then reconcile the store, album edit times, identifier cache
    /// and CDN cache.
    ///
    /// Returns the values that could not be deleted; an empty `failed` list
    /// is total success. Per-file failures never abort sibling deletions.
    pub async fn bulk_delete(
        &self,
        selector: &DeleteSelector,
        actor: &User,
        cache: Option<&dyn IdentifierCache>,
    ) -> Result<BulkDeleteReport, StoreError> {
        // Moderators skip the ownership filter entirely.
        let owner = if actor.is_moderator() {
            None
        } else {
            Some(actor.id)
        };
        let files = self.store.find_files(selector, owner).await?;

        // "not found" and "found but not owned" report identically.
        let mut failed = selector.missing_from(&files);

        // Physical deletions are independent (distinct files), so they run
        // concurrently with no ordering guarantee among themselves.
        let deletions = files
            .iter()
            .map(|file| async move { (file, self.delete_file(&file.name, None).await) });

        let mut deleted: Vec<&StoredFile> = Vec::with_capacity(files.len());
        for (file, result) in join_all(deletions).await {
            match result {
                Ok(()) => deleted.push(file),
                Err(error) => {
                    tracing::error!(file = %file.name, error = %error, "Physical deletion failed");
                    failed.push(selector.file_ref(file));
                }
            }
        }

        if deleted.is_empty() {
            return Ok(BulkDeleteReport {
                failed,
                inconsistent: Vec::new(),
            });
        }

        let ids: Vec<i64> = deleted.iter().map(|file| file.id).collect();
        match self.store.delete_files(&ids).await {
            Ok(removed) if removed > 0 => {}
            outcome => {
                // Disk deletion succeeded but the rows survived. No rollback
                // is possible; surface these separately so callers can
                // reconcile instead of retrying the whole request.
                if let Err(error) = outcome {
                    tracing::error!(
                        error = %error,
                        files = deleted.len(),
                        "Files removed from disk but the database delete failed"
                    );
                } else {
                    tracing::error!(
                        files = deleted.len(),
                        "Files removed from disk but the database delete removed no rows"
                    );
                }
                let inconsistent = deleted
                    .iter()
                    .map(|file| selector.file_ref(file))
                    .collect();
                return Ok(BulkDeleteReport {
                    failed,
                    inconsistent,
                });
            }
        }

        if let Some(cache) = cache {
            for file in &deleted {
                cache.remove(file.identifier());
            }
        }

        let mut album_ids: Vec<i64> = Vec::new();
        for file in &deleted {
            if let Some(albumid) = file.albumid {
                if !album_ids.contains(&albumid) {
                    album_ids.push(albumid);
                }
            }
        }
        if !album_ids.is_empty() {
            if let Err(error) = self.store.touch_albums(&album_ids, Utc::now()).await {
                tracing::error!(error = %error, "Failed to refresh album edit times");
            }
        }

        if let Some(purger) = &self.purger {
            let purger = purger.clone();
            let names: Vec<String> = deleted.iter().map(|file| file.name.clone()).collect();
            background::spawn("cdn-purge", async move {
                for result in purger.purge(&names, true, true).await {
                    for error in &result.errors {
                        tracing::error!(error = %error, "CDN purge error");
                    }
                }
                Ok(())
            });
        }

        Ok(BulkDeleteReport {
            failed,
            inconsistent: Vec::new(),
        })
    }
}

async fn remove_if_exists(path: PathBuf) -> Result<(), DeleteError> {
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(DeleteError::Io { path, source }),
    }
}
