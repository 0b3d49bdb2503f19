//! Postgres implementation of [`FileStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use haven_core::{DeleteSelector, StoredFile};

use crate::store::{FileStore, StoreResult};

/// File/album repository backed by a Postgres pool.
#[derive(Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a fresh pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    async fn find_files(
        &self,
        selector: &DeleteSelector,
        owner: Option<i64>,
    ) -> StoreResult<Vec<StoredFile>> {
        let rows = match (selector, owner) {
            (DeleteSelector::Ids(ids), None) => {
                sqlx::query_as::<_, StoredFile>(
                    "SELECT id, name, userid, albumid FROM files WHERE id = ANY($1)",
                )
                .bind(ids.clone())
                .fetch_all(&self.pool)
                .await?
            }
            (DeleteSelector::Ids(ids), Some(userid)) => {
                sqlx::query_as::<_, StoredFile>(
                    "SELECT id, name, userid, albumid FROM files \
                     WHERE id = ANY($1) AND userid = $2",
                )
                .bind(ids.clone())
                .bind(userid)
                .fetch_all(&self.pool)
                .await?
            }
            (DeleteSelector::Names(names), None) => {
                sqlx::query_as::<_, StoredFile>(
                    "SELECT id, name, userid, albumid FROM files WHERE name = ANY($1)",
                )
                .bind(names.clone())
                .fetch_all(&self.pool)
                .await?
            }
            (DeleteSelector::Names(names), Some(userid)) => {
                sqlx::query_as::<_, StoredFile>(
                    "SELECT id, name, userid, albumid FROM files \
                     WHERE name = ANY($1) AND userid = $2",
                )
                .bind(names.clone())
                .bind(userid)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    async fn delete_files(&self, ids: &[i64]) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM files WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        tracing::debug!(requested = ids.len(), removed, "Deleted file rows");
        Ok(removed)
    }

    async fn touch_albums(&self, album_ids: &[i64], edited_at: DateTime<Utc>) -> StoreResult<u64> {
        if album_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("UPDATE albums SET edited_at = $2 WHERE id = ANY($1)")
            .bind(album_ids.to_vec())
            .bind(edited_at)
            .execute(&self.pool)
            .await?;

        let touched = result.rows_affected();
        tracing::debug!(requested = album_ids.len(), touched, "Refreshed album edit times");
        Ok(touched)
    }
}
