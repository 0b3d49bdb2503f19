use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An album row (`albums` table). `edited_at` is refreshed whenever a member
/// file is deleted, as a coarse cache-busting signal for album listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Album {
    pub id: i64,
    pub edited_at: DateTime<Utc>,
}
