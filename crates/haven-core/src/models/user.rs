use serde::{Deserialize, Serialize};

/// The acting user, as resolved by the authentication layer (out of scope
/// for this crate — only the fields consulted here are modeled).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Moderators may bulk-delete files they do not own.
    pub moderator: bool,
}

impl User {
    pub fn is_moderator(&self) -> bool {
        self.moderator
    }
}
