//! Domain models shared across the workspace.

mod album;
mod file;
mod user;

pub use album::Album;
pub use file::{DeleteSelector, FileRef, StoredFile};
pub use user::User;
