//! Haven Core Library
//!
//! This crate provides the domain models, filename extension resolution, and
//! configuration shared across all Haven components.

pub mod config;
pub mod ext;
pub mod models;

// Re-export commonly used types
pub use config::{CloudflareConfig, Config, ThumbSettings};
pub use models::{Album, DeleteSelector, FileRef, StoredFile, User};
