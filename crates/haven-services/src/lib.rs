//! Haven Services Layer
//!
//! This crate is the business service layer for the upload lifecycle: the
//! deletion unit and its bulk orchestrator, the CDN cache purge client, the
//! identifier cache seam, and the explicit background-task spawn helper.
//! Keep coordination here; filesystem rendering lives in haven-processing
//! and the store contract in haven-db.

pub mod background;
pub mod cache;
pub mod deletion;
pub mod purge;

pub use cache::{IdentifierCache, MemoryIdentifierCache};
pub use deletion::{BulkDeleteReport, DeleteError, DeletionService};
pub use purge::{CachePurger, PurgeBatchResult};
