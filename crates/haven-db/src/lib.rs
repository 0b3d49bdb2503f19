//! Haven database layer
//!
//! Defines the [`FileStore`] trait the deletion services are written
//! against, and its Postgres implementation. Orchestration code never talks
//! to the pool directly; everything goes through the trait so tests can
//! substitute an in-memory store.

mod postgres;
mod store;

pub use postgres::PgFileStore;
pub use store::{FileStore, StoreError, StoreResult};
