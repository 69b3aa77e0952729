//! # storage-adapters
//!
//! Implementations of the persistence ports plus the rendered-page cache.
//! The SQLite backend is compiled with the `db-sqlite` feature.

pub mod cache;

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

pub use cache::PageCache;
