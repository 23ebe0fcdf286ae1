//! Local record store.
//!
//! The cache keeps the last successfully committed remote collection of each
//! cached entity type, so the client has something to show before (or
//! without) a network round trip:
//! - WAL mode for concurrent reads
//! - Whole-collection replace in one transaction
//! - Content fingerprints per collection
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - SQLite-backed [`RecordStore`]
//! - [`local`] - Typed view over any [`RecordStore`]
//! - [`hash`] - Collection fingerprints

pub mod hash;
pub mod local;
pub mod schema;
pub mod sqlite;

pub use local::LocalStore;
pub use sqlite::{CacheInfo, SqliteStorage};

use serde_json::Value;

use crate::error::Result;
use crate::model::EntityType;

/// Row-level persistence for cached collections.
///
/// Rows are flat JSON objects keyed by storage column names, kept in
/// insertion order per entity type.
pub trait RecordStore {
    /// Every row stored for `entity`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn fetch_all(&self, entity: EntityType) -> Result<Vec<Value>>;

    /// Remove every row stored for `entity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn delete_all(&mut self, entity: EntityType) -> Result<()>;

    /// Append one row for `entity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn insert(&mut self, entity: EntityType, row: &Value) -> Result<()>;

    /// Replace every row stored for `entity` with `rows`.
    ///
    /// # Errors
    ///
    /// Returns the first failing delete or insert.
    fn replace(&mut self, entity: EntityType, rows: &[Value]) -> Result<()> {
        self.delete_all(entity)?;
        for row in rows {
            self.insert(entity, row)?;
        }
        Ok(())
    }
}
