//! SQLite record store.
//!
//! Rows for every cached entity type live in one table, partitioned by
//! entity name. A full replace runs as a single IMMEDIATE transaction so a
//! reader never sees old and new rows interleaved.

use crate::error::Result;
use crate::model::EntityType;
use crate::storage::hash::{content_hash, has_changed};
use crate::storage::schema::apply_schema;
use crate::storage::RecordStore;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// SQLite-based record store.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Bookkeeping for one entity type's last full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub entity: EntityType,
    pub record_count: usize,
    pub content_hash: String,
    /// Unix milliseconds.
    pub stored_at: i64,
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(timeout_ms.unwrap_or(5000)))?;

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Bookkeeping for `entity`, if it has ever been replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn cache_info(&self, entity: EntityType) -> Result<Option<CacheInfo>> {
        let info = self
            .conn
            .query_row(
                "SELECT record_count, content_hash, stored_at FROM cache_meta WHERE entity = ?1",
                [entity.as_str()],
                |row| {
                    Ok(CacheInfo {
                        entity,
                        record_count: row.get::<_, i64>(0)?.try_into().unwrap_or_default(),
                        content_hash: row.get(1)?,
                        stored_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    /// Number of rows currently stored for `entity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self, entity: EntityType) -> Result<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cached_records WHERE entity = ?1",
            [entity.as_str()],
            |row| row.get(0),
        )?;
        Ok(n.try_into().unwrap_or_default())
    }
}

impl RecordStore for SqliteStorage {
    fn fetch_all(&self, entity: EntityType) -> Result<Vec<Value>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM cached_records WHERE entity = ?1 ORDER BY position",
        )?;

        let payloads = stmt
            .query_map([entity.as_str()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(Into::into))
            .collect()
    }

    fn delete_all(&mut self, entity: EntityType) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM cached_records WHERE entity = ?1", [entity.as_str()])?;
        tx.execute("DELETE FROM cache_meta WHERE entity = ?1", [entity.as_str()])?;
        tx.commit()?;
        Ok(())
    }

    fn insert(&mut self, entity: EntityType, row: &Value) -> Result<()> {
        self.conn.execute(
            "INSERT INTO cached_records (entity, position, payload)
             SELECT ?1, COALESCE(MAX(position) + 1, 0), ?2
             FROM cached_records WHERE entity = ?1",
            rusqlite::params![entity.as_str(), row.to_string()],
        )?;
        Ok(())
    }

    fn replace(&mut self, entity: EntityType, rows: &[Value]) -> Result<()> {
        let hash = content_hash(rows);
        let previous = self.cache_info(entity)?.map(|info| info.content_hash);
        let now = chrono::Utc::now().timestamp_millis();

        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        tx.execute("DELETE FROM cached_records WHERE entity = ?1", [entity.as_str()])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cached_records (entity, position, payload) VALUES (?1, ?2, ?3)",
            )?;
            for (position, row) in rows.iter().enumerate() {
                let position = i64::try_from(position).unwrap_or(i64::MAX);
                stmt.execute(rusqlite::params![entity.as_str(), position, row.to_string()])?;
            }
        }
        tx.execute(
            "INSERT INTO cache_meta (entity, record_count, content_hash, stored_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(entity) DO UPDATE SET
                record_count = excluded.record_count,
                content_hash = excluded.content_hash,
                stored_at = excluded.stored_at",
            rusqlite::params![
                entity.as_str(),
                i64::try_from(rows.len()).unwrap_or(i64::MAX),
                hash,
                now
            ],
        )?;

        tx.commit()?;

        debug!(
            entity = %entity,
            rows = rows.len(),
            changed = has_changed(&hash, previous.as_deref()),
            "Replaced cached collection"
        );
        Ok(())
    }
}
