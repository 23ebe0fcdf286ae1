//! Typed access to cached collections.

use tracing::{debug, warn};

use crate::date::DateCodec;
use crate::error::Result;
use crate::schema::{encode_record, parse_record, Cached, FieldKeys};
use crate::storage::RecordStore;

/// Decodes and encodes whole collections against a [`RecordStore`].
///
/// Rows are read and written with the storage key set, through the same
/// decoder used for remote JSON.
#[derive(Debug)]
pub struct LocalStore<S> {
    store: S,
    codec: DateCodec,
}

impl<S: RecordStore> LocalStore<S> {
    pub const fn new(store: S, codec: DateCodec) -> Self {
        Self { store, codec }
    }

    /// The wrapped row store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Every cached record of type `R`.
    ///
    /// Any read or decode failure is logged and yields `None`; a partial
    /// collection is never returned.
    pub fn load_all<R: Cached>(&self) -> Option<Vec<R>> {
        let rows = match self.store.fetch_all(R::ENTITY) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(entity = %R::ENTITY, error = %e, "Failed to read cached collection");
                return None;
            }
        };

        let keys = FieldKeys::<R::Field>::storage();
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match parse_record::<R>(row, &keys, &self.codec) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(entity = %R::ENTITY, index, error = %e, "Corrupt cached row, ignoring cache");
                    return None;
                }
            }
        }

        debug!(entity = %R::ENTITY, count = records.len(), "Loaded cached collection");
        Some(records)
    }

    /// Replace the cached collection of `R` with `records`, keeping order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the replace.
    pub fn replace_all<R: Cached>(&mut self, records: &[R]) -> Result<()> {
        let keys = FieldKeys::<R::Field>::storage();
        let rows: Vec<_> = records
            .iter()
            .map(|r| encode_record(r, &keys, &self.codec))
            .collect();
        self.store.replace(R::ENTITY, &rows)
    }
}
