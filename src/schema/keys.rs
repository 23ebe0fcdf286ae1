//! Logical-field to key tables.
//!
//! Each record type declares its fields once, together with the key the
//! remote API uses and the column the local store uses. A [`FieldKeys`]
//! picks one of those key sets and may override individual keys for record
//! types whose fields are [`RemappableField`]s.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A logical field of a record type.
pub trait Field: Copy + Eq + Hash + Debug + 'static {
    /// Key used by the remote API.
    fn wire_key(self) -> &'static str;

    /// Column name used by the local record store.
    fn column(self) -> &'static str;
}

/// Marker for fields whose wire keys callers may override.
pub trait RemappableField: Field {}

/// Which static key set a [`FieldKeys`] starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySet {
    Wire,
    Storage,
}

/// Resolved mapping from logical fields to object keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldKeys<F: Field> {
    base: KeySet,
    overrides: HashMap<F, String>,
}

impl<F: Field> Default for FieldKeys<F> {
    fn default() -> Self {
        Self::wire()
    }
}

impl<F: Field> FieldKeys<F> {
    /// Identity mapping onto the remote API keys.
    #[must_use]
    pub fn wire() -> Self {
        Self {
            base: KeySet::Wire,
            overrides: HashMap::new(),
        }
    }

    /// Mapping onto the local store columns.
    #[must_use]
    pub fn storage() -> Self {
        Self {
            base: KeySet::Storage,
            overrides: HashMap::new(),
        }
    }

    /// The key set this mapping starts from.
    #[must_use]
    pub const fn base(&self) -> KeySet {
        self.base
    }

    /// Key for `field` under this mapping.
    #[must_use]
    pub fn key(&self, field: F) -> &str {
        match self.overrides.get(&field) {
            Some(key) => key,
            None => match self.base {
                KeySet::Wire => field.wire_key(),
                KeySet::Storage => field.column(),
            },
        }
    }
}

impl<F: RemappableField> FieldKeys<F> {
    /// Read `field` from `key` instead of its default key.
    #[must_use]
    pub fn remap(mut self, field: F, key: impl Into<String>) -> Self {
        self.overrides.insert(field, key.into());
        self
    }
}

/// Declare a field enum together with its wire keys and storage columns.
///
/// ```ignore
/// record_fields! {
///     pub enum NoteField {
///         Id => ("id", "id"),
///         CreatedAt => ("createdAt", "created_at"),
///     }
/// }
/// ```
macro_rules! record_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => ($wire:literal, $column:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::schema::Field for $name {
            fn wire_key(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            fn column(self) -> &'static str {
                match self {
                    $(Self::$variant => $column),+
                }
            }
        }
    };
}

pub(crate) use record_fields;
