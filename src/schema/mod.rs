//! Generic record decoding.
//!
//! A record type describes its fields once (see [`record_fields!`]) and
//! implements [`Record::decode`] against a [`RawObject`]. The same decoder
//! reads remote JSON (wire keys, optionally remapped) and local store rows
//! (storage columns), so a record can only ever exist fully validated.
//!
//! Decoding is all-or-nothing per object: any missing mandatory field or
//! undecodable date/enum yields a [`ParseError`] and no record.

mod keys;
mod raw;

pub use keys::{Field, FieldKeys, KeySet, RemappableField};
pub(crate) use keys::record_fields;
pub use raw::{RawBuilder, RawObject};

use serde_json::Value;

use crate::date::DateCodec;
use crate::model::EntityType;

/// A single object failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{entity}: expected a JSON object")]
    NotAnObject { entity: EntityType },

    #[error("{entity}: missing field `{key}`")]
    MissingField { entity: EntityType, key: String },

    #[error("{entity}: field `{key}` must be a {expected}")]
    WrongType {
        entity: EntityType,
        key: String,
        expected: &'static str,
    },

    #[error("{entity}: field `{key}` is not a valid date: {value:?}")]
    BadDate {
        entity: EntityType,
        key: String,
        value: String,
    },

    #[error("{entity}: unknown category ordinal {ordinal}")]
    UnknownCategory { entity: EntityType, ordinal: i64 },
}

impl ParseError {
    /// Entity type the failing object was decoded as.
    #[must_use]
    pub const fn entity(&self) -> EntityType {
        match self {
            Self::NotAnObject { entity }
            | Self::MissingField { entity, .. }
            | Self::WrongType { entity, .. }
            | Self::BadDate { entity, .. }
            | Self::UnknownCategory { entity, .. } => *entity,
        }
    }
}

/// A record type decodable from a raw object.
pub trait Record: Sized {
    /// Logical fields of this record type.
    type Field: Field;

    /// Entity type tag used in diagnostics and storage.
    const ENTITY: EntityType;

    /// Build a validated record from `raw`.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails validation.
    fn decode(raw: &RawObject<'_, Self::Field>, codec: &DateCodec) -> Result<Self, ParseError>;
}

/// A record type the local store keeps between runs.
pub trait Cached: Record {
    /// Write every stored field into `out`.
    fn encode(&self, out: &mut RawBuilder<'_, Self::Field>, codec: &DateCodec);
}

/// Decode one JSON value as `R` through `keys`.
///
/// # Errors
///
/// Returns a [`ParseError`] if `value` is not an object or any mandatory
/// field is missing or malformed.
pub fn parse_record<R: Record>(
    value: &Value,
    keys: &FieldKeys<R::Field>,
    codec: &DateCodec,
) -> Result<R, ParseError> {
    let raw = RawObject::new(R::ENTITY, value, keys)?;
    R::decode(&raw, codec)
}

/// Encode `record` as a JSON object through `keys`.
#[must_use]
pub fn encode_record<R: Cached>(record: &R, keys: &FieldKeys<R::Field>, codec: &DateCodec) -> Value {
    let mut out = RawBuilder::new(keys);
    record.encode(&mut out, codec);
    out.build()
}
