//! Typed access to raw JSON objects.

use serde_json::{Map, Value};

use super::keys::{Field, FieldKeys};
use super::ParseError;
use crate::date::{DateCodec, DateFormat, Instant};
use crate::model::EntityType;

/// Read-only view of one raw object through a key mapping.
///
/// `null` is treated the same as an absent key.
pub struct RawObject<'a, F: Field> {
    entity: EntityType,
    map: &'a Map<String, Value>,
    keys: &'a FieldKeys<F>,
}

impl<'a, F: Field> RawObject<'a, F> {
    /// Wrap `value`, which must be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotAnObject`] for any other JSON value.
    pub fn new(entity: EntityType, value: &'a Value, keys: &'a FieldKeys<F>) -> Result<Self, ParseError> {
        value
            .as_object()
            .map(|map| Self { entity, map, keys })
            .ok_or(ParseError::NotAnObject { entity })
    }

    /// Entity type this object is being decoded as.
    #[must_use]
    pub const fn entity(&self) -> EntityType {
        self.entity
    }

    fn lookup(&self, field: F) -> Option<&'a Value> {
        self.map.get(self.keys.key(field)).filter(|v| !v.is_null())
    }

    fn missing(&self, field: F) -> ParseError {
        ParseError::MissingField {
            entity: self.entity,
            key: self.keys.key(field).to_string(),
        }
    }

    fn wrong_type(&self, field: F, expected: &'static str) -> ParseError {
        ParseError::WrongType {
            entity: self.entity,
            key: self.keys.key(field).to_string(),
            expected,
        }
    }

    /// Mandatory string field.
    ///
    /// # Errors
    ///
    /// Fails when the key is absent or not a string.
    pub fn text(&self, field: F) -> Result<String, ParseError> {
        let value = self.lookup(field).ok_or_else(|| self.missing(field))?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.wrong_type(field, "string"))
    }

    /// Optional string field; anything other than a string reads as absent.
    #[must_use]
    pub fn optional_text(&self, field: F) -> Option<String> {
        self.lookup(field)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Mandatory identifier. Accepts a string or an integer.
    ///
    /// # Errors
    ///
    /// Fails when the key is absent or neither a string nor an integer.
    pub fn id(&self, field: F) -> Result<String, ParseError> {
        let value = self.lookup(field).ok_or_else(|| self.missing(field))?;
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
            _ => Err(self.wrong_type(field, "string or integer id")),
        }
    }

    /// Mandatory integer field.
    ///
    /// # Errors
    ///
    /// Fails when the key is absent or not an integer.
    pub fn integer(&self, field: F) -> Result<i64, ParseError> {
        let value = self.lookup(field).ok_or_else(|| self.missing(field))?;
        value.as_i64().ok_or_else(|| self.wrong_type(field, "integer"))
    }

    /// Optional integer field.
    ///
    /// # Errors
    ///
    /// Fails only when the key is present with a non-integer value.
    pub fn optional_integer(&self, field: F) -> Result<Option<i64>, ParseError> {
        match self.lookup(field) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.wrong_type(field, "integer")),
        }
    }

    /// Length of an array field, if present.
    #[must_use]
    pub fn array_len(&self, field: F) -> Option<usize> {
        self.lookup(field).and_then(Value::as_array).map(Vec::len)
    }

    /// Mandatory timestamp in the wire format.
    ///
    /// # Errors
    ///
    /// Fails when the key is absent, not a string, or not a wire date.
    pub fn date(&self, field: F, codec: &DateCodec) -> Result<Instant, ParseError> {
        let text = self.text(field)?;
        codec
            .parse(&text, DateFormat::Wire)
            .ok_or_else(|| ParseError::BadDate {
                entity: self.entity,
                key: self.keys.key(field).to_string(),
                value: text,
            })
    }

    /// Error for a field that is present but semantically invalid.
    #[must_use]
    pub fn invalid(&self, field: F, expected: &'static str) -> ParseError {
        self.wrong_type(field, expected)
    }

    /// Error for a field that is required but absent.
    #[must_use]
    pub fn absent(&self, field: F) -> ParseError {
        self.missing(field)
    }
}

/// Builds a raw object through a key mapping.
pub struct RawBuilder<'a, F: Field> {
    keys: &'a FieldKeys<F>,
    map: Map<String, Value>,
}

impl<'a, F: Field> RawBuilder<'a, F> {
    #[must_use]
    pub fn new(keys: &'a FieldKeys<F>) -> Self {
        Self {
            keys,
            map: Map::new(),
        }
    }

    pub fn text(&mut self, field: F, value: &str) -> &mut Self {
        self.map
            .insert(self.keys.key(field).to_string(), Value::String(value.to_string()));
        self
    }

    pub fn optional_text(&mut self, field: F, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.text(field, value);
        }
        self
    }

    pub fn integer(&mut self, field: F, value: i64) -> &mut Self {
        self.map
            .insert(self.keys.key(field).to_string(), Value::from(value));
        self
    }

    pub fn date(&mut self, field: F, value: &Instant, codec: &DateCodec) -> &mut Self {
        let text = codec.render(value, DateFormat::Wire);
        self.map.insert(self.keys.key(field).to_string(), Value::String(text));
        self
    }

    #[must_use]
    pub fn build(self) -> Value {
        Value::Object(self.map)
    }
}
