//! Whole-collection decoding.
//!
//! A [`Pipeline`] lifts a single-object parser to a JSON array with a strict
//! all-or-nothing policy: the first element that fails to parse aborts the
//! run and no partial list is ever returned. Surviving records are filtered,
//! then stably sorted by a strict "a before b" comparator.

use std::cmp::Ordering;

use serde_json::Value;
use tracing::{debug, warn};

use crate::date::DateCodec;
use crate::model::EntityType;
use crate::schema::{parse_record, FieldKeys, ParseError, Record};

/// A collection could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("{entity}: response is not a JSON array ({message})")]
    NotAnArray { entity: EntityType, message: String },

    #[error("{entity}: element {index} is malformed: {source}")]
    InvalidRecord {
        entity: EntityType,
        index: usize,
        source: ParseError,
        raw: Value,
    },
}

type ParseFn<'a, R> = Box<dyn Fn(&Value) -> Result<R, ParseError> + 'a>;
type BeforeFn<'a, R> = Box<dyn Fn(&R, &R) -> bool + 'a>;
type FilterFn<'a, R> = Box<dyn Fn(&R) -> bool + 'a>;

/// Parser, comparator and optional filter for one collection.
pub struct Pipeline<'a, R> {
    entity: EntityType,
    parse: ParseFn<'a, R>,
    before: BeforeFn<'a, R>,
    filter: Option<FilterFn<'a, R>>,
}

impl<'a, R> Pipeline<'a, R> {
    /// Pipeline over an arbitrary single-object parser.
    pub fn new(
        entity: EntityType,
        parse: impl Fn(&Value) -> Result<R, ParseError> + 'a,
        before: impl Fn(&R, &R) -> bool + 'a,
    ) -> Self {
        Self {
            entity,
            parse: Box::new(parse),
            before: Box::new(before),
            filter: None,
        }
    }

    /// Keep only records for which `keep` returns true.
    #[must_use]
    pub fn with_filter(mut self, keep: impl Fn(&R) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(keep));
        self
    }

    /// Decode a response body.
    ///
    /// # Errors
    ///
    /// Fails if the body is not a JSON array or any element fails to parse.
    pub fn process(&self, body: &[u8]) -> Result<Vec<R>, PipelineError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| PipelineError::NotAnArray {
            entity: self.entity,
            message: e.to_string(),
        })?;
        self.process_value(&value)
    }

    /// Decode an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Fails if `value` is not an array or any element fails to parse.
    pub fn process_value(&self, value: &Value) -> Result<Vec<R>, PipelineError> {
        let Some(items) = value.as_array() else {
            return Err(PipelineError::NotAnArray {
                entity: self.entity,
                message: format!("found {}", json_kind(value)),
            });
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match (self.parse)(item) {
                Ok(record) => records.push(record),
                Err(source) => {
                    warn!(
                        entity = %self.entity,
                        index,
                        raw = %item,
                        error = %source,
                        "Malformed record, rejecting collection"
                    );
                    return Err(PipelineError::InvalidRecord {
                        entity: self.entity,
                        index,
                        source,
                        raw: item.clone(),
                    });
                }
            }
        }

        if let Some(keep) = &self.filter {
            let before = records.len();
            records.retain(|r| keep(r));
            debug!(entity = %self.entity, kept = records.len(), dropped = before - records.len(), "Filtered collection");
        }

        records.sort_by(|a, b| order(&self.before, a, b));
        Ok(records)
    }
}

impl<'a, R: Record + 'a> Pipeline<'a, R> {
    /// Pipeline that decodes each element as `R` through `keys`.
    pub fn for_record(
        keys: &'a FieldKeys<R::Field>,
        codec: DateCodec,
        before: impl Fn(&R, &R) -> bool + 'a,
    ) -> Self {
        Self::new(R::ENTITY, move |v| parse_record::<R>(v, keys, &codec), before)
    }
}

fn order<R>(before: impl Fn(&R, &R) -> bool, a: &R, b: &R) -> Ordering {
    if before(a, b) {
        Ordering::Less
    } else if before(b, a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
