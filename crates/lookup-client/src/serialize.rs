//! Serialization collaborators
//!
//! The client never looks inside a payload: a [`Serializer`] turns lookups
//! into request bytes and a [`Deserializer`] turns response bytes into one
//! result per lookup. JSON implementations are provided.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;

use crate::lookup::CANDIDATES_FIELD;
use crate::{Error, Lookup, Result};

/// Turn lookups into a request payload
pub trait Serializer: Send + Sync {
    /// Serialize the lookups, in order
    fn serialize<R>(&self, lookups: &[Lookup<R>]) -> Result<Vec<u8>>;

    /// Content type of the produced payload
    fn content_type(&self) -> &str {
        "application/json"
    }
}

/// Turn a response payload into one result per lookup
pub trait Deserializer: Send + Sync {
    /// Result type assigned to each lookup
    type Output;

    /// Deserialize the results, in lookup order
    fn deserialize(&self, payload: &[u8]) -> Result<Vec<Self::Output>>;
}

// =============================================================================
// JSON
// =============================================================================

/// Serialize lookups as a JSON array of field objects
///
/// Keys are sorted, so the same lookups always produce the same bytes. The
/// candidate limit is written as a number.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    fn lookup_to_value<R>(lookup: &Lookup<R>) -> Value {
        let mut object = Map::new();
        for (name, value) in lookup.fields() {
            object.insert(name.clone(), Value::String(value.clone()));
        }
        if let Some(max) = lookup.candidate_limit() {
            object.insert(CANDIDATES_FIELD.to_string(), Value::from(max));
        }
        Value::Object(object)
    }
}

impl Serializer for JsonSerializer {
    fn serialize<R>(&self, lookups: &[Lookup<R>]) -> Result<Vec<u8>> {
        let values: Vec<Value> = lookups.iter().map(Self::lookup_to_value).collect();
        serde_json::to_vec(&values).map_err(|e| Error::Serialization(Box::new(e)))
    }
}

/// Deserialize a JSON array holding one `R` per lookup
///
/// An empty payload is read as an empty array.
pub struct JsonDeserializer<R> {
    _marker: PhantomData<fn() -> R>,
}

impl<R> JsonDeserializer<R> {
    /// Create a deserializer
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<R> Default for JsonDeserializer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for JsonDeserializer<R> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for JsonDeserializer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JsonDeserializer")
    }
}

impl<R: DeserializeOwned> Deserializer for JsonDeserializer<R> {
    type Output = R;

    fn deserialize(&self, payload: &[u8]) -> Result<Vec<R>> {
        if payload.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(payload).map_err(|e| Error::Deserialization(Box::new(e)))
    }
}
