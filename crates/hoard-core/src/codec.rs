//! Payload codecs.
//!
//! Every cache instance owns a [`Codec`] that converts domain values to and
//! from the opaque string payloads the backend stores. [`JsonCodec`] is the
//! default; [`FnCodec`] adapts a caller-supplied serializer/deserializer
//! pair.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Reserved payload representing a cached null value.
///
/// Caches that allow nulls store this literal so that "key present, value
/// is null" can be told apart from "key absent".
pub const NULL_PAYLOAD: &str = "null";

/// A codec encode/decode failure.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CodecError {
    message: String,
}

impl CodecError {
    /// Creates a new codec error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Converts domain values to and from backend payloads.
pub trait Codec<V>: Send + Sync {
    /// Encodes a value into its payload form.
    fn encode(&self, value: &V) -> Result<String, CodecError>;

    /// Decodes a payload back into a value.
    fn decode(&self, payload: &str) -> Result<V, CodecError>;
}

/// The default JSON codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<V> Codec<V> for JsonCodec
where
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &V) -> Result<String, CodecError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, payload: &str) -> Result<V, CodecError> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// A codec built from a caller-supplied encode/decode pair.
pub struct FnCodec<V> {
    encode: Box<dyn Fn(&V) -> Result<String, CodecError> + Send + Sync>,
    decode: Box<dyn Fn(&str) -> Result<V, CodecError> + Send + Sync>,
}

impl<V> FnCodec<V> {
    /// Wraps an encode/decode closure pair.
    pub fn new<E, D>(encode: E, decode: D) -> Self
    where
        E: Fn(&V) -> Result<String, CodecError> + Send + Sync + 'static,
        D: Fn(&str) -> Result<V, CodecError> + Send + Sync + 'static,
    {
        Self {
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl<V> Codec<V> for FnCodec<V> {
    fn encode(&self, value: &V) -> Result<String, CodecError> {
        (self.encode)(value)
    }

    fn decode(&self, payload: &str) -> Result<V, CodecError> {
        (self.decode)(payload)
    }
}
