//! Text codec for cached values.
//!
//! Values are stored as JSON. Domain types are projected into serializable
//! DTOs before they reach the cache and rebuilt from them on the way out.

use super::{CacheError, CacheResult, CodecOperation};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON text of a null result.
pub(crate) const NULL: &str = "null";

/// Encodes a value for storage.
pub fn serialize<T: Serialize + ?Sized>(value: &T) -> CacheResult<String> {
    serde_json::to_string(value).map_err(|e| CacheError::Serialization {
        operation: CodecOperation::Serialize,
        message: format!("Failed to serialize data for cache: {}", e),
    })
}

/// Decodes a stored value.
pub fn deserialize<T: DeserializeOwned>(text: &str) -> CacheResult<T> {
    serde_json::from_str(text).map_err(|e| CacheError::Serialization {
        operation: CodecOperation::Deserialize,
        message: format!("Failed to deserialize data from cache: {}", e),
    })
}
