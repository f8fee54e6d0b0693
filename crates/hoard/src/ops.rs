//! The capability surface shared by every cache kind, plus argument
//! validation and codec plumbing used across the kinds.

use async_trait::async_trait;
use hoard_core::{CacheError, CacheResult, Codec, StoreError};

/// Operations every cache kind supports, regardless of what it stores.
///
/// Collection kinds add their push/remove/size surface as inherent
/// methods; this trait is the common, object-safe denominator.
#[async_trait]
pub trait CacheOps: Send + Sync {
    /// The cache name (also the backend key prefix).
    fn name(&self) -> &str;

    /// The name of the backend the cache runs against.
    fn backend_name(&self) -> &'static str;

    /// Removes every entry belonging to this cache, returning how many
    /// were deleted. Sibling caches on the same connection are untouched.
    async fn clear(&self) -> CacheResult<u64>;
}

pub(crate) fn store_err(cache: &str, err: StoreError) -> CacheError {
    CacheError::store(cache, err)
}

pub(crate) fn fetch_err(cache: &str, err: hoard_core::FetchError) -> CacheError {
    CacheError::fetch(cache, err.to_string())
}

pub(crate) fn require_values<T>(cache: &str, values: &[T]) -> CacheResult<()> {
    if values.is_empty() {
        Err(CacheError::invalid_argument(cache, "values cannot be empty"))
    } else {
        Ok(())
    }
}

pub(crate) fn require_id(cache: &str, id: &str) -> CacheResult<()> {
    if id.trim().is_empty() {
        Err(CacheError::invalid_argument(
            cache,
            "identifier cannot be blank",
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn encode_value<V>(
    cache: &str,
    key: &str,
    codec: &dyn Codec<V>,
    value: &V,
) -> CacheResult<String> {
    codec
        .encode(value)
        .map_err(|e| CacheError::serialization(cache, key, e.to_string()))
}

pub(crate) fn decode_value<V>(
    cache: &str,
    key: &str,
    codec: &dyn Codec<V>,
    payload: &str,
) -> CacheResult<V> {
    codec
        .decode(payload)
        .map_err(|e| CacheError::serialization(cache, key, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that CacheOps is object-safe
    fn _assert_ops_object_safe(_: &dyn CacheOps) {}

    #[test]
    fn test_argument_validation() {
        assert!(require_values::<String>("c", &[]).is_err());
        assert!(require_values("c", &["x"]).is_ok());
        assert!(require_id("c", "  ").is_err());
        assert!(require_id("c", "id").is_ok());
    }
}
