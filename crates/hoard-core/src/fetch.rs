//! Caller-supplied miss-resolution contracts.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::key::CacheKey;

/// Error type for caller-supplied fetch functions.
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Resolves a single cache miss from the source of truth.
///
/// Returning `Ok(None)` means the domain value is null; caches configured
/// to allow nulls will record it so the miss is not refetched.
#[async_trait]
pub trait Fetcher<V>: Send + Sync {
    /// Fetches the value for the given logical key.
    async fn fetch(&self, key: &CacheKey) -> Result<Option<V>, FetchError>;
}

/// Resolves a batch of cache misses from the source of truth.
///
/// The batch contains exactly the identifiers still unresolved after the
/// cache lookup, never already-satisfied ones. The returned map should
/// carry an entry for every identifier whenever possible; absent entries
/// are treated as unresolved by the caller.
#[async_trait]
pub trait BulkFetcher<V>: Send + Sync {
    /// Fetches values for the given lookup identifiers.
    async fn fetch_many(&self, ids: &[String]) -> Result<HashMap<String, V>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that the fetch contracts are object-safe
    fn _assert_fetcher_object_safe(_: &dyn Fetcher<String>) {}
    fn _assert_bulk_fetcher_object_safe(_: &dyn BulkFetcher<String>) {}
}
