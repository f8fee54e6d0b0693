//! Backend store traits.
//!
//! These are the narrow interfaces the caching layer consumes a backend
//! through. Payloads are opaque strings; expiry is backend-managed and only
//! reset through the explicit [`KeyValueStore::expire`] operation.
//!
//! [`KeyValueStore`] is the simple key/expiry surface every backend offers;
//! [`CollectionStore`] adds the list/set operations only richer backends
//! support. Scalar and bulk caches require only the former, so they run
//! unchanged against a backend without collection support.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// A key/value store with per-key expiry.
///
/// Implementations must be thread-safe (`Send + Sync`). No operation is
/// retried by the caller; timeouts are a property of the underlying
/// connection and surface as [`StoreError`]s.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the payload at `key`, or `None` when the key is absent or
    /// expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `payload` at `key`, overwriting any previous value and
    /// resetting the expiry to `ttl`.
    async fn put(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Writes `payload` at `key` only when the key is absent or expired.
    ///
    /// Returns `true` when the write happened. Used where clobbering a
    /// concurrent writer must be avoided.
    async fn put_if_absent(
        &self,
        key: &str,
        payload: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Reads many keys in one round trip; the result has one slot per
    /// requested key, in request order.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;

    /// Deletes `key`. A no-op when the key is absent.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Deletes every key starting with `prefix`, returning how many were
    /// removed. Used to clear one cache without touching its siblings on
    /// the same connection.
    async fn delete_prefixed(&self, prefix: &str) -> Result<u64, StoreError>;

    /// Resets the expiry of `key` to `ttl`. Returns `false` when the key
    /// does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Returns whether `key` currently exists.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Releases the underlying connection. Subsequent operations fail with
    /// [`StoreError::Closed`].
    async fn close(&self) -> Result<(), StoreError>;

    /// The name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}

/// A store that additionally holds lists and sets under single keys.
#[async_trait]
pub trait CollectionStore: KeyValueStore {
    /// Pushes payloads to the head of the list at `key`, creating it if
    /// absent. When `ttl` is given the key expiry is reset as part of the
    /// same backend operation.
    async fn list_push_front(
        &self,
        key: &str,
        payloads: &[String],
        ttl: Option<Duration>,
    ) -> Result<(), StoreError>;

    /// Pushes payloads to the head of the list at `key`, evicting oldest
    /// (tail) elements so the list never exceeds `capacity`.
    ///
    /// The push, eviction and optional expiry reset execute as one atomic
    /// unit against the backend: concurrent pushes to the same key cannot
    /// jointly overshoot the capacity.
    async fn list_push_bounded(
        &self,
        key: &str,
        payloads: &[String],
        capacity: usize,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError>;

    /// Reads the whole list at `key`, head first. Empty when absent.
    async fn list_range(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// The length of the list at `key`; zero when absent.
    async fn list_len(&self, key: &str) -> Result<u64, StoreError>;

    /// Adds payloads to the set at `key` (duplicates are absorbed) and
    /// resets the key expiry to `ttl` in the same backend operation.
    async fn set_add(&self, key: &str, payloads: &[String], ttl: Duration)
    -> Result<(), StoreError>;

    /// Removes payloads from the set at `key`. Absent members are ignored.
    async fn set_remove(&self, key: &str, payloads: &[String]) -> Result<(), StoreError>;

    /// Reads all members of the set at `key`. Empty when absent.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// The cardinality of the set at `key`; zero when absent.
    async fn set_len(&self, key: &str) -> Result<u64, StoreError>;
}

/// Type alias for a shared key/value store handle.
pub type DynKvStore = std::sync::Arc<dyn KeyValueStore>;

/// Type alias for a shared collection-capable store handle.
pub type DynCollectionStore = std::sync::Arc<dyn CollectionStore>;

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that KeyValueStore is object-safe
    fn _assert_kv_object_safe(_: &dyn KeyValueStore) {}

    // Compile-time test that CollectionStore is object-safe
    fn _assert_collection_object_safe(_: &dyn CollectionStore) {}
}
