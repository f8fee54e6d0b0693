//! Bounded list caches: capped at the N most recent elements.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hoard_core::{
    CacheError, CacheKey, CacheResult, Codec, DynCollectionStore, JsonCodec, backend_key,
    cache_prefix,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ops::{CacheOps, decode_value, encode_value, require_values, store_err};

/// A list cache whose lists never exceed a fixed capacity.
///
/// Insertion is always at the head; when a push would exceed the capacity
/// the oldest (tail) elements are evicted first. Eviction, push and the
/// optional TTL reset run as one atomic backend operation, so concurrent
/// pushes to the same key cannot jointly overshoot the capacity.
pub struct BoundedListCache<V> {
    name: String,
    ttl: Duration,
    capacity: usize,
    store: DynCollectionStore,
    codec: Arc<dyn Codec<V>>,
}

impl<V> std::fmt::Debug for BoundedListCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedListCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<V> BoundedListCache<V>
where
    V: Send + Sync + 'static,
{
    /// Creates a cache with the default JSON codec.
    ///
    /// A zero capacity is rejected as an invalid argument.
    pub fn new(
        name: impl Into<String>,
        ttl: Duration,
        capacity: usize,
        store: DynCollectionStore,
    ) -> CacheResult<Self>
    where
        V: Serialize + DeserializeOwned,
    {
        Self::with_codec(name, ttl, capacity, store, Arc::new(JsonCodec))
    }

    /// Creates a cache with a custom codec.
    pub fn with_codec(
        name: impl Into<String>,
        ttl: Duration,
        capacity: usize,
        store: DynCollectionStore,
        codec: Arc<dyn Codec<V>>,
    ) -> CacheResult<Self> {
        let name = name.into();
        if capacity == 0 {
            return Err(CacheError::invalid_argument(
                name,
                "capacity must be at least 1",
            ));
        }
        Ok(Self {
            name,
            ttl,
            capacity,
            store,
            codec,
        })
    }

    /// The fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn key_of(&self, key: &CacheKey) -> String {
        backend_key(&self.name, key, None)
    }

    /// Pushes one value to the head of the list at `key`, evicting the
    /// oldest element first when the list is at capacity.
    pub async fn push(&self, key: &CacheKey, value: &V, expire: bool) -> CacheResult<()> {
        self.push_all(key, std::slice::from_ref(value), expire).await
    }

    /// Pushes values to the head of the list at `key`, evicting oldest
    /// elements so the list stays within capacity. An empty slice is
    /// rejected.
    pub async fn push_all(&self, key: &CacheKey, values: &[V], expire: bool) -> CacheResult<()> {
        require_values(&self.name, values)?;
        let backend_key = self.key_of(key);
        let payloads: Vec<String> = values
            .iter()
            .map(|value| encode_value(&self.name, &backend_key, self.codec.as_ref(), value))
            .collect::<CacheResult<_>>()?;
        self.store
            .list_push_bounded(
                &backend_key,
                &payloads,
                self.capacity,
                expire.then_some(self.ttl),
            )
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Reads the whole list at `key`, most recently pushed first. At most
    /// `capacity` elements; empty when the key is absent.
    pub async fn get(&self, key: &CacheKey) -> CacheResult<Vec<V>> {
        let backend_key = self.key_of(key);
        let payloads = self
            .store
            .list_range(&backend_key)
            .await
            .map_err(|e| store_err(&self.name, e))?;
        payloads
            .iter()
            .map(|payload| decode_value(&self.name, &backend_key, self.codec.as_ref(), payload))
            .collect()
    }

    /// The length of the list at `key`; zero when absent.
    pub async fn len(&self, key: &CacheKey) -> CacheResult<u64> {
        self.store
            .list_len(&self.key_of(key))
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Deletes the list at `key`. A no-op when absent.
    pub async fn invalidate(&self, key: &CacheKey) -> CacheResult<()> {
        self.store
            .delete(&self.key_of(key))
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Resets the TTL of `key` to the cache's configured window.
    pub async fn reset_ttl(&self, key: &CacheKey) -> CacheResult<bool> {
        self.store
            .expire(&self.key_of(key), self.ttl)
            .await
            .map_err(|e| store_err(&self.name, e))
    }
}

#[async_trait]
impl<V> CacheOps for BoundedListCache<V>
where
    V: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    async fn clear(&self) -> CacheResult<u64> {
        self.store
            .delete_prefixed(&cache_prefix(&self.name))
            .await
            .map_err(|e| store_err(&self.name, e))
    }
}
