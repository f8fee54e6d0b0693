//! Bulk caches: multi-key reads reconciled against batch fetch functions.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hoard_core::{
    BulkFetcher, CacheError, CacheKey, CacheResult, Codec, DynKvStore, JsonCodec, NULL_PAYLOAD,
    backend_key, cache_prefix,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ops::{CacheOps, encode_value, fetch_err, require_id, store_err};

/// A cache that resolves sets of lookup identifiers in bulk.
///
/// Identifiers are grouped: each group has its own batch fetch function
/// and its own backend key namespace (`{name}-{group}-{id}`), so the same
/// value can be cached under several key shapes.
///
/// [`get_map`](Self::get_map) splits the requested identifiers into cache
/// hits and misses, batch-fetches the misses, backfills the backend and
/// returns the merged result.
pub struct BulkCache<V, G> {
    name: String,
    ttl: Duration,
    allow_null: bool,
    store: DynKvStore,
    codec: Arc<dyn Codec<V>>,
    fetchers: HashMap<G, Arc<dyn BulkFetcher<V>>>,
}

impl<V, G> BulkCache<V, G>
where
    V: Send + Sync + 'static,
    G: Eq + Hash + Display + Send + Sync + 'static,
{
    /// Creates a cache with the default JSON codec.
    pub fn new(
        name: impl Into<String>,
        ttl: Duration,
        store: DynKvStore,
        fetchers: HashMap<G, Arc<dyn BulkFetcher<V>>>,
    ) -> Self
    where
        V: Serialize + DeserializeOwned,
    {
        Self::with_codec(name, ttl, store, fetchers, Arc::new(JsonCodec))
    }

    /// Creates a cache with a custom codec.
    pub fn with_codec(
        name: impl Into<String>,
        ttl: Duration,
        store: DynKvStore,
        fetchers: HashMap<G, Arc<dyn BulkFetcher<V>>>,
        codec: Arc<dyn Codec<V>>,
    ) -> Self {
        Self {
            name: name.into(),
            ttl,
            allow_null: false,
            store,
            codec,
            fetchers,
        }
    }

    /// Enables caching of unresolved identifiers under the null sentinel,
    /// so a known-missing value is not refetched every call.
    #[must_use]
    pub fn allow_nulls(mut self) -> Self {
        self.allow_null = true;
        self
    }

    fn member_key(&self, group: &G, id: &str) -> String {
        let group = group.to_string();
        backend_key(&self.name, &CacheKey::single(id), Some(group.as_str()))
    }

    fn fetcher_for(&self, group: &G) -> CacheResult<&Arc<dyn BulkFetcher<V>>> {
        self.fetchers.get(group).ok_or_else(|| {
            CacheError::invalid_argument(
                &self.name,
                format!("no fetch function registered for group `{group}`"),
            )
        })
    }

    /// Resolves a set of identifiers, reading hits from the cache and
    /// batch-fetching the rest.
    ///
    /// Duplicated identifiers are deduplicated up front; the result holds
    /// exactly one entry per distinct identifier. `None` marks an
    /// identifier the fetch function left unresolved (or a cached null). A
    /// hit that fails to decode is logged and refetched rather than
    /// failing the whole call; a fetch function failure is fatal.
    ///
    /// No lock is held across the hit/fetch/backfill steps: concurrent
    /// calls for overlapping identifiers may each fetch and write the same
    /// entry. The last write wins; the fetcher is "at most once per call",
    /// not "at most once per key".
    pub async fn get_map<I, S>(&self, ids: I, group: &G) -> CacheResult<HashMap<String, Option<V>>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fetcher = self.fetcher_for(group)?;

        // Dedupe while keeping the mapping from each computed backend key
        // back to the original identifier; first seen wins.
        let mut pending: HashMap<String, String> = HashMap::new();
        let mut requested: Vec<String> = Vec::new();
        for id in ids {
            let id = id.into();
            require_id(&self.name, &id)?;
            let computed = self.member_key(group, &id);
            if !pending.contains_key(&computed) {
                requested.push(computed.clone());
                pending.insert(computed, id);
            }
        }
        if requested.is_empty() {
            return Ok(HashMap::new());
        }

        let payloads = self
            .store
            .multi_get(&requested)
            .await
            .map_err(|e| store_err(&self.name, e))?;

        let mut result: HashMap<String, Option<V>> = HashMap::with_capacity(requested.len());
        for (computed, payload) in requested.iter().zip(payloads) {
            let Some(payload) = payload else { continue };
            if self.allow_null && payload == NULL_PAYLOAD {
                if let Some(id) = pending.remove(computed) {
                    result.insert(id, None);
                }
                continue;
            }
            match self.codec.decode(&payload) {
                Ok(value) => {
                    if let Some(id) = pending.remove(computed) {
                        result.insert(id, Some(value));
                    }
                }
                Err(e) => {
                    // One corrupted entry must not fail the whole batch;
                    // the key stays pending and is refetched below.
                    tracing::warn!(
                        cache = %self.name,
                        key = %computed,
                        error = %e,
                        "undecodable cache entry treated as miss"
                    );
                }
            }
        }

        if !pending.is_empty() {
            tracing::debug!(
                cache = %self.name,
                group = %group,
                misses = pending.len(),
                "bulk cache misses"
            );
            let miss_ids: Vec<String> = pending.values().cloned().collect();
            let mut fetched = fetcher
                .fetch_many(&miss_ids)
                .await
                .map_err(|e| fetch_err(&self.name, e))?;

            for (computed, id) in pending {
                match fetched.remove(&id) {
                    Some(value) => {
                        let payload =
                            encode_value(&self.name, &computed, self.codec.as_ref(), &value)?;
                        self.store
                            .put(&computed, &payload, self.ttl)
                            .await
                            .map_err(|e| store_err(&self.name, e))?;
                        result.insert(id, Some(value));
                    }
                    None => {
                        if self.allow_null {
                            self.store
                                .put(&computed, NULL_PAYLOAD, self.ttl)
                                .await
                                .map_err(|e| store_err(&self.name, e))?;
                        }
                        result.insert(id, None);
                    }
                }
            }
        }

        Ok(result)
    }

    /// Resolves a single identifier with the same semantics as
    /// [`get_map`](Self::get_map).
    pub async fn get(&self, id: &str, group: &G) -> CacheResult<Option<V>> {
        let mut result = self.get_map([id], group).await?;
        Ok(result.remove(id).flatten())
    }

    /// Writes `value` for `(id, group)`, overwriting and resetting the TTL.
    pub async fn put(&self, id: &str, group: &G, value: &V) -> CacheResult<()> {
        require_id(&self.name, id)?;
        let computed = self.member_key(group, id);
        let payload = encode_value(&self.name, &computed, self.codec.as_ref(), value)?;
        self.store
            .put(&computed, &payload, self.ttl)
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Force-replaces the value for `(id, group)`: evict, then put.
    pub async fn refresh(&self, id: &str, group: &G, value: &V) -> CacheResult<()> {
        self.invalidate(id, group).await?;
        self.put(id, group, value).await
    }

    /// Resets the TTL for `(id, group)` to the cache's configured window.
    /// Returns `false` when no entry exists.
    pub async fn reset_ttl(&self, id: &str, group: &G) -> CacheResult<bool> {
        require_id(&self.name, id)?;
        self.store
            .expire(&self.member_key(group, id), self.ttl)
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Deletes the entry for `(id, group)`. A no-op when absent.
    pub async fn invalidate(&self, id: &str, group: &G) -> CacheResult<()> {
        require_id(&self.name, id)?;
        self.store
            .delete(&self.member_key(group, id))
            .await
            .map_err(|e| store_err(&self.name, e))
    }
}

#[async_trait]
impl<V, G> CacheOps for BulkCache<V, G>
where
    V: Send + Sync + 'static,
    G: Eq + Hash + Display + Send + Sync + 'static,
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
