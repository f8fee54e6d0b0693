//! The cache registry: creates and tracks named cache instances over one
//! shared backend connection.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use hoard_core::{
    BulkFetcher, CacheError, CacheResult, Codec, DynCollectionStore, DynKvStore, Fetcher,
    StoreError,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::bounded::BoundedListCache;
use crate::bulk::BulkCache;
use crate::list::ListCache;
use crate::scalar::ScalarCache;
use crate::set::SetCache;

/// Creates named cache instances bound to one backend connection.
///
/// Cache names double as backend key prefixes, so the registry enforces
/// one cache per name: a blank name is an invalid argument, a duplicate
/// name an initialization error. The registry owns the connection; the
/// caches it hands out share it, and [`close`](Self::close) tears it down
/// for all of them.
pub struct CacheRegistry {
    store: DynCollectionStore,
    names: Mutex<HashSet<String>>,
}

impl CacheRegistry {
    /// Creates a registry over the given store.
    #[must_use]
    pub fn new(store: DynCollectionStore) -> Self {
        tracing::info!(backend = store.backend_name(), "cache registry created");
        Self {
            store,
            names: Mutex::new(HashSet::new()),
        }
    }

    /// The name of the backend this registry runs against.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    fn register(&self, name: &str) -> CacheResult<()> {
        if name.trim().is_empty() {
            return Err(CacheError::invalid_argument(
                name,
                "cache name cannot be blank",
            ));
        }
        let mut names = self.names.lock().unwrap_or_else(PoisonError::into_inner);
        if !names.insert(name.to_string()) {
            return Err(CacheError::initialization(
                name,
                "a cache with this name already exists",
            ));
        }
        Ok(())
    }

    fn unregister(&self, name: &str) {
        let mut names = self.names.lock().unwrap_or_else(PoisonError::into_inner);
        names.remove(name);
    }

    fn kv_store(&self) -> DynKvStore {
        Arc::clone(&self.store) as DynKvStore
    }

    /// Creates a read-through scalar cache with the default JSON codec.
    pub fn scalar_cache<V>(
        &self,
        name: &str,
        ttl: Duration,
        fetcher: Arc<dyn Fetcher<V>>,
    ) -> CacheResult<ScalarCache<V>>
    where
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.register(name)?;
        Ok(ScalarCache::new(name, ttl, self.kv_store(), fetcher))
    }

    /// Creates a read-through scalar cache with a custom codec.
    pub fn scalar_cache_with_codec<V>(
        &self,
        name: &str,
        ttl: Duration,
        fetcher: Arc<dyn Fetcher<V>>,
        codec: Arc<dyn Codec<V>>,
    ) -> CacheResult<ScalarCache<V>>
    where
        V: Send + Sync + 'static,
    {
        self.register(name)?;
        Ok(ScalarCache::with_codec(
            name,
            ttl,
            self.kv_store(),
            fetcher,
            codec,
        ))
    }

    /// Creates a bulk cache with the default JSON codec.
    pub fn bulk_cache<V, G>(
        &self,
        name: &str,
        ttl: Duration,
        fetchers: HashMap<G, Arc<dyn BulkFetcher<V>>>,
    ) -> CacheResult<BulkCache<V, G>>
    where
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
        G: Eq + Hash + Display + Send + Sync + 'static,
    {
        self.register(name)?;
        Ok(BulkCache::new(name, ttl, self.kv_store(), fetchers))
    }

    /// Creates a bulk cache with a custom codec.
    pub fn bulk_cache_with_codec<V, G>(
        &self,
        name: &str,
        ttl: Duration,
        fetchers: HashMap<G, Arc<dyn BulkFetcher<V>>>,
        codec: Arc<dyn Codec<V>>,
    ) -> CacheResult<BulkCache<V, G>>
    where
        V: Send + Sync + 'static,
        G: Eq + Hash + Display + Send + Sync + 'static,
    {
        self.register(name)?;
        Ok(BulkCache::with_codec(
            name,
            ttl,
            self.kv_store(),
            fetchers,
            codec,
        ))
    }

    /// Creates a list cache with the default JSON codec.
    pub fn list_cache<V>(&self, name: &str, ttl: Duration) -> CacheResult<ListCache<V>>
    where
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.register(name)?;
        Ok(ListCache::new(name, ttl, Arc::clone(&self.store)))
    }

    /// Creates a list cache with a custom codec.
    pub fn list_cache_with_codec<V>(
        &self,
        name: &str,
        ttl: Duration,
        codec: Arc<dyn Codec<V>>,
    ) -> CacheResult<ListCache<V>>
    where
        V: Send + Sync + 'static,
    {
        self.register(name)?;
        Ok(ListCache::with_codec(
            name,
            ttl,
            Arc::clone(&self.store),
            codec,
        ))
    }

    /// Creates a set cache with the default JSON codec.
    pub fn set_cache<V>(&self, name: &str, ttl: Duration) -> CacheResult<SetCache<V>>
    where
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.register(name)?;
        Ok(SetCache::new(name, ttl, Arc::clone(&self.store)))
    }

    /// Creates a set cache with a custom codec.
    pub fn set_cache_with_codec<V>(
        &self,
        name: &str,
        ttl: Duration,
        codec: Arc<dyn Codec<V>>,
    ) -> CacheResult<SetCache<V>>
    where
        V: Send + Sync + 'static,
    {
        self.register(name)?;
        Ok(SetCache::with_codec(
            name,
            ttl,
            Arc::clone(&self.store),
            codec,
        ))
    }

    /// Creates a bounded list cache with the default JSON codec.
    pub fn bounded_list_cache<V>(
        &self,
        name: &str,
        ttl: Duration,
        capacity: usize,
    ) -> CacheResult<BoundedListCache<V>>
    where
        V: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.register(name)?;
        BoundedListCache::new(name, ttl, capacity, Arc::clone(&self.store)).inspect_err(|_| {
            self.unregister(name);
        })
    }

    /// Creates a bounded list cache with a custom codec.
    pub fn bounded_list_cache_with_codec<V>(
        &self,
        name: &str,
        ttl: Duration,
        capacity: usize,
        codec: Arc<dyn Codec<V>>,
    ) -> CacheResult<BoundedListCache<V>>
    where
        V: Send + Sync + 'static,
    {
        self.register(name)?;
        BoundedListCache::with_codec(name, ttl, capacity, Arc::clone(&self.store), codec)
            .inspect_err(|_| {
                self.unregister(name);
            })
    }

    /// Closes the shared backend connection. Every cache created from
    /// this registry stops working once the connection is gone.
    pub async fn close(&self) -> Result<(), StoreError> {
        tracing::info!(backend = self.store.backend_name(), "cache registry closing");
        self.store.close().await
    }
}
