use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hoard_core::{CollectionStore, KeyValueStore, StoreError};
use tokio::sync::Mutex;

/// What a key currently holds.
#[derive(Debug, Clone)]
enum Slot {
    Value(String),
    List(VecDeque<String>),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    slot: Slot,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(slot: Slot, ttl: Option<Duration>) -> Self {
        Self {
            slot,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-process fallback backend.
///
/// A single mutex guards the map since multiple caller tasks may read and
/// write concurrently; every operation takes the lock once, so the
/// check-evict-push sequence of a bounded push is atomic here by
/// construction. Expired entries are dropped lazily on access — there is
/// no sweeper task.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    /// The number of live entries, for tests and diagnostics.
    pub async fn len(&self) -> usize {
        let entries = self.entries.lock().await;
        entries.values().filter(|entry| !entry.is_expired()).count()
    }

    /// Returns `true` when no live entries remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn purge_if_expired(entries: &mut HashMap<String, Entry>, key: &str) {
    if entries.get(key).is_some_and(Entry::is_expired) {
        entries.remove(key);
    }
}

fn expect_value(entry: &Entry, key: &str) -> Result<String, StoreError> {
    match &entry.slot {
        Slot::Value(payload) => Ok(payload.clone()),
        _ => Err(StoreError::wrong_kind(key, "value")),
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        match entries.get(key) {
            Some(entry) => Ok(Some(expect_value(entry, key)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, payload: &str, ttl: Duration) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry::new(Slot::Value(payload.to_string()), Some(ttl)),
        );
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        payload: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry::new(Slot::Value(payload.to_string()), Some(ttl)),
        );
        Ok(true)
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        let mut results = Vec::with_capacity(keys.len());
        for key in keys {
            purge_if_expired(&mut entries, key);
            match entries.get(key.as_str()) {
                Some(entry) => results.push(Some(expect_value(entry, key)?)),
                None => results.push(None),
            }
        }
        Ok(results)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        Ok(())
    }

    async fn delete_prefixed(&self, prefix: &str) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        Ok(entries.contains_key(key))
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::SeqCst);
        let mut entries = self.entries.lock().await;
        entries.clear();
        tracing::debug!("memory store closed");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn list_push_front(
        &self,
        key: &str,
        payloads: &[String],
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Slot::List(VecDeque::new()), None));
        let Slot::List(list) = &mut entry.slot else {
            return Err(StoreError::wrong_kind(key, "list"));
        };
        for payload in payloads {
            list.push_front(payload.clone());
        }
        if let Some(ttl) = ttl {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn list_push_bounded(
        &self,
        key: &str,
        payloads: &[String],
        capacity: usize,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        // One lock hold covers push, eviction and expiry, so concurrent
        // pushes cannot jointly overshoot the capacity.
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Slot::List(VecDeque::new()), None));
        let Slot::List(list) = &mut entry.slot else {
            return Err(StoreError::wrong_kind(key, "list"));
        };
        for payload in payloads {
            list.push_front(payload.clone());
        }
        list.truncate(capacity);
        if let Some(ttl) = ttl {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn list_range(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        match entries.get(key) {
            Some(Entry {
                slot: Slot::List(list),
                ..
            }) => Ok(list.iter().cloned().collect()),
            Some(_) => Err(StoreError::wrong_kind(key, "list")),
            None => Ok(Vec::new()),
        }
    }

    async fn list_len(&self, key: &str) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        match entries.get(key) {
            Some(Entry {
                slot: Slot::List(list),
                ..
            }) => Ok(list.len() as u64),
            Some(_) => Err(StoreError::wrong_kind(key, "list")),
            None => Ok(0),
        }
    }

    async fn set_add(
        &self,
        key: &str,
        payloads: &[String],
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Slot::Set(HashSet::new()), None));
        let Slot::Set(set) = &mut entry.slot else {
            return Err(StoreError::wrong_kind(key, "set"));
        };
        for payload in payloads {
            set.insert(payload.clone());
        }
        entry.expires_at = Some(Instant::now() + ttl);
        Ok(())
    }

    async fn set_remove(&self, key: &str, payloads: &[String]) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        match entries.get_mut(key) {
            Some(Entry {
                slot: Slot::Set(set),
                ..
            }) => {
                for payload in payloads {
                    set.remove(payload);
                }
                Ok(())
            }
            Some(_) => Err(StoreError::wrong_kind(key, "set")),
            None => Ok(()),
        }
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        match entries.get(key) {
            Some(Entry {
                slot: Slot::Set(set),
                ..
            }) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(StoreError::wrong_kind(key, "set")),
            None => Ok(Vec::new()),
        }
    }

    async fn set_len(&self, key: &str) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut entries = self.entries.lock().await;
        purge_if_expired(&mut entries, key);
        match entries.get(key) {
            Some(Entry {
                slot: Slot::Set(set),
                ..
            }) => Ok(set.len() as u64),
            Some(_) => Err(StoreError::wrong_kind(key, "set")),
            None => Ok(0),
        }
    }
}
