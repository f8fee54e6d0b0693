//! Shared fixtures: counting fetchers over fixed data sets.
#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hoard::{BulkFetcher, CacheKey, FetchError, Fetcher, KeyPart};

/// Returns the first atom of a key, for fetchers that derive values from it.
pub fn first_atom(key: &CacheKey) -> String {
    match key.parts().first() {
        Some(KeyPart::Atom(value)) => value.clone(),
        _ => String::new(),
    }
}

/// A fetcher that derives `v:{atom}` from the key and counts invocations.
#[derive(Default)]
pub struct CountingFetcher {
    pub calls: AtomicUsize,
    /// When set, every fetch resolves to `None` (a domain null).
    pub always_null: bool,
}

impl CountingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn null() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            always_null: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher<String> for CountingFetcher {
    async fn fetch(&self, key: &CacheKey) -> Result<Option<String>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.always_null {
            Ok(None)
        } else {
            Ok(Some(format!("v:{}", first_atom(key))))
        }
    }
}

/// A fetcher that always fails.
pub struct FailingFetcher;

#[async_trait]
impl Fetcher<String> for FailingFetcher {
    async fn fetch(&self, _key: &CacheKey) -> Result<Option<String>, FetchError> {
        Err("source of truth is down".into())
    }
}

/// A bulk fetcher over a fixed data set, recording every batch it is given.
#[derive(Default)]
pub struct MapBulkFetcher {
    data: HashMap<String, String>,
    pub calls: AtomicUsize,
    pub batches: Mutex<Vec<Vec<String>>>,
}

impl MapBulkFetcher {
    pub fn with_entries<const N: usize>(entries: [(&str, &str); N]) -> Self {
        Self {
            data: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The identifiers of the last batch, sorted for stable assertions.
    pub fn last_batch(&self) -> Vec<String> {
        let batches = self.batches.lock().unwrap();
        let mut last = batches.last().cloned().unwrap_or_default();
        last.sort();
        last
    }
}

#[async_trait]
impl BulkFetcher<String> for MapBulkFetcher {
    async fn fetch_many(&self, ids: &[String]) -> Result<HashMap<String, String>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(ids.to_vec());
        Ok(ids
            .iter()
            .filter_map(|id| self.data.get(id).map(|v| (id.clone(), v.clone())))
            .collect())
    }
}

/// A bulk fetcher that always fails.
pub struct FailingBulkFetcher;

#[async_trait]
impl BulkFetcher<String> for FailingBulkFetcher {
    async fn fetch_many(&self, _ids: &[String]) -> Result<HashMap<String, String>, FetchError> {
        Err("batch source is down".into())
    }
}

/// Key groups used across the bulk tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    ById,
    BySlug,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ById => write!(f, "id"),
            Self::BySlug => write!(f, "slug"),
        }
    }
}
