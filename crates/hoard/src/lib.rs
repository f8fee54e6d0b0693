//! # hoard
//!
//! Named, typed caches with bulk-key reconciliation over interchangeable
//! backends.
//!
//! A [`CacheRegistry`] binds cache instances to one shared backend
//! connection (`hoard-memory` in-process, `hoard-redis` over the network).
//! Five kinds are available:
//!
//! - [`ScalarCache`] — one value per key, read-through via a
//!   [`Fetcher`](hoard_core::Fetcher)
//! - [`BulkCache`] — batches of lookup identifiers, reconciled against
//!   registered [`BulkFetcher`](hoard_core::BulkFetcher)s
//! - [`ListCache`] — a head-ordered list per key
//! - [`SetCache`] — a deduplicated member set per key
//! - [`BoundedListCache`] — a list capped at the N most recent elements
//!
//! Values are serialized through a per-cache [`Codec`] (JSON by default)
//! and expire under backend-managed TTLs.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use hoard::{CacheRegistry, prelude::*};
//! use hoard_memory::MemoryStore;
//!
//! let registry = CacheRegistry::new(Arc::new(MemoryStore::new()));
//! let recent: BoundedListCache<String> =
//!     registry.bounded_list_cache("recent-views", Duration::from_secs(300), 50)?;
//!
//! recent.push(&CacheKey::single(user_id), &item, true).await?;
//! let latest = recent.get(&CacheKey::single(user_id)).await?;
//! ```

mod bounded;
mod bulk;
mod list;
mod ops;
mod registry;
mod scalar;
mod set;

pub use bounded::BoundedListCache;
pub use bulk::BulkCache;
pub use list::ListCache;
pub use ops::CacheOps;
pub use registry::CacheRegistry;
pub use scalar::ScalarCache;
pub use set::SetCache;

// Re-export the core contracts so callers depend on one crate.
pub use hoard_core::{
    BulkFetcher, CacheError, CacheKey, CacheResult, Codec, CodecError, ErrorCategory, FetchError,
    Fetcher, FnCodec, JsonCodec, KeyPart, NULL_PAYLOAD, StoreError,
};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use hoard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoundedListCache, BulkCache, CacheOps, CacheRegistry, ListCache, ScalarCache, SetCache,
    };
    pub use hoard_core::prelude::*;
}
