//! # hoard-core
//!
//! Core traits and types for the hoard caching layer.
//!
//! This crate defines the contracts the rest of the workspace is built on.
//! It contains no backend implementations — those live in `hoard-memory`
//! and `hoard-redis`, and the cache kinds that sit on top live in `hoard`.
//!
//! ## Overview
//!
//! - [`CacheKey`] / [`backend_key`] — structural keys and their rendered
//!   backend string form
//! - [`Codec`] — pluggable payload serialization, with [`JsonCodec`] as the
//!   default and [`NULL_PAYLOAD`] as the cached-null sentinel
//! - [`KeyValueStore`] / [`CollectionStore`] — the narrow surface a backend
//!   is consumed through
//! - [`Fetcher`] / [`BulkFetcher`] — caller-supplied miss resolution
//! - [`CacheError`] / [`StoreError`] — the error taxonomy
//!
//! ## Implementing a backend
//!
//! ```ignore
//! use async_trait::async_trait;
//! use hoard_core::{KeyValueStore, StoreError};
//!
//! struct MyStore { /* ... */ }
//!
//! #[async_trait]
//! impl KeyValueStore for MyStore {
//!     async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
//!         // ...
//!     }
//!     // ... other operations
//! }
//! ```

mod codec;
mod error;
mod fetch;
mod key;
mod store;

pub use codec::{Codec, CodecError, FnCodec, JsonCodec, NULL_PAYLOAD};
pub use error::{CacheError, ErrorCategory, StoreError};
pub use fetch::{BulkFetcher, FetchError, Fetcher};
pub use key::{
    CacheKey, KEY_FILLER, KEY_SEPARATOR, KeyPart, UNIQUE_KEY, backend_key, cache_prefix,
    member_backend_keys,
};
pub use store::{CollectionStore, DynCollectionStore, DynKvStore, KeyValueStore};

/// Type alias for a cache operation result.
pub type CacheResult<T> = Result<T, CacheError>;

/// Type alias for a store operation result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use hoard_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::codec::{Codec, CodecError, FnCodec, JsonCodec, NULL_PAYLOAD};
    pub use crate::error::{CacheError, ErrorCategory, StoreError};
    pub use crate::fetch::{BulkFetcher, FetchError, Fetcher};
    pub use crate::key::{CacheKey, KeyPart, backend_key, cache_prefix, member_backend_keys};
    pub use crate::store::{CollectionStore, DynCollectionStore, DynKvStore, KeyValueStore};
    pub use crate::{CacheResult, StoreResult};
}
