//! Error types for the hoard caching layer.
//!
//! Two levels are distinguished: [`StoreError`] is raised by backend store
//! implementations (connection faults, bad replies), while [`CacheError`] is
//! the taxonomy cache callers see, carrying the cache name and key context
//! needed to diagnose a failure.

use std::fmt;

/// Errors raised by a backend store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The connection to the backend could not be obtained or was lost.
    #[error("connection error: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },

    /// The backend rejected or failed a command.
    #[error("backend error: {message}")]
    Backend {
        /// Description of the backend failure.
        message: String,
    },

    /// A collection operation was issued against a key holding a different
    /// entry kind (the in-process analogue of a WRONGTYPE reply).
    #[error("wrong entry kind at `{key}`: expected {expected}")]
    WrongKind {
        /// The backend key that holds the mismatched entry.
        key: String,
        /// The entry kind the operation required.
        expected: &'static str,
    },

    /// The store has been closed by its owning registry.
    #[error("store is closed")]
    Closed,
}

impl StoreError {
    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a new `WrongKind` error.
    #[must_use]
    pub fn wrong_kind(key: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongKind {
            key: key.into(),
            expected,
        }
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Errors surfaced to cache callers.
///
/// Invalid arguments fail fast before any backend call is made;
/// serialization failures are surfaced for single-key operations and
/// downgraded to logged misses inside bulk reconciliation; execution
/// failures (backend or batch-fetch) are never retried by this layer.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A null/blank key, name or member was passed, or an unsupported
    /// configuration was requested. No backend call was made.
    #[error("cache `{cache}`: invalid argument: {message}")]
    InvalidArgument {
        /// The cache the operation was issued against.
        cache: String,
        /// Description of the rejected argument.
        message: String,
    },

    /// Encoding or decoding a payload failed.
    #[error("cache `{cache}`: serialization failed for key `{key}`: {message}")]
    Serialization {
        /// The cache the operation was issued against.
        cache: String,
        /// The backend key whose payload failed to convert.
        key: String,
        /// Description of the codec failure.
        message: String,
    },

    /// A backend store call failed.
    #[error("cache `{cache}`: backend operation failed")]
    Store {
        /// The cache the operation was issued against.
        cache: String,
        /// The underlying store failure.
        #[source]
        source: StoreError,
    },

    /// A caller-supplied fetch function failed; fatal for the whole call.
    #[error("cache `{cache}`: fetch failed: {message}")]
    Fetch {
        /// The cache the operation was issued against.
        cache: String,
        /// Description of the fetch failure.
        message: String,
    },

    /// Cache creation failed (duplicate name, backend construction).
    #[error("cache `{cache}`: initialization failed: {message}")]
    Initialization {
        /// The cache that could not be created.
        cache: String,
        /// Description of the initialization failure.
        message: String,
    },
}

impl CacheError {
    /// Creates a new `InvalidArgument` error.
    #[must_use]
    pub fn invalid_argument(cache: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            cache: cache.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Serialization` error.
    #[must_use]
    pub fn serialization(
        cache: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Serialization {
            cache: cache.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Store` error wrapping a backend failure.
    #[must_use]
    pub fn store(cache: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            cache: cache.into(),
            source,
        }
    }

    /// Creates a new `Fetch` error.
    #[must_use]
    pub fn fetch(cache: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            cache: cache.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Initialization` error.
    #[must_use]
    pub fn initialization(cache: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Initialization {
            cache: cache.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is an invalid-argument error.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` if this is a serialization error.
    #[must_use]
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Returns `true` if this is an initialization error.
    #[must_use]
    pub fn is_initialization(&self) -> bool {
        matches!(self, Self::Initialization { .. })
    }

    /// Returns the name of the cache the error belongs to.
    #[must_use]
    pub fn cache_name(&self) -> &str {
        match self {
            Self::InvalidArgument { cache, .. }
            | Self::Serialization { cache, .. }
            | Self::Store { cache, .. }
            | Self::Fetch { cache, .. }
            | Self::Initialization { cache, .. } => cache,
        }
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidArgument { .. } => ErrorCategory::InvalidArgument,
            Self::Serialization { .. } => ErrorCategory::Serialization,
            Self::Store { .. } | Self::Fetch { .. } => ErrorCategory::Execution,
            Self::Initialization { .. } => ErrorCategory::Initialization,
        }
    }
}

/// Categories of cache errors for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad caller input, rejected before any backend call.
    InvalidArgument,
    /// Payload encode/decode failure.
    Serialization,
    /// Backend call or fetch function failure.
    Execution,
    /// Cache creation failure.
    Initialization,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid_argument"),
            Self::Serialization => write!(f, "serialization"),
            Self::Execution => write!(f, "execution"),
            Self::Initialization => write!(f, "initialization"),
        }
    }
}
