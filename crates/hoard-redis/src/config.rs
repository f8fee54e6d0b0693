//! Redis backend configuration.

/// Connection settings for [`crate::RedisStore`].
///
/// The URL takes the usual `redis://[user:pass@]host:port[/db]` form. Pool
/// sizing is left to the pool defaults.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Server URL.
    pub url: String,
}

impl RedisConfig {
    /// Creates a configuration for the given server URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::new("redis://127.0.0.1:6379")
    }
}
