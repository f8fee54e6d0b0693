//! # hoard-redis
//!
//! Redis backend for the hoard caching layer.
//!
//! [`RedisStore`] implements both store traits over a
//! [`deadpool_redis::Pool`], so every cache kind — scalar, bulk, list, set
//! and bounded list — can run against one shared connection pool. Bounded
//! pushes and push+expire pairs execute as MULTI/EXEC pipelines.
//!
//! ```ignore
//! use hoard_redis::{RedisConfig, RedisStore};
//!
//! let store = RedisStore::connect(&RedisConfig::new("redis://cache:6379"))?;
//! ```

mod config;
mod store;

pub use config::RedisConfig;
pub use store::RedisStore;
