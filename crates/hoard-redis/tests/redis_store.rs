//! Integration tests against a live Redis server.
//!
//! Ignored by default; run with a server available:
//!
//! ```text
//! REDIS_URL=redis://127.0.0.1:6379 cargo test -p hoard-redis -- --ignored
//! ```

use std::time::Duration;

use hoard_core::{CollectionStore, KeyValueStore};
use hoard_redis::{RedisConfig, RedisStore};

fn store() -> RedisStore {
    let url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    RedisStore::connect(&RedisConfig::new(url)).expect("redis pool")
}

#[tokio::test]
#[ignore]
async fn round_trips_scalar_payloads() {
    let store = store();
    store.delete("it-scalar").await.unwrap();

    assert_eq!(store.get("it-scalar").await.unwrap(), None);
    store
        .put("it-scalar", "payload", Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(
        store.get("it-scalar").await.unwrap(),
        Some("payload".to_string())
    );
    assert!(store.exists("it-scalar").await.unwrap());

    store.delete("it-scalar").await.unwrap();
    assert_eq!(store.get("it-scalar").await.unwrap(), None);
}

#[tokio::test]
#[ignore]
async fn put_if_absent_does_not_clobber() {
    let store = store();
    store.delete("it-nx").await.unwrap();

    assert!(store
        .put_if_absent("it-nx", "first", Duration::from_secs(30))
        .await
        .unwrap());
    assert!(!store
        .put_if_absent("it-nx", "second", Duration::from_secs(30))
        .await
        .unwrap());
    assert_eq!(store.get("it-nx").await.unwrap(), Some("first".to_string()));

    store.delete("it-nx").await.unwrap();
}

#[tokio::test]
#[ignore]
async fn bounded_push_trims_to_capacity() {
    let store = store();
    store.delete("it-bounded").await.unwrap();

    for payload in ["a", "b", "c", "d", "e"] {
        store
            .list_push_bounded("it-bounded", &[payload.to_string()], 3, None)
            .await
            .unwrap();
    }
    assert_eq!(
        store.list_range("it-bounded").await.unwrap(),
        vec!["e", "d", "c"]
    );

    store.delete("it-bounded").await.unwrap();
}

#[tokio::test]
#[ignore]
async fn expiry_is_backend_managed() {
    let store = store();
    store.delete("it-ttl").await.unwrap();

    store
        .put("it-ttl", "soon gone", Duration::from_secs(1))
        .await
        .unwrap();
    assert!(store.exists("it-ttl").await.unwrap());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.get("it-ttl").await.unwrap(), None);
}
