mod support;

use std::sync::Arc;
use std::time::Duration;

use hoard::{CacheKey, CacheOps, CacheRegistry, CodecError, ErrorCategory, FnCodec, StoreError};
use hoard_memory::MemoryStore;
use support::CountingFetcher;

const TTL: Duration = Duration::from_secs(60);

fn registry() -> CacheRegistry {
    CacheRegistry::new(Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn duplicate_names_are_rejected_across_kinds() {
    let registry = registry();
    registry
        .list_cache::<String>("shared-name", TTL)
        .unwrap();

    let err = registry
        .scalar_cache::<String>("shared-name", TTL, Arc::new(CountingFetcher::new()))
        .unwrap_err();
    assert!(err.is_initialization());
    assert_eq!(err.cache_name(), "shared-name");

    // A different name goes through.
    registry.set_cache::<String>("other-name", TTL).unwrap();
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let registry = registry();
    let err = registry.list_cache::<String>("  ", TTL).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::InvalidArgument);
}

#[tokio::test]
async fn a_rejected_capacity_frees_the_name() {
    let registry = registry();
    let err = registry
        .bounded_list_cache::<String>("recent", TTL, 0)
        .unwrap_err();
    assert!(err.is_invalid_argument());

    // The failed creation must not burn the name.
    registry
        .bounded_list_cache::<String>("recent", TTL, 5)
        .unwrap();
}

#[tokio::test]
async fn caches_share_the_registry_backend() {
    let registry = registry();
    let cache = registry
        .scalar_cache("users", TTL, Arc::new(CountingFetcher::new()))
        .unwrap();
    assert_eq!(cache.backend_name(), "memory");
    assert_eq!(registry.backend_name(), "memory");
    assert_eq!(cache.name(), "users");
}

#[tokio::test]
async fn close_tears_down_every_cache() {
    let registry = registry();
    let users = registry
        .scalar_cache("users", TTL, Arc::new(CountingFetcher::new()))
        .unwrap();
    let timeline = registry.list_cache::<String>("timeline", TTL).unwrap();

    users
        .put(&CacheKey::single("1"), &"v".to_string())
        .await
        .unwrap();
    registry.close().await.unwrap();

    let err = users.get(&CacheKey::single("1")).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Execution);

    let err = timeline
        .push(&CacheKey::single("1"), &"v".to_string(), true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        hoard::CacheError::Store {
            source: StoreError::Closed,
            ..
        }
    ));
}

#[tokio::test]
async fn a_custom_codec_round_trips_non_json_values() {
    // A value type the default codec knows nothing about.
    #[derive(Debug, Clone, PartialEq)]
    struct Coordinates {
        lat: i64,
        lon: i64,
    }

    let codec = FnCodec::new(
        |value: &Coordinates| Ok(format!("{}|{}", value.lat, value.lon)),
        |payload| {
            let (lat, lon) = payload
                .split_once('|')
                .ok_or_else(|| CodecError::new("missing separator"))?;
            Ok(Coordinates {
                lat: lat.parse().map_err(|_| CodecError::new("bad latitude"))?,
                lon: lon.parse().map_err(|_| CodecError::new("bad longitude"))?,
            })
        },
    );

    let registry = registry();
    let cache = registry
        .list_cache_with_codec::<Coordinates>("positions", TTL, Arc::new(codec))
        .unwrap();

    let key = CacheKey::single("device-1");
    let here = Coordinates { lat: 12, lon: -34 };
    let there = Coordinates { lat: 56, lon: 78 };
    cache.push(&key, &here, true).await.unwrap();
    cache.push(&key, &there, true).await.unwrap();

    assert_eq!(cache.get(&key).await.unwrap(), vec![there, here]);
}

#[tokio::test]
async fn kinds_share_the_common_capability_surface() {
    let registry = registry();
    let scalar = registry
        .scalar_cache("a", TTL, Arc::new(CountingFetcher::new()))
        .unwrap();
    let list = registry.list_cache::<String>("b", TTL).unwrap();
    let set = registry.set_cache::<String>("c", TTL).unwrap();
    let bounded = registry.bounded_list_cache::<String>("d", TTL, 3).unwrap();

    let kinds: Vec<Arc<dyn CacheOps>> = vec![
        Arc::new(scalar),
        Arc::new(list),
        Arc::new(set),
        Arc::new(bounded),
    ];
    for kind in &kinds {
        assert_eq!(kind.backend_name(), "memory");
        assert_eq!(kind.clear().await.unwrap(), 0);
    }
    let names: Vec<&str> = kinds.iter().map(|kind| kind.name()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
}
