use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use hoard::{BoundedListCache, CacheKey, CacheOps, ListCache, SetCache};
use hoard_core::DynCollectionStore;
use hoard_memory::MemoryStore;

const TTL: Duration = Duration::from_secs(60);

fn store() -> DynCollectionStore {
    Arc::new(MemoryStore::new())
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn list_reads_are_head_first_and_empty_when_absent() {
    let cache = ListCache::<String>::new("timeline", TTL, store());
    let key = CacheKey::single("u1");

    assert_eq!(cache.get(&key).await.unwrap(), Vec::<String>::new());

    for value in ["a", "b", "c"] {
        cache.push(&key, &value.to_string(), true).await.unwrap();
    }
    assert_eq!(cache.get(&key).await.unwrap(), owned(&["c", "b", "a"]));
    assert_eq!(cache.len(&key).await.unwrap(), 3);

    cache.invalidate(&key).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), Vec::<String>::new());
}

#[tokio::test]
async fn list_multi_push_places_the_last_value_at_the_head() {
    let cache = ListCache::<String>::new("timeline", TTL, store());
    let key = CacheKey::single("u1");

    cache.push_all(&key, &owned(&["a", "b"]), true).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), owned(&["b", "a"]));
}

#[tokio::test]
async fn list_rejects_empty_pushes() {
    let cache = ListCache::<String>::new("timeline", TTL, store());
    let err = cache
        .push_all(&CacheKey::single("u1"), &[], true)
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[tokio::test]
async fn list_push_controls_whether_the_ttl_is_extended() {
    let cache = ListCache::<String>::new("timeline", Duration::from_millis(80), store());
    let expiring = CacheKey::single("expiring");
    let durable = CacheKey::single("durable");

    cache.push(&expiring, &"x".to_string(), true).await.unwrap();
    // Without the expire flag a fresh key gets no expiry at all.
    cache.push(&durable, &"y".to_string(), false).await.unwrap();

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(cache.get(&expiring).await.unwrap(), Vec::<String>::new());
    assert_eq!(cache.get(&durable).await.unwrap(), owned(&["y"]));
}

#[tokio::test]
async fn set_absorbs_duplicates_and_removes_members() {
    let cache = SetCache::<String>::new("tags", TTL, store());
    let key = CacheKey::single("post-1");

    cache
        .add_all(&key, &owned(&["rust", "rust", "cache"]))
        .await
        .unwrap();
    assert_eq!(cache.len(&key).await.unwrap(), 2);

    cache.remove(&key, &"rust".to_string()).await.unwrap();
    let members = cache.members(&key).await.unwrap();
    assert_eq!(members, HashSet::from(["cache".to_string()]));

    // Removing an absent member is a no-op.
    cache.remove(&key, &"missing".to_string()).await.unwrap();
    assert_eq!(cache.len(&key).await.unwrap(), 1);
}

#[tokio::test]
async fn set_len_is_zero_for_absent_keys() {
    let cache = SetCache::<String>::new("tags", TTL, store());
    assert_eq!(cache.len(&CacheKey::single("nobody")).await.unwrap(), 0);
    assert!(
        cache
            .members(&CacheKey::single("nobody"))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn set_adds_reset_the_ttl() {
    let cache = SetCache::<String>::new("tags", Duration::from_millis(120), store());
    let key = CacheKey::single("post-1");

    cache.add(&key, &"first".to_string()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(70)).await;
    cache.add(&key, &"second".to_string()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(70)).await;

    assert_eq!(cache.len(&key).await.unwrap(), 2);
}

#[tokio::test]
async fn bounded_list_evicts_oldest_first() {
    let cache = BoundedListCache::<String>::new("recent", TTL, 3, store()).unwrap();
    let key = CacheKey::single("u1");

    for value in ["a", "b", "c"] {
        cache.push(&key, &value.to_string(), true).await.unwrap();
    }
    assert_eq!(cache.get(&key).await.unwrap(), owned(&["c", "b", "a"]));

    cache.push(&key, &"d".to_string(), true).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), owned(&["d", "c", "b"]));

    cache.push(&key, &"e".to_string(), true).await.unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), owned(&["e", "d", "c"]));
}

#[tokio::test]
async fn bounded_list_holds_the_most_recent_capacity_pushes() {
    let capacity = 4;
    let cache = BoundedListCache::<String>::new("recent", TTL, capacity, store()).unwrap();
    let key = CacheKey::single("u1");

    for i in 0..10 {
        cache.push(&key, &format!("item-{i}"), true).await.unwrap();
    }

    let items = cache.get(&key).await.unwrap();
    assert_eq!(
        items,
        owned(&["item-9", "item-8", "item-7", "item-6"]),
    );
    assert_eq!(cache.len(&key).await.unwrap(), capacity as u64);
}

#[tokio::test]
async fn bounded_list_multi_push_stays_within_capacity() {
    let cache = BoundedListCache::<String>::new("recent", TTL, 3, store()).unwrap();
    let key = CacheKey::single("u1");

    cache
        .push_all(&key, &owned(&["a", "b", "c", "d"]), true)
        .await
        .unwrap();
    assert_eq!(cache.get(&key).await.unwrap(), owned(&["d", "c", "b"]));
}

#[tokio::test]
async fn bounded_list_rejects_zero_capacity() {
    let err = BoundedListCache::<String>::new("recent", TTL, 0, store()).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[tokio::test]
async fn clear_is_scoped_to_one_cache() {
    let store = store();
    let views = ListCache::<String>::new("views", TTL, Arc::clone(&store));
    let clicks = ListCache::<String>::new("clicks", TTL, Arc::clone(&store));
    let key = CacheKey::single("u1");

    views.push(&key, &"v".to_string(), true).await.unwrap();
    clicks.push(&key, &"c".to_string(), true).await.unwrap();

    assert_eq!(views.clear().await.unwrap(), 1);
    assert_eq!(views.get(&key).await.unwrap(), Vec::<String>::new());
    assert_eq!(clicks.get(&key).await.unwrap(), owned(&["c"]));
}
