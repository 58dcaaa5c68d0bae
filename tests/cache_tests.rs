use std::time::Duration;

use herzen_schedule_bot::schedule::cache::{CacheStore, ScheduleCache};
use herzen_schedule_bot::schedule::types::{ScheduleEntry, Teacher};

fn sample_entry() -> ScheduleEntry {
    ScheduleEntry {
        start_time: Some("2024-03-04T09:00:00+03:00".to_string()),
        end_time: Some("2024-03-04T10:30:00+03:00".to_string()),
        group_id: Some(12345),
        sub_group_id: None,
        faculty_id: None,
        name: Some("Лекция".to_string()),
        kind: Some("лекция".to_string()),
        note: None,
        teacher_id: Some(7),
        room_id: Some(31),
        class_url: None,
    }
}

fn date(year: i32, month: u32, day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

// Live-backend tests connect to a local Redis and skip silently when
// none is running, so the suite stays green on a bare checkout.
async fn live_store() -> Option<CacheStore> {
    let store = CacheStore::connect(Some("redis://127.0.0.1:6379")).await;
    store.available().then_some(store)
}

#[tokio::test]
async fn test_disabled_store_misses_and_ignores_writes() {
    let store = CacheStore::disabled();
    assert!(!store.available());

    store
        .set_json("test:disabled", &"value", Duration::from_secs(60))
        .await;
    let read: Option<String> = store.get_json("test:disabled").await;
    assert_eq!(read, None);
}

#[tokio::test]
async fn test_disabled_store_reports_everything_missing() {
    let store = CacheStore::disabled();
    let (found, missing) = store.get_many::<Teacher>("teacher", &[1, 2, 3]).await;
    assert!(found.is_empty());
    assert_eq!(missing, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_connect_without_url_disables_caching() {
    let store = CacheStore::connect(None).await;
    assert!(!store.available());
    let store = CacheStore::connect(Some("  ")).await;
    assert!(!store.available());
}

#[tokio::test]
async fn test_connect_to_unreachable_server_disables_caching() {
    let store = CacheStore::connect(Some("redis://127.0.0.1:1")).await;
    assert!(!store.available());
}

#[tokio::test]
async fn test_schedule_cache_miss_on_disabled_store() {
    let cache = ScheduleCache::new(CacheStore::disabled());
    let read = cache
        .get(12345, None, date(2024, 3, 4), date(2024, 3, 4), false)
        .await;
    assert!(read.is_none());
    assert_eq!(cache.clear().await, 0);
}

#[tokio::test]
async fn test_live_json_roundtrip() {
    let Some(store) = live_store().await else {
        return;
    };

    let teacher = Teacher {
        id: 314159,
        name: Some("Иванов И.И.".to_string()),
        rank: Some("доцент".to_string()),
        atlas_url: None,
    };
    store
        .set_json("teacher:314159", &teacher, Duration::from_secs(60))
        .await;

    let read: Option<Teacher> = store.get_json("teacher:314159").await;
    assert_eq!(read.map(|t| t.id), Some(314159));

    store.delete("teacher:314159").await;
    let gone: Option<Teacher> = store.get_json("teacher:314159").await;
    assert!(gone.is_none());
}

#[tokio::test]
async fn test_live_batch_read_reports_missing_ids() {
    let Some(store) = live_store().await else {
        return;
    };

    let present = Teacher {
        id: 271828,
        name: Some("Петрова А.А.".to_string()),
        rank: None,
        atlas_url: None,
    };
    store
        .set_many("teacher", [(271828i64, present)], Duration::from_secs(60))
        .await;

    let (found, missing) = store
        .get_many::<Teacher>("teacher", &[271828, 918273645])
        .await;
    assert!(found.contains_key(&271828));
    assert_eq!(missing, vec![918273645]);

    store.delete("teacher:271828").await;
}

#[tokio::test]
async fn test_live_schedule_cache_key_dimensions() {
    let Some(store) = live_store().await else {
        return;
    };
    let cache = ScheduleCache::new(store);

    let start = date(2034, 3, 6);
    let end = date(2034, 3, 6);
    let entries = vec![sample_entry()];
    cache.put(918273645, None, start, end, false, &entries).await;

    let hit = cache.get(918273645, None, start, end, false).await;
    assert_eq!(hit.map(|e| e.len()), Some(1));

    // Any differing dimension is a distinct key.
    assert!(cache.get(918273645, Some(1), start, end, false).await.is_none());
    assert!(cache.get(918273645, None, start, end, true).await.is_none());
    assert!(cache
        .get(918273645, None, start, date(2034, 3, 7), false)
        .await
        .is_none());

    assert!(cache.clear().await >= 1);
    assert!(cache.get(918273645, None, start, end, false).await.is_none());
}
