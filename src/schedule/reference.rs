//! Cached lookup of reference entities (teachers, rooms, buildings).
//!
//! Reference data changes rarely, so it is cached for a week and only
//! the ids absent from the cache are fetched upstream. Everything here
//! is best-effort: a lookup that fails end to end simply renders the
//! affected entry without a teacher or room name.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::schedule::cache::{
    CacheStore, BUILDING_CACHE_PREFIX, REFERENCE_CACHE_TTL, ROOM_CACHE_PREFIX,
    TEACHER_CACHE_PREFIX,
};
use crate::schedule::types::{Building, Room, Teacher};
use crate::schedule::upstream::ScheduleApi;

#[derive(Clone)]
pub struct ReferenceDirectory {
    api: ScheduleApi,
    store: CacheStore,
}

impl ReferenceDirectory {
    pub fn new(api: ScheduleApi, store: CacheStore) -> Self {
        Self { api, store }
    }

    pub async fn teachers(&self, ids: &[i64]) -> HashMap<i64, Teacher> {
        self.get_batch(TEACHER_CACHE_PREFIX, ids, |api, missing| async move {
            api.fetch_teachers(&missing).await
        })
        .await
    }

    pub async fn rooms(&self, ids: &[i64]) -> HashMap<i64, Room> {
        self.get_batch(ROOM_CACHE_PREFIX, ids, |api, missing| async move {
            api.fetch_rooms(&missing).await
        })
        .await
    }

    pub async fn buildings(&self, ids: &[i64]) -> HashMap<i64, Building> {
        self.get_batch(BUILDING_CACHE_PREFIX, ids, |api, missing| async move {
            api.fetch_buildings(&missing).await
        })
        .await
    }

    async fn get_batch<T, F, Fut>(
        &self,
        prefix: &str,
        ids: &[i64],
        fetch_missing: F,
    ) -> HashMap<i64, T>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce(ScheduleApi, Vec<i64>) -> Fut,
        Fut: std::future::Future<Output = HashMap<i64, T>>,
    {
        let ids = normalize_ids(ids);
        if ids.is_empty() {
            return HashMap::new();
        }

        let (mut found, missing) = self.store.get_many::<T>(prefix, &ids).await;

        if !missing.is_empty() {
            let fetched = fetch_missing(self.api.clone(), missing).await;
            if !fetched.is_empty() {
                self.store
                    .set_many(
                        prefix,
                        fetched.iter().map(|(id, item)| (*id, item.clone())),
                        REFERENCE_CACHE_TTL,
                    )
                    .await;
                found.extend(fetched);
            }
        }

        found
    }
}

/// Dedupes and sorts so that cache keys and upstream parameters are
/// deterministic regardless of entry order.
fn normalize_ids(ids: &[i64]) -> Vec<i64> {
    let mut ids: Vec<i64> = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}
