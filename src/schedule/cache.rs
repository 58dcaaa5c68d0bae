//! Redis-backed cache layer.
//!
//! The cache is advisory: every component keeps working when the store
//! is unreachable, it just pays for more upstream calls. `CacheStore`
//! therefore never surfaces an error. Reads degrade to misses, writes
//! to no-ops, and failures are logged at warn level.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::schedule::types::ScheduleEntry;

/// The group tree changes rarely but is rebuilt daily anyway.
pub const GROUPS_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Teachers, rooms and buildings are close to static.
pub const REFERENCE_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// Schedules drift during the week; one hour absorbs mailing bursts.
pub const SCHEDULE_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

pub const GROUPS_CACHE_KEY: &str = "groups:tree";
pub const TEACHER_CACHE_PREFIX: &str = "teacher";
pub const ROOM_CACHE_PREFIX: &str = "room";
pub const BUILDING_CACHE_PREFIX: &str = "building";
const SCHEDULE_CACHE_PREFIX: &str = "schedule";

/// Capability-checked handle to the key-value store. Constructed once
/// at startup and cloned into every component that caches.
#[derive(Clone)]
pub struct CacheStore {
    conn: Option<ConnectionManager>,
}

impl CacheStore {
    /// Connects to Redis if a URL is configured. Connection failure is
    /// not fatal: the bot runs without caching.
    pub async fn connect(redis_url: Option<&str>) -> Self {
        let Some(url) = redis_url.filter(|u| !u.trim().is_empty()) else {
            info!("no redis url configured, caching disabled");
            return Self { conn: None };
        };

        let client = match redis::Client::open(url) {
            Ok(client) => client,
            Err(err) => {
                warn!("invalid redis url, caching disabled: {}", err);
                return Self { conn: None };
            }
        };

        match client.get_connection_manager().await {
            Ok(conn) => {
                info!("connected to redis cache");
                Self { conn: Some(conn) }
            }
            Err(err) => {
                warn!("redis is unavailable, caching disabled: {}", err);
                Self { conn: None }
            }
        }
    }

    /// A store with no backend: always misses, never stores.
    pub fn disabled() -> Self {
        Self { conn: None }
    }

    pub fn available(&self) -> bool {
        self.conn.is_some()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone()?;
        let raw: Option<String> = match conn.get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!("failed to read cache {}: {}", key, err);
                return None;
            }
        };
        serde_json::from_str(&raw?).ok()
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("failed to serialize cache value {}: {}", key, err);
                return;
            }
        };
        if let Err(err) = conn
            .set_ex::<_, _, ()>(key, raw, ttl.as_secs())
            .await
        {
            warn!("failed to write cache {}: {}", key, err);
        }
    }

    pub async fn delete(&self, key: &str) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        if let Err(err) = conn.del::<_, ()>(key).await {
            warn!("failed to delete cache {}: {}", key, err);
        }
    }

    /// Looks up `{prefix}:{id}` for every id. Store unavailability is a
    /// full miss, never an error.
    pub async fn get_many<T: DeserializeOwned>(
        &self,
        prefix: &str,
        ids: &[i64],
    ) -> (HashMap<i64, T>, Vec<i64>) {
        if ids.is_empty() {
            return (HashMap::new(), Vec::new());
        }
        let Some(mut conn) = self.conn.clone() else {
            return (HashMap::new(), ids.to_vec());
        };

        let keys: Vec<String> = ids.iter().map(|id| format!("{}:{}", prefix, id)).collect();
        let values: Vec<Option<String>> = match conn.mget(&keys).await {
            Ok(values) => values,
            Err(err) => {
                warn!("failed to read cache {}: {}", prefix, err);
                return (HashMap::new(), ids.to_vec());
            }
        };

        let mut found = HashMap::new();
        let mut missing = Vec::new();
        for (id, raw) in ids.iter().zip(values) {
            match raw.as_deref().map(serde_json::from_str::<T>) {
                Some(Ok(value)) => {
                    found.insert(*id, value);
                }
                _ => missing.push(*id),
            }
        }
        (found, missing)
    }

    /// Best-effort batched write via an atomic SETEX pipeline.
    pub async fn set_many<T: Serialize>(
        &self,
        prefix: &str,
        items: impl IntoIterator<Item = (i64, T)>,
        ttl: Duration,
    ) {
        let Some(mut conn) = self.conn.clone() else {
            return;
        };
        let mut pipe = redis::pipe();
        pipe.atomic();
        let mut queued = false;
        for (id, item) in items {
            let raw = match serde_json::to_string(&item) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!("failed to serialize cache value {}:{}: {}", prefix, id, err);
                    continue;
                }
            };
            pipe.set_ex(format!("{}:{}", prefix, id), raw, ttl.as_secs())
                .ignore();
            queued = true;
        }
        if !queued {
            return;
        }
        if let Err(err) = pipe.query_async::<()>(&mut conn).await {
            warn!("failed to write cache {}: {}", prefix, err);
        }
    }

    async fn delete_by_pattern(&self, pattern: &str) -> usize {
        let Some(mut conn) = self.conn.clone() else {
            return 0;
        };
        let keys: Vec<String> = {
            let mut iter = match conn.scan_match::<_, String>(pattern).await {
                Ok(iter) => iter,
                Err(err) => {
                    warn!("failed to scan cache {}: {}", pattern, err);
                    return 0;
                }
            };
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };
        if keys.is_empty() {
            return 0;
        }
        let count = keys.len();
        if let Err(err) = conn.del::<_, ()>(keys).await {
            warn!("failed to delete cache {}: {}", pattern, err);
            return 0;
        }
        count
    }
}

/// Memoizes raw schedule responses per query so that a mailing burst to
/// one group hits the upstream once.
#[derive(Clone)]
pub struct ScheduleCache {
    store: CacheStore,
}

impl ScheduleCache {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }

    /// Every dimension that affects the upstream answer is part of the
    /// key; omitting one would serve another query's entries.
    fn key(
        group_id: i64,
        sub_group_id: Option<i64>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exam_only: bool,
    ) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}",
            SCHEDULE_CACHE_PREFIX,
            group_id,
            sub_group_id.unwrap_or(0),
            start_date.format("%Y-%m-%d"),
            end_date.format("%Y-%m-%d"),
            u8::from(exam_only),
        )
    }

    pub async fn get(
        &self,
        group_id: i64,
        sub_group_id: Option<i64>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exam_only: bool,
    ) -> Option<Vec<ScheduleEntry>> {
        let key = Self::key(group_id, sub_group_id, start_date, end_date, exam_only);
        self.store.get_json(&key).await
    }

    pub async fn put(
        &self,
        group_id: i64,
        sub_group_id: Option<i64>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exam_only: bool,
        entries: &[ScheduleEntry],
    ) {
        let key = Self::key(group_id, sub_group_id, start_date, end_date, exam_only);
        self.store.set_json(&key, &entries, SCHEDULE_CACHE_TTL).await;
    }

    /// Manual invalidation for when the upstream is suspected stale.
    pub async fn clear(&self) -> usize {
        self.store
            .delete_by_pattern(&format!("{}:*", SCHEDULE_CACHE_PREFIX))
            .await
    }
}
