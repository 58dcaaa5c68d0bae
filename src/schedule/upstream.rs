//! HTTP client for the university schedule API.
//!
//! Every public fetch converts transport failures, bad statuses and
//! malformed bodies into `None` with a logged reason, so callers can
//! tell "the source is broken" (`None`) apart from "the source says
//! there is nothing" (`Some` with an empty collection). Nothing in
//! here touches shared state.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

use crate::schedule::types::{
    Building, FacultyRecord, GroupRecord, Room, ScheduleEntry, SubGroupRecord, Teacher,
};

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    #[error("bad status: {0}")]
    BadStatus(reqwest::StatusCode),
    #[error("malformed body: {0}")]
    MalformedBody(reqwest::Error),
}

#[derive(Clone)]
pub struct ScheduleApi {
    client: reqwest::Client,
    base_url: String,
}

impl ScheduleApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("herzen-schedule-bot/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout
                } else {
                    UpstreamError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::BadStatus(status));
        }

        response.json::<T>().await.map_err(UpstreamError::MalformedBody)
    }

    /// Fetch + log wrapper: the error taxonomy collapses to `None` at
    /// this boundary, with the failing endpoint and context in the log.
    async fn fetch_logged<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        context: &str,
    ) -> Option<T> {
        match self.fetch(path, params).await {
            Ok(value) => Some(value),
            Err(err) => {
                error!("upstream {} failed for {}/{}: {}", context, self.base_url, path, err);
                None
            }
        }
    }

    /// Raw schedule entries for a group over an inclusive date range.
    ///
    /// `Some(vec![])` is a confirmed "no classes"; `None` means the
    /// schedule could not be determined.
    pub async fn fetch_schedule(
        &self,
        group_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        sub_group_id: Option<i64>,
        exam_only: bool,
    ) -> Option<Vec<ScheduleEntry>> {
        let mut params = vec![
            ("group_id", group_id.to_string()),
            ("start_date", start_date.format("%Y-%m-%d").to_string()),
            ("end_date", end_date.format("%Y-%m-%d").to_string()),
        ];
        if let Some(sub_group_id) = sub_group_id.filter(|id| *id != 0) {
            params.push(("sub_group_id", sub_group_id.to_string()));
        }
        if exam_only {
            params.push(("exam_only", "true".to_string()));
        }
        self.fetch_logged("schedule", &params, "schedule").await
    }

    pub async fn fetch_groups(&self) -> Option<Vec<GroupRecord>> {
        self.fetch_logged("groups", &[], "groups").await
    }

    pub async fn fetch_faculties(&self) -> Option<Vec<FacultyRecord>> {
        self.fetch_logged("faculties", &[], "faculties").await
    }

    pub async fn fetch_sub_groups(&self) -> Option<Vec<SubGroupRecord>> {
        self.fetch_logged("sub_groups", &[], "sub_groups").await
    }

    pub async fn fetch_teachers(&self, ids: &[i64]) -> HashMap<i64, Teacher> {
        self.fetch_reference("teachers", "teacher_ids", ids, |t: &Teacher| t.id)
            .await
    }

    pub async fn fetch_rooms(&self, ids: &[i64]) -> HashMap<i64, Room> {
        self.fetch_reference("rooms", "room_ids", ids, |r: &Room| r.id)
            .await
    }

    pub async fn fetch_buildings(&self, ids: &[i64]) -> HashMap<i64, Building> {
        self.fetch_reference("buildings", "building_ids", ids, |b: &Building| b.id)
            .await
    }

    /// Batched reference lookup. Reference display is best-effort, so a
    /// failed call degrades to an empty map instead of an error.
    async fn fetch_reference<T: DeserializeOwned>(
        &self,
        path: &str,
        ids_param: &str,
        ids: &[i64],
        id_of: impl Fn(&T) -> i64,
    ) -> HashMap<i64, T> {
        if ids.is_empty() {
            return HashMap::new();
        }
        let joined = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let records: Option<Vec<T>> = self
            .fetch_logged(path, &[(ids_param, joined)], path)
            .await;
        records
            .unwrap_or_default()
            .into_iter()
            .map(|record| (id_of(&record), record))
            .collect()
    }
}
