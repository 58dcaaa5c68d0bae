//! The schedule normalizer: turns a `ScheduleQuery` into per-day,
//! time-ordered formatted class blocks.
//!
//! The pipeline splits the requested range around the summer recess,
//! fans the remaining sub-ranges out to the upstream (through the
//! schedule cache), joins the raw entries with teacher/room/building
//! reference data and groups the result by localized day label.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use tracing::warn;

use crate::schedule::cache::ScheduleCache;
use crate::schedule::format::{
    abbreviate_kind, day_label, room_display, teacher_display, ModifierCleaner,
};
use crate::schedule::reference::ReferenceDirectory;
use crate::schedule::types::{
    Building, ClassBlock, DaySchedule, Room, ScheduleEntry, ScheduleLookup, ScheduleQuery, Teacher,
};
use crate::schedule::upstream::ScheduleApi;
use crate::services::timezone::TimezoneResolver;

#[derive(Clone)]
pub struct ScheduleResolver {
    api: ScheduleApi,
    cache: ScheduleCache,
    references: ReferenceDirectory,
    timezones: TimezoneResolver,
    cleaner: ModifierCleaner,
    site_base_url: String,
}

impl ScheduleResolver {
    pub fn new(
        api: ScheduleApi,
        cache: ScheduleCache,
        references: ReferenceDirectory,
        timezones: TimezoneResolver,
        cleaner: ModifierCleaner,
        site_base_url: &str,
    ) -> Self {
        Self {
            api,
            cache,
            references,
            timezones,
            cleaner,
            site_base_url: site_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Deep link to the online schedule for a group, always returned so
    /// the user can cross-check the source even when resolution fails.
    pub fn view_url(&self, group_id: i64) -> String {
        format!("{}/schedule/{}/by-dates", self.site_base_url, group_id)
    }

    /// Resolves one query end to end.
    ///
    /// `days: None` means at least one sub-range could not be fetched;
    /// a partial schedule is never presented as complete. An empty
    /// `days` vector is an affirmative "no classes".
    pub async fn resolve(&self, query: ScheduleQuery) -> ScheduleLookup {
        let view_url = self.view_url(query.group_id);
        let end_date = query.end_date.unwrap_or(query.start_date);
        let sub_group_id = resolve_sub_group(query.group_id, query.sub_group);

        let ranges = non_summer_ranges(query.start_date, end_date);
        if ranges.is_empty() {
            return ScheduleLookup::empty(view_url);
        }

        // Fan-out over sub-ranges, fan-in before any processing: all
        // fetches must land (or one must fail) before normalization.
        let fetches = ranges.iter().map(|(start, end)| {
            self.cached_schedule(query.group_id, sub_group_id, *start, *end, query.exam_only)
        });
        let mut entries: Vec<ScheduleEntry> = Vec::new();
        for fetched in futures::future::join_all(fetches).await {
            match fetched {
                Some(batch) => entries.extend(batch),
                None => return ScheduleLookup::unavailable(view_url),
            }
        }

        if entries.is_empty() {
            return ScheduleLookup::empty(view_url);
        }

        let teacher_ids: Vec<i64> = entries.iter().filter_map(|e| e.teacher_id).collect();
        let room_ids: Vec<i64> = entries.iter().filter_map(|e| e.room_id).collect();
        let (teachers, rooms) = tokio::join!(
            self.references.teachers(&teacher_ids),
            self.references.rooms(&room_ids),
        );
        // Two-level join: buildings are only discoverable through the
        // resolved rooms.
        let building_ids: Vec<i64> = rooms.values().filter_map(|r| r.building_id).collect();
        let buildings = self.references.buildings(&building_ids).await;

        let days = build_days(
            &entries,
            &teachers,
            &rooms,
            &buildings,
            &self.timezones,
            &self.cleaner,
        );
        ScheduleLookup {
            days: Some(days),
            view_url,
        }
    }

    /// Schedule-cache read-through around the upstream fetch.
    async fn cached_schedule(
        &self,
        group_id: i64,
        sub_group_id: Option<i64>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exam_only: bool,
    ) -> Option<Vec<ScheduleEntry>> {
        if let Some(entries) = self
            .cache
            .get(group_id, sub_group_id, start_date, end_date, exam_only)
            .await
        {
            return Some(entries);
        }

        let entries = self
            .api
            .fetch_schedule(group_id, start_date, end_date, sub_group_id, exam_only)
            .await?;
        self.cache
            .put(group_id, sub_group_id, start_date, end_date, exam_only, &entries)
            .await;
        Some(entries)
    }
}

/// Maps the caller's subgroup selector to the upstream `sub_group_id`.
///
/// Selectors `1` and `2` are a deprecated positional encoding from the
/// HTML-scraping era: the effective id is the group id with the
/// selector appended as a final digit. The scheme is kept for stored
/// user rows that predate explicit subgroup ids and must not be
/// extended. `0`/absent means no filter; anything else is already an
/// explicit upstream id.
pub fn resolve_sub_group(group_id: i64, sub_group: Option<i64>) -> Option<i64> {
    match sub_group {
        None | Some(0) => None,
        Some(selector @ (1 | 2)) => format!("{}{}", group_id, selector)
            .parse()
            .ok()
            .or(Some(selector)),
        Some(explicit) => Some(explicit),
    }
}

/// Splits an inclusive date range into the sub-ranges lying outside the
/// summer recess (June 1 to August 31 of the range's starting year). The
/// upstream has no data for recess dates, so they are never queried. An
/// empty result means the whole range was recess.
pub fn non_summer_ranges(
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Vec<(NaiveDate, NaiveDate)> {
    let (Some(summer_start), Some(summer_end)) = (
        NaiveDate::from_ymd_opt(start_date.year(), 6, 1),
        NaiveDate::from_ymd_opt(start_date.year(), 8, 31),
    ) else {
        return vec![(start_date, end_date)];
    };

    if end_date < summer_start || start_date > summer_end {
        return vec![(start_date, end_date)];
    }

    let mut ranges = Vec::new();
    if start_date < summer_start {
        ranges.push((start_date, end_date.min(summer_start - Duration::days(1))));
    }
    if end_date > summer_end {
        ranges.push((start_date.max(summer_end + Duration::days(1)), end_date));
    }
    ranges
}

/// Groups raw entries into chronologically ordered days of formatted
/// blocks. Entries without a parseable start or end instant cannot be
/// placed on a day and are dropped. Unresolvable teacher/room ids
/// render with empty display fields.
pub fn build_days(
    entries: &[ScheduleEntry],
    teachers: &HashMap<i64, Teacher>,
    rooms: &HashMap<i64, Room>,
    buildings: &HashMap<i64, Building>,
    timezones: &TimezoneResolver,
    cleaner: &ModifierCleaner,
) -> Vec<DaySchedule> {
    let mut placed: Vec<(DateTime<Tz>, DateTime<Tz>, &ScheduleEntry)> = Vec::new();
    for entry in entries {
        let tz = timezones.for_faculty(entry.faculty_id);
        let start = entry.start_time.as_deref().and_then(|v| parse_instant(v, tz));
        let end = entry.end_time.as_deref().and_then(|v| parse_instant(v, tz));
        match (start, end) {
            (Some(start), Some(end)) => placed.push((start, end, entry)),
            _ => warn!(
                "dropping schedule entry without parseable timestamps: {:?} / {:?}",
                entry.start_time, entry.end_time
            ),
        }
    }
    placed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut days: Vec<DaySchedule> = Vec::new();
    for (start, end, entry) in placed {
        let label = day_label(start.date_naive());
        let block = format_block(start, end, entry, teachers, rooms, buildings, cleaner);

        match days.iter_mut().find(|day| day.label == label) {
            Some(day) => day.classes.push(block),
            None => days.push(DaySchedule {
                label,
                classes: vec![block],
            }),
        }
    }
    days
}

fn format_block(
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    entry: &ScheduleEntry,
    teachers: &HashMap<i64, Teacher>,
    rooms: &HashMap<i64, Room>,
    buildings: &HashMap<i64, Building>,
    cleaner: &ModifierCleaner,
) -> ClassBlock {
    let (teacher, teacher_url) = match entry.teacher_id.and_then(|id| teachers.get(&id)) {
        Some(record) => (
            teacher_display(
                record.rank.as_deref().unwrap_or(""),
                record.name.as_deref().unwrap_or(""),
            ),
            record.atlas_url.clone().unwrap_or_default(),
        ),
        None => (String::new(), String::new()),
    };

    let room = match entry.room_id.and_then(|id| rooms.get(&id)) {
        Some(record) => {
            let building = record
                .building_id
                .and_then(|id| buildings.get(&id))
                .and_then(|b| b.name.as_deref())
                .unwrap_or("");
            room_display(record.name.as_deref().unwrap_or(""), building)
        }
        None => String::new(),
    };

    ClassBlock {
        time: format!("{} — {}", start.format("%H:%M"), end.format("%H:%M")),
        modifier: cleaner.clean(entry.note.as_deref().unwrap_or("")),
        title: entry.name.clone().unwrap_or_default(),
        kind: abbreviate_kind(entry.kind.as_deref().unwrap_or("")),
        teacher,
        teacher_url,
        room,
        class_url: entry.class_url.clone().unwrap_or_default(),
    }
}

/// Parses an upstream instant: RFC 3339 with offset or `Z`, or a naive
/// local timestamp interpreted in the entry's timezone.
pub fn parse_instant(value: &str, tz: Tz) -> Option<DateTime<Tz>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&tz));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return naive.and_local_timezone(tz).single();
        }
    }
    None
}
