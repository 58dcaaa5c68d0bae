//! Timezone resolution for schedule display.
//!
//! The institution lives in one timezone, but individual faculties can
//! be hosted elsewhere, so entries are localized per owning faculty
//! with a default fallback.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Moscow;

#[derive(Clone)]
pub struct TimezoneResolver {
    default: Tz,
    faculty_overrides: HashMap<i64, Tz>,
}

impl TimezoneResolver {
    pub fn new(default_name: &str, overrides: &HashMap<i64, String>) -> Self {
        let default = parse_zone(default_name).unwrap_or_else(|| {
            if !default_name.is_empty() {
                warn!(
                    "timezone {} is not available, falling back to {}",
                    default_name, DEFAULT_TIMEZONE
                );
            }
            DEFAULT_TIMEZONE
        });

        let faculty_overrides = overrides
            .iter()
            .filter_map(|(faculty_id, name)| match parse_zone(name) {
                Some(tz) => Some((*faculty_id, tz)),
                None => {
                    warn!(
                        "ignoring timezone override for faculty {}: unknown zone {}",
                        faculty_id, name
                    );
                    None
                }
            })
            .collect();

        Self {
            default,
            faculty_overrides,
        }
    }

    pub fn default_zone(&self) -> Tz {
        self.default
    }

    /// Timezone of the faculty owning an entry, or the default when
    /// the faculty is unknown or has no override.
    pub fn for_faculty(&self, faculty_id: Option<i64>) -> Tz {
        faculty_id
            .and_then(|id| self.faculty_overrides.get(&id).copied())
            .unwrap_or(self.default)
    }

    /// Today's date in the default zone; mailing runs key off this.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.default).date_naive()
    }
}

fn parse_zone(name: &str) -> Option<Tz> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Tz::from_str(name).ok()
}
