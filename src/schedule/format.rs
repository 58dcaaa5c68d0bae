//! Display formatting for schedule entries: day labels, teacher rank
//! abbreviations, class-kind abbreviations, room display and the
//! modifier cleanup rules.
//!
//! The modifier patterns are tuned to annotations observed in upstream
//! data and are kept configurable, since the upstream's free-text
//! formatting drifts between semesters.

use chrono::{Datelike, NaiveDate};
use regex::Regex;

pub const WEEKDAYS_RU: [&str; 7] = [
    "понедельник",
    "вторник",
    "среда",
    "четверг",
    "пятница",
    "суббота",
    "воскресенье",
];

/// `04.03.2024, понедельник`
pub fn day_label(date: NaiveDate) -> String {
    let weekday = WEEKDAYS_RU[date.weekday().num_days_from_monday() as usize];
    format!(
        "{:02}.{:02}.{}, {}",
        date.day(),
        date.month(),
        date.year(),
        weekday
    )
}

/// Normalizes a teacher rank to its conventional abbreviation. A rank
/// that already contains a period is assumed abbreviated and passes
/// through unchanged.
pub fn format_rank(rank: &str) -> String {
    let rank = rank.trim();
    if rank.is_empty() || rank.contains('.') {
        return rank.to_string();
    }
    let lowered = rank.to_lowercase();
    let abbreviated = if lowered.contains("старш") && lowered.contains("преп") {
        "ст. преп."
    } else if lowered.contains("завед") && lowered.contains("каф") {
        "зав. каф."
    } else if lowered.contains("проф") {
        "проф."
    } else if lowered.contains("доцент") {
        "доц."
    } else if lowered.contains("ассист") {
        "асс."
    } else if lowered.contains("препод") {
        "преп."
    } else {
        return rank.to_string();
    };
    abbreviated.to_string()
}

/// `rank name`, whichever halves are known.
pub fn teacher_display(rank: &str, name: &str) -> String {
    let rank = format_rank(rank);
    let name = name.trim();
    if !rank.is_empty() && !name.is_empty() {
        format!("{} {}", rank, name)
    } else if name.is_empty() {
        rank
    } else {
        name.to_string()
    }
}

/// `room, building` when both are known.
pub fn room_display(room: &str, building: &str) -> String {
    let room = room.trim();
    let building = building.trim();
    if !room.is_empty() && !building.is_empty() {
        format!("{}, {}", room, building)
    } else if room.is_empty() {
        building.to_string()
    } else {
        room.to_string()
    }
}

/// Shortens a class kind to the conventional timetable abbreviation.
/// Unknown kinds pass through lowercased.
pub fn abbreviate_kind(kind: &str) -> String {
    let kind = kind.trim();
    if kind.is_empty() {
        return String::new();
    }
    let lowered = kind.to_lowercase();
    let abbreviated = if lowered.contains("лекц") {
        "лек."
    } else if lowered.contains("лаборатор") {
        "лаб."
    } else if lowered.contains("практ") {
        "практ."
    } else if lowered.contains("семинар") {
        "сем."
    } else if lowered.contains("экзамен") {
        "экз."
    } else if lowered.contains("зачет") || lowered.contains("зачёт") {
        "зач."
    } else if lowered.contains("консульт") {
        "конс."
    } else {
        return lowered;
    };
    abbreviated.to_string()
}

/// Strips noise from the free-text modifier attached to an entry.
#[derive(Clone)]
pub struct ModifierCleaner {
    patterns: Vec<Regex>,
}

impl Default for ModifierCleaner {
    fn default() -> Self {
        // Patterns observed so far: inline date ranges like
        // `8.09—6.10` and asterisked footnote markers.
        Self::new(&[
            r"\d{1,2}\.\d{1,2}\s*[—–-]\s*\d{1,2}\.\d{1,2}",
            r"\*.*$",
        ])
    }
}

impl ModifierCleaner {
    /// Invalid patterns are skipped rather than failing construction;
    /// the built-in defaults are known-good.
    pub fn new(patterns: &[&str]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }

    /// Returns the cleaned modifier, or an empty string when the whole
    /// modifier is noise. A modifier whose two comma-separated halves
    /// are identical after punctuation stripping carries no
    /// information (upstream sometimes emits `(8.09—6.10, 8.09—6.10)`).
    pub fn clean(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        if let Some((left, right)) = trimmed.split_once(',') {
            if strip_marks(left) == strip_marks(right) {
                return String::new();
            }
        }

        let mut text = trimmed.to_string();
        for pattern in &self.patterns {
            text = pattern.replace_all(&text, "").into_owned();
        }
        strip_marks(&text)
    }
}

fn strip_marks(text: &str) -> String {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ','))
        .to_string()
}
