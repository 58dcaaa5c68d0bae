use chrono::{Datelike, Duration, NaiveDate};

/// Monday..Sunday of the week containing `date`.
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

/// Monday..Sunday of the week after the one containing `date`.
pub fn next_week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (monday, _) = week_range(date);
    let next_monday = monday + Duration::days(7);
    (next_monday, next_monday + Duration::days(6))
}

/// Parses a `HH:MM` wall-clock time, accepting unpadded hours and
/// minutes.
pub fn parse_clock(value: &str) -> Option<(u8, u8)> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: u8 = hours.parse().ok().filter(|h| *h < 24)?;
    let minutes: u8 = minutes.parse().ok().filter(|m| *m < 60)?;
    Some((hours, minutes))
}

/// Canonical zero-padded `HH:MM`. Stored subscription times must
/// compare equal to the mailing tick's clock string, which is always
/// padded.
pub fn normalize_clock(value: &str) -> Option<String> {
    parse_clock(value).map(|(hours, minutes)| format!("{:02}:{:02}", hours, minutes))
}

/// Six-field cron expression firing daily at a `HH:MM` wall-clock time.
pub fn daily_cron(clock: &str) -> Option<String> {
    let (hours, minutes) = parse_clock(clock)?;
    Some(format!("0 {} {} * * *", minutes, hours))
}
