use std::collections::HashMap;
use std::env;

use anyhow::{anyhow, Result};

use crate::utils::datetime::normalize_clock;

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    /// Optional; the bot runs without caching when unset.
    pub redis_url: Option<String>,
    pub api_base_url: String,
    /// Base of the human-facing schedule site used for deep links.
    pub site_base_url: String,
    pub http_port: u16,
    pub request_timeout_secs: u64,
    pub timezone: String,
    /// `faculty_id=Zone` pairs, comma-separated.
    pub timezone_overrides: HashMap<i64, String>,
    /// `HH:MM` local time of the daily mailing run.
    pub mailing_time: String,
    /// `HH:MM` local time of the daily group-tree refresh.
    pub groups_refresh_time: String,
    /// Fallback location of the serialized group tree when no cache
    /// store is configured.
    pub groups_file: String,
    /// Telegram id allowed to run maintenance commands.
    pub admin_id: Option<i64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;
        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = non_empty_or("DATABASE_URL", "sqlite:./data/user_data.db");
        let redis_url = env::var("REDIS_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let api_base_url = non_empty_or("SCHEDULE_API_URL", "https://api.herzen.spb.ru/schedule/v1");
        let site_base_url = non_empty_or("SCHEDULE_SITE_URL", "https://guide.herzen.spb.ru");

        let http_port = non_empty_or("HTTP_PORT", "3000")
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;
        let request_timeout_secs = non_empty_or("REQUEST_TIMEOUT_SECS", "10")
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid REQUEST_TIMEOUT_SECS"))?;

        let timezone = non_empty_or("TIMEZONE", "Europe/Moscow");
        let timezone_overrides = parse_overrides(&non_empty_or("TIMEZONE_OVERRIDES", ""))?;

        let mailing_time = parse_clock("MAILING_TIME", "07:00")?;
        let groups_refresh_time = parse_clock("GROUPS_REFRESH_TIME", "05:30")?;
        let groups_file = non_empty_or("GROUPS_FILE", "./data/groups.json");
        let admin_id = match env::var("ADMIN_TELEGRAM_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| anyhow!("Invalid ADMIN_TELEGRAM_ID"))?,
            ),
            _ => None,
        };

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            redis_url,
            api_base_url,
            site_base_url,
            http_port,
            request_timeout_secs,
            timezone,
            timezone_overrides,
            mailing_time,
            groups_refresh_time,
            groups_file,
            admin_id,
        })
    }
}

fn non_empty_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

/// Clock values are stored zero-padded so they compare equal to the
/// mailing tick's `HH:MM` string.
fn parse_clock(key: &str, default: &str) -> Result<String> {
    let value = non_empty_or(key, default);
    normalize_clock(&value).ok_or_else(|| anyhow!("Invalid {}: expected HH:MM, got {}", key, value))
}

/// Parses `42=Asia/Yekaterinburg,7=Europe/Kaliningrad` style override
/// lists. Malformed pairs are an error so a typo is caught at startup.
fn parse_overrides(raw: &str) -> Result<HashMap<i64, String>> {
    let mut overrides = HashMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (faculty, zone) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid TIMEZONE_OVERRIDES entry: {}", pair))?;
        let faculty_id = faculty
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid faculty id in TIMEZONE_OVERRIDES: {}", pair))?;
        overrides.insert(faculty_id, zone.trim().to_string());
    }
    Ok(overrides)
}
