use herzen_schedule_bot::config::Config;
use std::env;
use std::sync::Mutex;

// Mutex to ensure config tests run sequentially to avoid environment variable conflicts
static CONFIG_TEST_MUTEX: Mutex<()> = Mutex::new(());

fn clear_optional_vars() {
    for var in [
        "DATABASE_URL",
        "REDIS_URL",
        "SCHEDULE_API_URL",
        "SCHEDULE_SITE_URL",
        "HTTP_PORT",
        "REQUEST_TIMEOUT_SECS",
        "TIMEZONE",
        "TIMEZONE_OVERRIDES",
        "MAILING_TIME",
        "GROUPS_REFRESH_TIME",
        "GROUPS_FILE",
        "ADMIN_TELEGRAM_ID",
    ] {
        env::remove_var(var);
    }
}

#[test]
fn test_config_from_env_with_all_vars() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_optional_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token_123");
    env::set_var("DATABASE_URL", "sqlite:test.db");
    env::set_var("REDIS_URL", "redis://127.0.0.1:6379");
    env::set_var("SCHEDULE_API_URL", "https://api.example.test/v1");
    env::set_var("HTTP_PORT", "8080");
    env::set_var("MAILING_TIME", "08:15");
    env::set_var("ADMIN_TELEGRAM_ID", "424242");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "test_token_123");
    assert_eq!(config.database_url, "sqlite:test.db");
    assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
    assert_eq!(config.api_base_url, "https://api.example.test/v1");
    assert_eq!(config.http_port, 8080);
    assert_eq!(config.mailing_time, "08:15");
    assert_eq!(config.admin_id, Some(424242));

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    clear_optional_vars();
}

#[test]
fn test_config_from_env_with_defaults() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_optional_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "required_token");

    let config = Config::from_env().unwrap();

    assert_eq!(config.telegram_bot_token, "required_token");
    assert_eq!(config.database_url, "sqlite:./data/user_data.db");
    assert_eq!(config.redis_url, None);
    assert_eq!(config.api_base_url, "https://api.herzen.spb.ru/schedule/v1");
    assert_eq!(config.site_base_url, "https://guide.herzen.spb.ru");
    assert_eq!(config.http_port, 3000);
    assert_eq!(config.request_timeout_secs, 10);
    assert_eq!(config.timezone, "Europe/Moscow");
    assert!(config.timezone_overrides.is_empty());
    assert_eq!(config.mailing_time, "07:00");
    assert_eq!(config.groups_refresh_time, "05:30");
    assert_eq!(config.groups_file, "./data/groups.json");
    assert_eq!(config.admin_id, None);

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
}

#[test]
fn test_config_missing_required_token() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_optional_vars();

    env::remove_var("TELEGRAM_BOT_TOKEN");

    let result = Config::from_env();
    assert!(result.is_err());

    let error_msg = result.unwrap_err().to_string();
    assert!(error_msg.contains("TELEGRAM_BOT_TOKEN must be set"));
}

#[test]
fn test_config_invalid_port() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_optional_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("HTTP_PORT", "invalid_port");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid HTTP_PORT"));

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    clear_optional_vars();
}

#[test]
fn test_config_pads_unpadded_clock_values() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_optional_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("MAILING_TIME", "7:30");
    env::set_var("GROUPS_REFRESH_TIME", "5:05");

    let config = Config::from_env().unwrap();

    // Must match the mailing tick's padded clock string exactly.
    assert_eq!(config.mailing_time, "07:30");
    assert_eq!(config.mailing_time, format!("{:02}:{:02}", 7, 30));
    assert_eq!(config.groups_refresh_time, "05:05");

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    clear_optional_vars();
}

#[test]
fn test_config_invalid_mailing_time() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_optional_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("MAILING_TIME", "25:99");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("MAILING_TIME"));

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    clear_optional_vars();
}

#[test]
fn test_config_timezone_overrides_parsed() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_optional_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var(
        "TIMEZONE_OVERRIDES",
        "42=Asia/Yekaterinburg, 7=Europe/Kaliningrad",
    );

    let config = Config::from_env().unwrap();

    assert_eq!(config.timezone_overrides.len(), 2);
    assert_eq!(
        config.timezone_overrides.get(&42).map(String::as_str),
        Some("Asia/Yekaterinburg")
    );
    assert_eq!(
        config.timezone_overrides.get(&7).map(String::as_str),
        Some("Europe/Kaliningrad")
    );

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    clear_optional_vars();
}

#[test]
fn test_config_malformed_timezone_override_rejected() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_optional_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("TIMEZONE_OVERRIDES", "not-a-pair");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("TIMEZONE_OVERRIDES"));

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    clear_optional_vars();
}

#[test]
fn test_config_blank_redis_url_treated_as_unset() {
    let _guard = CONFIG_TEST_MUTEX.lock().unwrap();
    clear_optional_vars();

    env::set_var("TELEGRAM_BOT_TOKEN", "test_token");
    env::set_var("REDIS_URL", "   ");

    let config = Config::from_env().unwrap();
    assert_eq!(config.redis_url, None);

    // Clean up
    env::remove_var("TELEGRAM_BOT_TOKEN");
    clear_optional_vars();
}
