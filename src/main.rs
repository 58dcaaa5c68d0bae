//! # Herzen Schedule Bot Main Entry Point
//!
//! Composition root: initializes logging, loads configuration, wires
//! the database, cache store, upstream client and resolver together,
//! starts the mailing and group-refresh services and runs the Telegram
//! bot alongside the health endpoint.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herzen_schedule_bot::bot::handlers::{BotDeps, BotHandler};
use herzen_schedule_bot::config::Config;
use herzen_schedule_bot::database::connection::DatabaseManager;
use herzen_schedule_bot::schedule::cache::{CacheStore, ScheduleCache};
use herzen_schedule_bot::schedule::format::ModifierCleaner;
use herzen_schedule_bot::schedule::groups::GroupDirectory;
use herzen_schedule_bot::schedule::reference::ReferenceDirectory;
use herzen_schedule_bot::schedule::resolver::ScheduleResolver;
use herzen_schedule_bot::schedule::upstream::ScheduleApi;
use herzen_schedule_bot::services::health::HealthService;
use herzen_schedule_bot::services::mailing::MailingService;
use herzen_schedule_bot::services::refresh::GroupRefreshService;
use herzen_schedule_bot::services::timezone::TimezoneResolver;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herzen_schedule_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Herzen Schedule Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, API: {}, HTTP Port: {}",
        config.database_url, config.api_base_url, config.http_port
    );

    // Initialize database
    let db = DatabaseManager::new(&config.database_url).await?;
    db.run_migrations().await?;
    info!("Database initialized successfully");

    // Cache store is advisory: startup proceeds either way
    let cache_store = CacheStore::connect(config.redis_url.as_deref()).await;

    // Schedule resolution pipeline
    let api = ScheduleApi::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let timezones = TimezoneResolver::new(&config.timezone, &config.timezone_overrides);
    let references = ReferenceDirectory::new(api.clone(), cache_store.clone());
    let schedule_cache = ScheduleCache::new(cache_store.clone());
    let groups = GroupDirectory::new(
        api.clone(),
        cache_store.clone(),
        PathBuf::from(&config.groups_file),
    );
    let resolver = ScheduleResolver::new(
        api,
        schedule_cache.clone(),
        references,
        timezones.clone(),
        ModifierCleaner::default(),
        &config.site_base_url,
    );

    // Initialize bot
    let bot = Bot::new(&config.telegram_bot_token);
    let deps = BotDeps {
        db: db.clone(),
        resolver: resolver.clone(),
        groups: groups.clone(),
        schedule_cache,
        timezones: timezones.clone(),
        admin_id: config.admin_id,
        default_mailing_time: config.mailing_time.clone(),
    };
    let handler = BotHandler::new(deps);
    info!("Telegram bot initialized successfully");

    // Background services
    let mut refresh_service = GroupRefreshService::new(groups, &config.groups_refresh_time)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create group refresh service: {}", e))?;
    if let Err(e) = refresh_service.start().await {
        tracing::error!("Failed to start group refresh service: {}", e);
    }

    let mut mailing_service = MailingService::new(bot.clone(), db.clone(), resolver, timezones)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create mailing service: {}", e))?;
    if let Err(e) = mailing_service.start().await {
        tracing::error!("Failed to start mailing service: {}", e);
    }

    // Health endpoint
    let health_service = HealthService::new(db, cache_store);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;
    info!("Health check server starting on port {}", config.http_port);

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    // Stop background services on shutdown
    if let Err(e) = mailing_service.stop().await {
        tracing::warn!("Error stopping mailing service: {}", e);
    }
    if let Err(e) = refresh_service.stop().await {
        tracing::warn!("Error stopping group refresh service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
