use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::connection::DatabaseManager;
use crate::schedule::cache::CacheStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: String,
    /// Whether the advisory cache store is connected; the bot is
    /// healthy either way, this is an operational signal.
    pub cache_available: bool,
    pub uptime_seconds: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub cache: CacheStore,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(db: DatabaseManager, cache: CacheStore) -> Self {
        let state = AppState {
            db,
            cache,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/live", get(liveness_check))
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let database = match sqlx::query("SELECT 1").execute(&state.db.pool).await {
        Ok(_) => "ok".to_string(),
        Err(err) => format!("error: {}", err),
    };
    let healthy = database == "ok";

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        cache_available: state.cache.available(),
        uptime_seconds: (Utc::now() - state.start_time).num_seconds().max(0) as u64,
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn liveness_check() -> StatusCode {
    StatusCode::OK
}
