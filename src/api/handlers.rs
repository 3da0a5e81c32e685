//! API Handlers
//!
//! HTTP request handlers for the operator endpoints. Every handler goes
//! through [`CacheService`], so reads and writes see both tiers and are
//! counted in the statistics.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::debug;

use crate::cache::{CacheService, StatsSnapshot};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, KeysResponse, PatternQuery,
    SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// The service synchronizes internally, so the state is a plain `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: Arc<CacheService>,
}

impl AppState {
    /// Creates a new AppState owning the given service.
    pub fn new(cache: CacheService) -> Self {
        Self::from_shared(Arc::new(cache))
    }

    /// Wraps a service that is also held elsewhere, e.g. by the cleanup task.
    pub fn from_shared(cache: Arc<CacheService>) -> Self {
        Self { cache }
    }

    /// Builds both tiers from configuration.
    ///
    /// An unreachable Redis leaves the remote tier disabled; it never fails startup.
    pub async fn from_config(config: &Config) -> Self {
        Self::new(CacheService::from_config(config).await)
    }
}

/// Handler for PUT /set
///
/// Stores a JSON value under a key with an optional TTL in seconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let ttl = req.ttl.map(Duration::from_secs);
    state.cache.set(&req.key, req.value, ttl).await;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(ApiError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// 404 when neither tier held the key.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key).await {
        return Err(ApiError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /keys?pattern=
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Json<KeysResponse> {
    let keys = state.cache.keys(query.pattern.as_deref());
    Json(KeysResponse::new(keys))
}

/// Handler for DELETE /clear?pattern=
///
/// Without a pattern both tiers are emptied.
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Json<ClearResponse> {
    debug!("Clearing cache, pattern={:?}", query.pattern);
    state.cache.clear(query.pattern.as_deref()).await;
    Json(ClearResponse::new(query.pattern))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.cache.stats())
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.remote().is_enabled()))
}
