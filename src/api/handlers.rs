//! API Handlers
//!
//! HTTP request handlers over the shared cache instance.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::CacheManager;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, GetResponse, HasResponse, HealthResponse, KeysResponse, RemovalResponse,
    SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the single cache instance created by the composition root. The cache
/// locks internally, so handlers share it through a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheManager<Value>>,
}

impl AppState {
    pub fn new(cache: CacheManager<Value>) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheManager::new(config.cache_config()))
    }
}

/// Handler for PUT /set
///
/// Malformed or incomplete bodies are reported as `InvalidRequest` so every
/// error leaves the API as the same JSON shape.
pub async fn set_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SetRequest>, JsonRejection>,
) -> Result<Json<SetResponse>> {
    let Json(req) =
        payload.map_err(|rejection| CacheError::InvalidRequest(rejection.body_text()))?;
    req.validate()?;

    let ttl = state.cache.effective_ttl(req.ttl);
    state.cache.set(req.key.clone(), req.value, Some(ttl))?;
    debug!(key = %req.key, ttl, "entry stored");

    Ok(Json(SetResponse::new(req.key, ttl)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /has/:key
pub async fn has_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<HasResponse> {
    let exists = state.cache.has(&key);
    Json(HasResponse { key, exists })
}

/// Handler for DELETE /del/:key
///
/// Invalidation hook for callers that just wrote to the entity behind `key`.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.delete(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<RemovalResponse> {
    Json(RemovalResponse::cleared(state.cache.clear()))
}

/// Handler for GET /keys
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse::new(state.cache.keys()))
}

/// Handler for POST /sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<RemovalResponse> {
    Json(RemovalResponse::swept(state.cache.clean_expired()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = &state.cache;
    Json(StatsResponse::new(
        &cache.stats(),
        cache.default_ttl(),
        cache.max_entries(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
