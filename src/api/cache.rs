//! Cache management endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::services::CacheDump;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub total_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: String,
    pub status: &'static str,
}

/// GET /api/cache/stats
pub async fn stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache.stats().await;

    Json(CacheStatsResponse {
        total_entries: stats.total_entries,
        hits: stats.hits,
        misses: stats.misses,
        hit_rate: stats.hit_rate(),
        status: "online",
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCacheResponse {
    pub message: &'static str,
    pub entries_cleared: usize,
}

/// POST /api/cache/clear
pub async fn clear(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let entries_cleared = state.cache.clear().await;

    Json(ClearCacheResponse {
        message: "Cache cleared successfully",
        entries_cleared,
    })
}

/// GET /api/cache/dump
///
/// Returns cached answers and embeddings verbatim, so it is only served when
/// explicitly enabled for trusted operators; otherwise it does not exist.
pub async fn dump(State(state): State<AppState>) -> Result<Json<CacheDump>, ApiError> {
    if !state.expose_dump {
        return Err(ApiError::not_found("Not found"));
    }

    Ok(Json(state.cache.dump().await))
}
