use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::cache;
use super::health;
use super::state::AppState;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Cache management API
        .nest("/api/cache", cache_router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn cache_router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(cache::stats))
        .route("/clear", post(cache::clear))
        .route("/dump", get(cache::dump))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use super::*;
    use crate::domain::cache::AnswerPayload;
    use crate::infrastructure::services::{AnswerCache, AnswerCacheConfig};
    use crate::infrastructure::store::MemoryStore;

    fn test_state(expose_dump: bool) -> AppState {
        let cache = Arc::new(AnswerCache::new(
            Arc::new(MemoryStore::new()),
            AnswerCacheConfig::default(),
        ));

        AppState::new(cache, expose_dump)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(test_state(false));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_endpoint_reports_store() {
        let app = create_router(test_state(false));

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["checks"][0]["name"], "cache_store");
        assert_eq!(json["checks"][0]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let state = test_state(false);
        let payload = AnswerPayload::new("cached answer");
        state.cache.store("a question", &[1.0, 0.0], payload).await;
        let _ = state.cache.lookup("a question", &[1.0, 0.0]).await.unwrap();

        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["totalEntries"], 1);
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 0);
        assert_eq!(json["hitRate"], "100.00%");
        assert_eq!(json["status"], "online");
    }

    #[tokio::test]
    async fn test_clear_endpoint() {
        let state = test_state(false);
        state
            .cache
            .store("q", &[1.0], AnswerPayload::new("a"))
            .await;

        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/cache/clear")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["message"], "Cache cleared successfully");
        assert_eq!(json["entriesCleared"], 1);
    }

    #[tokio::test]
    async fn test_dump_hidden_by_default() {
        let app = create_router(test_state(false));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache/dump")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dump_when_enabled() {
        let state = test_state(true);
        state
            .cache
            .store("q", &[1.0], AnswerPayload::new("a"))
            .await;

        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache/dump")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["count"], 1);
        assert_eq!(json["keys"].as_array().unwrap().len(), 1);
    }
}
