//! Operator endpoints. Reseeding the store through the CLI leaves cached
//! scores stale until their TTL runs out; the flush endpoint drops them
//! immediately.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub status: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/api/admin/cache/flush", post(flush_cache)).with_state(state)
}

async fn flush_cache(State(state): State<AppState>) -> Json<FlushResponse> {
    state.cache.invalidate_all().await;
    tracing::info!(event_name = "admin.cache.flushed", "score cache flushed");
    Json(FlushResponse { status: "flushed" })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use tastemap_db::InMemoryRestaurantStore;

    use crate::cache::ScoreCache;
    use crate::state::AppState;

    use super::router;

    #[tokio::test]
    async fn flush_drops_cached_scores() {
        let state = AppState {
            store: Arc::new(InMemoryRestaurantStore::with_records(Vec::new())),
            cache: Arc::new(ScoreCache::new(Duration::from_secs(600))),
        };

        state
            .cache
            .get_or_compute("best-locations|city=chennai", || async { Ok(json!(1)) })
            .await
            .expect("warm the cache");

        let response = router(state.clone())
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/admin/cache/flush")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let recomputed = state
            .cache
            .get_or_compute("best-locations|city=chennai", || async { Ok(json!(2)) })
            .await
            .expect("recompute after flush");
        assert_eq!(recomputed, json!(2));
    }
}
