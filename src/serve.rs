use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::store::DocumentStore;

/// Shared state for the read API
#[derive(Clone)]
struct ApiState {
    store: Arc<dyn DocumentStore>,
}

/// Build the read API router: one GET endpoint returning the latest
/// stored headline document.
pub fn router(store: Arc<dyn DocumentStore>) -> Router {
    Router::new()
        .route("/api/news", get(latest_news))
        .layer(CorsLayer::permissive())
        .with_state(ApiState { store })
}

/// Serve the read API until the process is stopped
pub async fn run(store: Arc<dyn DocumentStore>, bind_addr: &str) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    ::log::info!("Read API listening on {}", bind_addr);
    axum::serve(listener, router(store)).await
}

/// GET /api/news - the latest headline document as JSON, a 404-shaped
/// payload if absent, a 500-shaped payload on backend failure
async fn latest_news(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.get("news", "latest_headlines").await {
        Ok(Some(doc)) => (StatusCode::OK, Json(doc)),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No headlines found"})),
        ),
        Err(e) => {
            ::log::error!("Read API failed to load headlines: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    async fn request_news(store: Arc<dyn DocumentStore>) -> (StatusCode, Value) {
        let response = router(store)
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/news")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_latest_news_round_trip() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                "news",
                "latest_headlines",
                json!({"headlines": [{"title": "Alpha", "link": "https://www.bbc.com/news/a"}]}),
            )
            .await
            .unwrap();

        let (status, body) = request_news(store).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["headlines"][0]["title"], "Alpha");
        assert!(body.get("last_updated").is_some());
    }

    #[tokio::test]
    async fn test_latest_news_absent_is_404() {
        let store = Arc::new(MemoryStore::new());
        let (status, body) = request_news(store).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "No headlines found");
    }
}
