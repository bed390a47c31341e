//! Route modules for the Data Gremlin server

pub mod blocks;
pub mod health;
pub mod pages;
pub mod render;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::settings::{RenderSettings, DEFAULT_API_ROUTE};
use crate::state::AppState;

const PAGES_PREFIX: &str = "/api/v1/pages";

/// Build the application router
///
/// The block route is mounted from `settings` at startup; when the API is
/// disabled it is not mounted at all.
pub fn build_router(state: AppState, settings: &RenderSettings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .merge(health::router())
        .merge(render::router())
        .nest(PAGES_PREFIX, pages::router());

    if settings.api_enabled {
        let route = block_route(&settings.api_route);
        tracing::info!("Block API mounted at {}", route);
        app = app.merge(blocks::router(route));
    } else {
        tracing::info!("Block API endpoint disabled");
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// The configured block route, or the default when it cannot be mounted
fn block_route(route: &str) -> &str {
    if is_mountable(route) {
        route
    } else {
        tracing::warn!(
            "Invalid apiRoute {:?}, falling back to {}",
            route,
            DEFAULT_API_ROUTE
        );
        DEFAULT_API_ROUTE
    }
}

/// A route is mountable when it is absolute, has exactly one `:id` segment,
/// has no other captures and stays clear of the page API.
fn is_mountable(route: &str) -> bool {
    if !route.starts_with('/') || route.starts_with(PAGES_PREFIX) {
        return false;
    }
    let segments: Vec<&str> = route[1..].split('/').collect();
    let id_segments = segments.iter().filter(|s| **s == ":id").count();
    let captures = segments
        .iter()
        .filter(|s| s.starts_with(':') || s.contains('*'))
        .count();
    id_segments == 1 && captures == 1 && segments.iter().all(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::{spawn_cache_invalidator, EventBus};
    use crate::store::{self, DocumentStore, MemoryDocumentStore, StoreError, StoredDocument, UpsertOutcome};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const PAGE: &str = "# Stock\n\n```json\n---\nid: x\n---\n{\"a\":1}\n```\n\n```csv\n---\nid: parts\n---\nitem,qty\nbolt,10\nnut\n```\n\n```text\n---\nid: memo\n---\nhello\n```\n";

    /// Store whose every call fails like a dropped database
    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn fetch_candidates(&self) -> store::Result<Vec<StoredDocument>> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn upsert(&self, _: &str, _: &str, _: &str) -> store::Result<UpsertOutcome> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn delete(&self, _: &str) -> store::Result<bool> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn app_with(settings: RenderSettings) -> (Router, AppState) {
        let store: Arc<dyn DocumentStore> =
            Arc::new(MemoryDocumentStore::with_markdown([("stock.md", PAGE)]));
        app_with_store(store, settings)
    }

    fn app_with_store(store: Arc<dyn DocumentStore>, settings: RenderSettings) -> (Router, AppState) {
        let state = AppState::new(
            &Config::default(),
            store,
            Arc::new(settings.clone()),
            EventBus::default(),
        );
        (build_router(state.clone(), &settings), state)
    }

    fn app() -> (Router, AppState) {
        app_with(RenderSettings::default())
    }

    async fn send(app: Router, method: Method, uri: &str, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn get(app: Router, uri: &str) -> Response {
        send(app, Method::GET, uri, "").await
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn content_type(response: &Response) -> &str {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn test_is_mountable() {
        assert!(is_mountable("/gremlin/:id"));
        assert!(is_mountable("/data/blocks/:id"));
        assert!(!is_mountable("gremlin/:id"));
        assert!(!is_mountable("/gremlin"));
        assert!(!is_mountable("/gremlin/:id/:other"));
        assert!(!is_mountable("/gremlin/:id/*rest"));
        assert!(!is_mountable("/gremlin//:id"));
        assert!(!is_mountable("/api/v1/pages/:id"));
    }

    #[tokio::test]
    async fn test_json_mode() {
        let (app, _) = app();
        let response = get(app, "/gremlin/x").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(content_type(&response).starts_with("application/json"));
        assert_eq!(body_text(response).await, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_raw_mode() {
        let (app, _) = app();
        let response = get(app, "/gremlin/x?raw").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(content_type(&response), "application/json");
        assert_eq!(body_text(response).await, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_raw_flag_any_value() {
        let (app, _) = app();
        let response = get(app, "/gremlin/parts?raw=0").await;

        assert_eq!(content_type(&response), "text/csv");
        assert_eq!(body_text(response).await, "item,qty\nbolt,10\nnut");
    }

    #[tokio::test]
    async fn test_csv_as_json_records() {
        let (app, _) = app();
        let response = get(app, "/gremlin/parts").await;

        let value: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            value,
            json!([{"item": "bolt", "qty": "10"}, {"item": "nut", "qty": ""}])
        );
    }

    #[tokio::test]
    async fn test_text_block_plain() {
        let (app, _) = app();
        let response = get(app, "/gremlin/memo").await;

        assert_eq!(content_type(&response), "text/plain");
        assert_eq!(body_text(response).await, "hello");
    }

    #[tokio::test]
    async fn test_unknown_id_not_found() {
        let (app, _) = app();
        let response = get(app, "/gremlin/missing").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let value: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value, json!({"error": "Block not found", "id": "missing"}));
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let (app, state) = app_with_store(Arc::new(FailingStore), RenderSettings::default());
        let response = get(app.clone(), "/gremlin/x").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(content_type(&response).starts_with("application/json"));
        assert_eq!(body_text(response).await, r#"{"error":"Internal server error"}"#);
        assert!(state.cache().is_empty());

        let response = send(app, Method::PUT, "/api/v1/pages/a.md", "# A").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, r#"{"error":"Internal server error"}"#);
    }

    #[tokio::test]
    async fn test_custom_route() {
        let (app, _) = app_with(RenderSettings {
            api_route: "/data/:id".to_string(),
            ..RenderSettings::default()
        });
        assert_eq!(get(app.clone(), "/data/x").await.status(), StatusCode::OK);
        assert_eq!(get(app, "/gremlin/x").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_disabled() {
        let (app, _) = app_with(RenderSettings {
            api_enabled: false,
            ..RenderSettings::default()
        });
        let response = get(app.clone(), "/gremlin/x").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "");
        assert_eq!(get(app, "/health").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cached_response_matches_fresh() {
        let (app, state) = app();
        let fresh = body_text(get(app.clone(), "/gremlin/parts").await).await;
        assert_eq!(state.cache().len(), 1);

        let cached = body_text(get(app, "/gremlin/parts").await).await;
        assert_eq!(fresh, cached);
    }

    #[tokio::test]
    async fn test_page_write_invalidates_cache() {
        let (app, state) = app();
        let invalidator = spawn_cache_invalidator(state.cache().clone(), state.events().subscribe());

        get(app.clone(), "/gremlin/x").await;
        assert_eq!(state.cache().len(), 1);

        let page = "```json\n---\nid: fresh\n---\n[1]\n```";
        let response = send(app.clone(), Method::PUT, "/api/v1/pages/new.md", page).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        for _ in 0..50 {
            if state.cache().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(state.cache().is_empty());

        let response = get(app, "/gremlin/fresh").await;
        assert_eq!(body_text(response).await, "[1]");
        invalidator.abort();
    }

    #[tokio::test]
    async fn test_page_update_and_delete() {
        let (app, _) = app();

        let response = send(app.clone(), Method::PUT, "/api/v1/pages/stock.md", "# Empty").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(get(app.clone(), "/gremlin/x").await.status(), StatusCode::NOT_FOUND);

        let response = send(app.clone(), Method::DELETE, "/api/v1/pages/stock.md", "").await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(app, Method::DELETE, "/api/v1/pages/stock.md", "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_render_endpoint() {
        let (app, _) = app();
        let html = "<pre><code class=\"language-csv\">---\nid: parts\n---\nitem,qty\nbolt,10\n</code></pre>";
        let response = send(app, Method::POST, "/render", html).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(r#"data-json-api-id="parts""#));
        assert!(body.contains("<td>bolt</td>"));
        assert!(body.contains(r#"href="/gremlin/parts?raw""#));
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let response = get(app, "/health").await;

        let value: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["service"], "data-gremlin");
    }
}
