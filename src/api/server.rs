//! HTTP server implementation for the letter export API

use axum::{
    http::{
        header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use super::handlers::{self, SharedState};
use crate::core::Result;

/// Creates the main application router with all routes and middleware
pub fn create_app(state: SharedState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true);

    // Lets the editor's Google sign-in popup talk back to the page.
    let opener_policy = SetResponseHeaderLayer::overriding(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin-allow-popups"),
    );
    let embedder_policy = SetResponseHeaderLayer::overriding(
        HeaderName::from_static("cross-origin-embedder-policy"),
        HeaderValue::from_static("require-corp"),
    );

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/save-letter", post(handlers::save_letter))
        .route("/api/translate", post(handlers::translate_content))
        .route("/health", get(handlers::health_check))
        .route("/info", get(handlers::system_info))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(opener_policy)
                .layer(embedder_policy),
        )
        .with_state(state)
}

/// Start the HTTP server and run until `shutdown` resolves
pub async fn start_server<F>(addr: SocketAddr, state: SharedState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("Starting letter export API server on {}", addr);

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, Error, ExportStep, RemoteError};
    use crate::docs::{AccessToken, DocumentRequest, DocumentService};
    use crate::api::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Counts remote calls; optionally fails batch updates
    #[derive(Default)]
    struct StubService {
        calls: AtomicUsize,
        fail_batch: bool,
    }

    #[axum::async_trait]
    impl DocumentService for StubService {
        async fn create_document(&self, _token: &AccessToken, _title: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("doc-42".to_string())
        }

        async fn batch_update(
            &self,
            _token: &AccessToken,
            _document_id: &str,
            _requests: &[DocumentRequest],
        ) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_batch {
                return Err(Error::remote(
                    ExportStep::BatchUpdate,
                    RemoteError::Status {
                        status: 400,
                        body: "Invalid requests[1].updateTextStyle".to_string(),
                    },
                ));
            }
            Ok(())
        }

        async fn rename(
            &self,
            _token: &AccessToken,
            _document_id: &str,
            _name: &str,
            _mime_type: &str,
        ) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn delete(&self, _token: &AccessToken, _document_id: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn app(service: Arc<StubService>) -> Router {
        create_app(Arc::new(AppState::new(Config::default(), service)))
    }

    fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn letter() -> Value {
        json!({
            "content": {
                "textValue": "Hi Bob",
                "delta": { "ops": [
                    { "insert": "Hi " },
                    { "insert": "Bob", "attributes": { "bold": true } }
                ] }
            }
        })
    }

    #[tokio::test]
    async fn test_save_letter_success() {
        let service = Arc::new(StubService::default());
        let response = app(service.clone())
            .oneshot(post("/save-letter", Some("ya29.token"), letter()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["cross-origin-opener-policy"],
            "same-origin-allow-popups"
        );
        assert_eq!(body_json(response).await, json!({ "success": true, "fileId": "doc-42" }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_save_letter_requires_token() {
        let service = Arc::new(StubService::default());
        let response = app(service.clone())
            .oneshot(post("/save-letter", None, letter()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Missing authentication token");
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_save_letter_requires_content() {
        let service = Arc::new(StubService::default());
        let response = app(service.clone())
            .oneshot(post("/save-letter", Some("t"), json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid editor content");
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_save_letter_unsupported_format_is_generic_failure() {
        let service = Arc::new(StubService::default());
        let body = json!({ "content": { "textValue": "Hi" } });
        let response = app(service.clone())
            .oneshot(post("/save-letter", Some("t"), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "error": "Failed to save letter" })
        );
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_save_letter_remote_failure_hides_detail() {
        let service = Arc::new(StubService {
            fail_batch: true,
            ..StubService::default()
        });
        let response = app(service.clone())
            .oneshot(post("/save-letter", Some("t"), letter()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to save letter");
        assert!(!body.to_string().contains("updateTextStyle"));
        // create, batch update, cleanup delete
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_save_letter_accepts_string_content() {
        let service = Arc::new(StubService::default());
        let body = json!({ "content": letter()["content"].to_string() });
        let response = app(service)
            .oneshot(post("/save-letter", Some("t"), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_translate_preview() {
        let service = Arc::new(StubService::default());
        let response = app(service.clone())
            .oneshot(post("/api/translate", None, letter()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": true,
                "requests": [
                    { "insertText": { "location": { "index": 1 }, "text": "Hi " } },
                    { "insertText": { "location": { "index": 4 }, "text": "Bob" } },
                    { "updateTextStyle": {
                        "range": { "startIndex": 4, "endIndex": 7 },
                        "textStyle": { "bold": true },
                        "fields": "bold"
                    } }
                ]
            })
        );
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_translate_rejects_unsupported_format() {
        let body = json!({ "content": { "textValue": "Hi", "delta": {} } });
        let response = app(Arc::new(StubService::default()))
            .oneshot(post("/api/translate", None, body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Unsupported content format");
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/save-letter")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, "Bearer t")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = app(Arc::new(StubService::default())).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Malformed JSON");
    }

    #[tokio::test]
    async fn test_health_and_info() {
        let router = app(Arc::new(StubService::default()));

        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");

        let response = router
            .oneshot(Request::get("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let info = body_json(response).await;
        assert_eq!(info["formats"], json!(["bold", "italic", "underline"]));
        assert_eq!(info["document_name"], "My Styled Letter");
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin_only() {
        let router = app(Arc::new(StubService::default()));
        let preflight = |origin: &str| {
            Request::builder()
                .method("OPTIONS")
                .uri("/save-letter")
                .header("origin", origin)
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap()
        };

        let response = router
            .clone()
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:3000"
        );

        let response = router.oneshot(preflight("https://evil.example")).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }
}
