//! HTTP request handlers for the letter export API

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::Json,
    Json as JsonExtractor,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::core::config::Config;
use crate::core::Error;
use crate::delta::{translate, EditorContent, TextFormat};
use crate::docs::{export_letter, AccessToken, DocumentRequest, DocumentService, ExportOptions};

/// Shared state handed to every handler
pub struct AppState {
    /// Loaded configuration
    pub config: Config,
    /// Remote document backend
    pub documents: Arc<dyn DocumentService>,
    /// Export settings derived from `config`
    pub export_options: ExportOptions,
    /// When the server started, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Build state from configuration and a document backend
    pub fn new(config: Config, documents: Arc<dyn DocumentService>) -> Self {
        let export_options = ExportOptions::from(&config.google);
        Self {
            config,
            documents,
            export_options,
            started_at: Instant::now(),
        }
    }
}

/// Shared handle to [`AppState`]
pub type SharedState = Arc<AppState>;

/// Body of `POST /save-letter` and `POST /api/translate`
#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    /// Editor content, as an object or a JSON string
    #[serde(default)]
    pub content: Option<Value>,
}

/// Successful save
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveLetterResponse {
    /// Always true
    pub success: bool,
    /// Id of the created Google Doc
    pub file_id: String,
}

/// Successful dry-run translation
#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    /// Always true
    pub success: bool,
    /// Requests a save would submit
    pub requests: Vec<DocumentRequest>,
}

/// Error response for failed requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Whether the operation was successful (always false)
    pub success: bool,
    /// Error message
    pub error: String,
    /// Optional details about what was invalid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorResponse {
    /// Create an error response
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    /// Create an error response with details
    pub fn with_details(error: impl Into<String>, details: Value) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: Some(details),
        }
    }
}

/// Rejection type shared by the handlers
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// System health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current system status
    pub status: String,
    /// Seconds since start
    pub uptime_secs: u64,
    /// Service version
    pub version: String,
}

/// Service information and capabilities
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    /// Service name
    pub name: String,
    /// Service version
    pub version: String,
    /// Character formats carried into exported documents
    pub formats: Vec<String>,
    /// Name given to exported documents
    pub document_name: String,
}

/// Custom JSON extractor that returns proper JSON error responses
pub struct JsonRequest<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match JsonExtractor::<T>::from_request(req, state).await {
            Ok(JsonExtractor(value)) => Ok(JsonRequest(value)),
            Err(rejection) => {
                let error_message = match rejection {
                    JsonRejection::JsonDataError(_) => "Invalid JSON data",
                    JsonRejection::JsonSyntaxError(_) => "Malformed JSON",
                    JsonRejection::MissingJsonContentType(_) => {
                        "Missing or invalid Content-Type header. Expected 'application/json'"
                    }
                    JsonRejection::BytesRejection(_) => "Failed to read request body",
                    _ => "Invalid JSON request",
                };

                tracing::warn!("JSON parsing error: {}", error_message);
                Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error_message))))
            }
        }
    }
}

/// Map an export failure to the response the editor understands.
///
/// Only the credential and missing-content cases are told apart; every
/// other failure is reported as one generic message.
fn save_failure(err: Error) -> ApiError {
    match err {
        Error::MissingCredential => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::new("Missing authentication token")),
        ),
        Error::InvalidInput(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid editor content")),
        ),
        other => {
            if other.is_pre_flight() {
                tracing::warn!(error = %other, "Rejected letter before export");
            } else {
                tracing::error!(error = %other, "Error saving letter");
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to save letter")),
            )
        }
    }
}

/// `GET /`
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": crate::NAME,
        "version": crate::VERSION,
        "endpoints": {
            "POST /save-letter": "Export editor content to a new Google Doc",
            "POST /api/translate": "Preview the Docs requests for editor content",
            "GET /health": "Health check",
            "GET /info": "Service information"
        }
    }))
}

/// `POST /save-letter`
pub async fn save_letter(
    State(state): State<SharedState>,
    headers: HeaderMap,
    JsonRequest(request): JsonRequest<ContentRequest>,
) -> Result<Json<SaveLetterResponse>, ApiError> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = AccessToken::from_authorization(bearer).map_err(save_failure)?;

    let content = request
        .content
        .ok_or_else(|| save_failure(Error::invalid_input("content is missing")))?;

    let file_id = export_letter(
        state.documents.as_ref(),
        Some(token),
        content,
        &state.export_options,
    )
    .await
    .map_err(save_failure)?;

    Ok(Json(SaveLetterResponse {
        success: true,
        file_id,
    }))
}

/// `POST /api/translate`
pub async fn translate_content(
    JsonRequest(request): JsonRequest<ContentRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let content = request.content.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid editor content")),
        )
    })?;

    let content = EditorContent::from_value(content).map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_details(
                "Unsupported content format",
                Value::String(err.to_string()),
            )),
        )
    })?;

    Ok(Json(TranslateResponse {
        success: true,
        requests: translate(&content.delta.ops),
    }))
}

/// `GET /health`
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        version: crate::VERSION.to_string(),
    })
}

/// `GET /info`
pub async fn system_info(State(state): State<SharedState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        formats: TextFormat::ALL
            .iter()
            .map(|format| format.as_str().to_string())
            .collect(),
        document_name: state.config.google.document_name.clone(),
    })
}
