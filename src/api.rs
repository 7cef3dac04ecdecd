//! HTTP surface for the OCR summary backend.
//!
//! - `POST /upload` – Multipart upload with a `document` file field. Runs the file through
//!   document analysis and returns `{ "text": "<newline-joined lines>" }`.
//! - `POST /summarize` – JSON `{ "text": "..." }`. Returns `{ "summary": "..." }`.
//! - `GET /health` – Liveness probe.
//! - `GET /metrics` – OCR and summarization counters.
//! - `GET /commands` – Machine-readable endpoint catalog.
//!
//! Failures never leak vendor detail to the client: each endpoint answers with one fixed
//! plain-text message and the cause is logged.

use crate::ingestion::{IngestionError, read_document};
use crate::processing::DocumentApi;
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Body returned when `/upload` has no `document` field.
pub const NO_FILE_MESSAGE: &str = "No file uploaded";
/// Body returned when anything on the OCR path fails.
pub const OCR_FAILED_MESSAGE: &str = "Textract failed";
/// Body returned when anything on the summarization path fails.
pub const SUMMARIZATION_FAILED_MESSAGE: &str = "Summarization failed";

/// Build the HTTP router exposing the OCR and summarization endpoints.
///
/// Uploads larger than `max_upload_bytes` are rejected while the multipart body is read.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/upload", post(upload_document::<S>))
        .route("/summarize", post(summarize_text::<S>))
        .route("/health", get(health))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Success response for `POST /upload`.
#[derive(Serialize)]
struct UploadResponse {
    /// `LINE` texts joined with newlines.
    text: String,
}

/// Run an uploaded document through OCR.
async fn upload_document<S>(
    State(service): State<Arc<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError>
where
    S: DocumentApi,
{
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection.body_text(), "Upload is not multipart");
        ApiError::MissingInput
    })?;

    let document = read_document(&mut multipart).await?;

    let extracted = service
        .extract_text(document)
        .await
        .map_err(|error| ApiError::Ocr(error.into()))?;

    Ok(Json(UploadResponse {
        text: extracted.text,
    }))
}

/// Request body for `POST /summarize`.
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    /// Text to summarize. Need not be non-empty or come from OCR.
    pub text: String,
}

/// Success response for `POST /summarize`.
#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

/// `/summarize` body that failed to decode into [`SummarizeRequest`].
#[derive(Debug, Error)]
#[error("invalid summarize request: {0}")]
pub struct ValidationError(String);

impl From<JsonRejection> for ValidationError {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection.body_text())
    }
}

/// Summarize caller-supplied text.
///
/// Bodies without a string `text` field are rejected before the provider is contacted.
async fn summarize_text<S>(
    State(service): State<Arc<S>>,
    payload: Result<Json<SummarizeRequest>, JsonRejection>,
) -> Result<Json<SummarizeResponse>, ApiError>
where
    S: DocumentApi,
{
    let Json(request) = payload
        .map_err(ValidationError::from)
        .map_err(|error| ApiError::Summarization(error.into()))?;

    let summary = service
        .summarize(&request.text)
        .await
        .map_err(|error| ApiError::Summarization(error.into()))?;

    Ok(Json(SummarizeResponse { summary }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Return the OCR and summarization counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: DocumentApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/upload",
                description: "Extract text from a document image sent as multipart field `document`. Response returns { \"text\": string }.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Clean up and summarize OCR text. Response returns { \"summary\": string }.",
                request_example: Some(json!({ "text": "Extracted OCR text" })),
            },
            CommandDescriptor {
                name: "health",
                method: "GET",
                path: "/health",
                description: "Liveness probe.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return OCR and summarization counters.",
                request_example: None,
            },
            CommandDescriptor {
                name: "commands",
                method: "GET",
                path: "/commands",
                description: "Return this catalog of supported endpoints.",
                request_example: None,
            },
        ],
    })
}

enum ApiError {
    MissingInput,
    Ocr(anyhow::Error),
    Summarization(anyhow::Error),
}

/// Only an absent `document` field is a client error; a body that cannot be read or staged
/// (including one over the upload limit) fails the OCR path.
impl From<IngestionError> for ApiError {
    fn from(error: IngestionError) -> Self {
        match error {
            IngestionError::MissingInput => {
                tracing::debug!(%error, "Rejecting upload");
                Self::MissingInput
            }
            IngestionError::Multipart(_) | IngestionError::Io(_) => Self::Ocr(error.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingInput => (StatusCode::BAD_REQUEST, NO_FILE_MESSAGE).into_response(),
            Self::Ocr(error) => {
                tracing::error!(error = %format!("{error:#}"), "Textract error");
                (StatusCode::INTERNAL_SERVER_ERROR, OCR_FAILED_MESSAGE).into_response()
            }
            Self::Summarization(error) => {
                tracing::error!(error = %format!("{error:#}"), "Summarization error");
                (StatusCode::INTERNAL_SERVER_ERROR, SUMMARIZATION_FAILED_MESSAGE).into_response()
            }
        }
    }
}
