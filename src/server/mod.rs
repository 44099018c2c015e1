//! HTTP surface and upload layer.
//!
//! Each upload route streams its file field into a temporary file, hands the
//! resulting [`UploadedAsset`] to the [`RequestPipeline`] and relays the
//! outcome as JSON.

use std::io;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::asset::UploadStore;
use crate::pipeline::{Endpoint, PipelineError, PipelineInput, RequestPipeline, UploadedAsset};

const PROMPT_FIELD: &str = "prompt";
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Shared state for every route.
#[derive(Debug, Clone)]
pub struct AppState {
    pipeline: RequestPipeline,
    uploads: UploadStore,
}

impl AppState {
    /// Bundles the pipeline with the store uploads are written to.
    pub fn new(pipeline: RequestPipeline, uploads: UploadStore) -> Self {
        Self { pipeline, uploads }
    }
}

/// Body of `POST /generate-text`.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateTextRequest {
    /// Prompt sent to the model
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Successful generation.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Generated text
    pub text: String,
}

/// Failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

/// Failures of the upload layer, before the pipeline runs.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request is not a readable multipart body.
    #[error("Invalid multipart request: {0}")]
    Rejected(#[from] MultipartRejection),

    /// A field could not be read.
    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),

    /// The upload could not be written to temporary storage.
    #[error("Failed to store upload: {0}")]
    Store(#[from] io::Error),
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Rejected(rejection) => rejection.status(),
            Self::Multipart(e) => e.status(),
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, self.to_string())
    }
}

/// Builds the gateway router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(Endpoint::Text.route(), post(generate_text))
        .route(Endpoint::Image.route(), post(generate_from_image))
        .route(Endpoint::Document.route(), post(generate_from_document))
        .route(Endpoint::Audio.route(), post(generate_from_audio))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn respond(outcome: Result<String, PipelineError>) -> Response {
    match outcome {
        Ok(text) => Json(GenerateResponse { text }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn generate_text(
    State(state): State<AppState>,
    body: Result<Json<GenerateTextRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };

    let input = PipelineInput {
        prompt: body.prompt,
        asset: None,
    };
    respond(state.pipeline.run(Endpoint::Text, input).await)
}

async fn generate_from_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    generate_from_upload(state, Endpoint::Image, multipart).await
}

async fn generate_from_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    generate_from_upload(state, Endpoint::Document, multipart).await
}

async fn generate_from_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    generate_from_upload(state, Endpoint::Audio, multipart).await
}

async fn generate_from_upload(
    state: AppState,
    endpoint: Endpoint,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let input = match receive_upload(&state.uploads, endpoint, multipart).await {
        Ok(input) => input,
        Err(e) => return e.into_response(),
    };
    respond(state.pipeline.run(endpoint, input).await)
}

/// Reads the prompt and file fields for `endpoint`.
///
/// Only the first file field with a non-empty file name is kept; other
/// fields are skipped. On error the partially written upload is disposed
/// when its handle drops.
async fn receive_upload(
    uploads: &UploadStore,
    endpoint: Endpoint,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<PipelineInput, UploadError> {
    let mut multipart = multipart?;
    let mut input = PipelineInput::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);

        if name.as_deref() == Some(PROMPT_FIELD) {
            input.prompt = Some(field.text().await?);
        } else if name.as_deref() == endpoint.field_name()
            && is_file(field.file_name())
            && input.asset.is_none()
        {
            let mime_type = declared_mime_type(field.content_type(), field.file_name());
            let (mut file, handle) = uploads.create()?;
            debug!(
                endpoint = %endpoint,
                location = %handle.location(),
                %mime_type,
                "storing upload"
            );
            input.asset = Some(UploadedAsset::new(handle, mime_type));

            while let Some(chunk) = field.chunk().await? {
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
        }
    }

    Ok(input)
}

/// A field is a file upload only when it carries a non-empty file name.
fn is_file(file_name: Option<&str>) -> bool {
    file_name.is_some_and(|name| !name.is_empty())
}

/// The client's declared content type, or a guess from the file name.
fn declared_mime_type(content_type: Option<&str>, file_name: Option<&str>) -> String {
    content_type
        .filter(|ct| !ct.is_empty())
        .map(str::to_owned)
        .or_else(|| {
            file_name
                .and_then(|name| mime_guess::from_path(name).first_raw())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string())
}
