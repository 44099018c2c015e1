//! The upload-to-generation request pipeline.
//!
//! One [`RequestPipeline::run`] call validates its input, builds the content
//! parts, awaits the backend once and then disposes the uploaded asset. The
//! asset is disposed exactly once on every exit path, always after the
//! backend call has resolved.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::asset::TemporaryAssetHandle;
use crate::backend::{BackendFailure, GenerationBackend};
use crate::content::{AssetUnavailable, ContentPart, ContentPartBuilder};

/// The four generation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Prompt-only generation
    Text,
    /// Prompt plus an uploaded image
    Image,
    /// Prompt plus an uploaded document
    Document,
    /// Prompt plus an uploaded audio clip
    Audio,
}

impl Endpoint {
    /// HTTP route serving this endpoint.
    pub fn route(self) -> &'static str {
        match self {
            Self::Text => "/generate-text",
            Self::Image => "/generate-from-image",
            Self::Document => "/generate-from-document",
            Self::Audio => "/generate-from-audio",
        }
    }

    /// Name of the multipart field carrying the upload, if any.
    pub fn field_name(self) -> Option<&'static str> {
        match self {
            Self::Text => None,
            Self::Image => Some("image"),
            Self::Document => Some("document"),
            Self::Audio => Some("audio"),
        }
    }

    /// Prompt used when the caller sends none.
    pub fn default_prompt(self) -> Option<&'static str> {
        match self {
            Self::Text => None,
            Self::Image => Some("Describe this image"),
            Self::Document => Some("Summarize this document"),
            Self::Audio => Some("Transcribe this audio"),
        }
    }

    /// Whether a request to this endpoint must carry an upload.
    pub fn requires_asset(self) -> bool {
        self.field_name().is_some()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name().unwrap_or("text"))
    }
}

/// An upload handed to the pipeline by the upload layer.
#[derive(Debug)]
pub struct UploadedAsset {
    /// Ownership of the stored bytes
    pub handle: TemporaryAssetHandle,
    /// MIME type declared for the upload
    pub mime_type: String,
}

impl UploadedAsset {
    /// Pairs a handle with its declared MIME type.
    pub fn new(handle: TemporaryAssetHandle, mime_type: impl Into<String>) -> Self {
        Self {
            handle,
            mime_type: mime_type.into(),
        }
    }
}

/// Parsed input for one pipeline invocation.
#[derive(Debug, Default)]
pub struct PipelineInput {
    /// Caller-supplied prompt
    pub prompt: Option<String>,
    /// Uploaded asset, if one was attached
    pub asset: Option<UploadedAsset>,
}

impl PipelineInput {
    /// Input for the text endpoint.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            asset: None,
        }
    }
}

/// Why an invocation did not produce text.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required upload was not supplied.
    #[error("No {endpoint} file uploaded.")]
    MissingInput {
        /// Endpoint that was called
        endpoint: Endpoint,
    },

    /// The stored upload could not be read.
    #[error(transparent)]
    BuildFailed(#[from] AssetUnavailable),

    /// The generation backend failed.
    #[error(transparent)]
    Backend(#[from] BackendFailure),
}

impl PipelineError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingInput { .. } => StatusCode::BAD_REQUEST,
            Self::BuildFailed(_) | Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Idle,
    Validating,
    BuildingParts,
    AwaitingBackend,
    Finalizing,
    Done,
}

struct StateTracker {
    endpoint: Endpoint,
    state: PipelineState,
}

impl StateTracker {
    fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            state: PipelineState::Idle,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug!(endpoint = %self.endpoint, from = ?self.state, to = ?next, "pipeline state");
        self.state = next;
    }
}

/// Drives one inbound call from parsed input to generated text.
#[derive(Clone)]
pub struct RequestPipeline {
    backend: Arc<dyn GenerationBackend>,
}

impl fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPipeline").finish_non_exhaustive()
    }
}

impl RequestPipeline {
    /// Creates a pipeline that sends every request to `backend`.
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Runs one invocation for `endpoint`.
    ///
    /// Any asset in `input` is disposed before this returns, whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingInput`] when a required upload is
    /// absent, [`PipelineError::BuildFailed`] when the upload cannot be read,
    /// and [`PipelineError::Backend`] when the backend fails.
    pub async fn run(
        &self,
        endpoint: Endpoint,
        input: PipelineInput,
    ) -> Result<String, PipelineError> {
        let PipelineInput { prompt, asset } = input;
        let mut tracker = StateTracker::new(endpoint);

        let outcome = self
            .execute(endpoint, prompt, asset.as_ref(), &mut tracker)
            .await;

        tracker.advance(PipelineState::Finalizing);
        if let Some(mut asset) = asset {
            asset.handle.dispose();
        }
        tracker.advance(PipelineState::Done);

        match &outcome {
            Ok(text) => info!(endpoint = %endpoint, chars = text.len(), "generation succeeded"),
            Err(e) => warn!(endpoint = %endpoint, error = %e, "generation failed"),
        }
        outcome
    }

    async fn execute(
        &self,
        endpoint: Endpoint,
        prompt: Option<String>,
        asset: Option<&UploadedAsset>,
        tracker: &mut StateTracker,
    ) -> Result<String, PipelineError> {
        tracker.advance(PipelineState::Validating);
        if endpoint.requires_asset() && asset.is_none() {
            return Err(PipelineError::MissingInput { endpoint });
        }

        tracker.advance(PipelineState::BuildingParts);
        let parts = build_parts(endpoint, prompt, asset)?;

        tracker.advance(PipelineState::AwaitingBackend);
        Ok(self.backend.generate(parts).await?)
    }
}

/// Picks the prompt for `endpoint`: the caller's when non-empty, else the
/// endpoint default. The text endpoint passes its prompt through as is.
pub fn resolve_prompt(endpoint: Endpoint, prompt: Option<String>) -> String {
    match endpoint.default_prompt() {
        None => prompt.unwrap_or_default(),
        Some(default) => prompt
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| default.to_string()),
    }
}

/// Builds the ordered parts for one invocation: prompt first, then media.
///
/// Uploads sent to the text endpoint are not attached.
pub fn build_parts(
    endpoint: Endpoint,
    prompt: Option<String>,
    asset: Option<&UploadedAsset>,
) -> Result<Vec<ContentPart>, AssetUnavailable> {
    let mut parts = vec![ContentPartBuilder::text(resolve_prompt(endpoint, prompt))];

    if let Some(asset) = asset.filter(|_| endpoint.requires_asset()) {
        parts.push(ContentPartBuilder::build(&asset.handle, asset.mime_type.as_str())?);
    }

    Ok(parts)
}
