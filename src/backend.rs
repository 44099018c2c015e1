//! The generation backend seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::content::ContentPart;
use crate::error::GoogleGenerativeAIError;

/// The backend rejected or could not complete a request.
///
/// Displays as the backend's message, unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendFailure {
    /// Message reported by the backend
    pub message: String,
}

impl BackendFailure {
    /// Creates a failure carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<GoogleGenerativeAIError> for BackendFailure {
    fn from(err: GoogleGenerativeAIError) -> Self {
        Self::new(err.message())
    }
}

/// Outcome of one backend call.
pub type GenerationResult = Result<String, BackendFailure>;

/// A service that turns an ordered list of content parts into text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generates text for `parts`, in the order given.
    async fn generate(&self, parts: Vec<ContentPart>) -> GenerationResult;
}
