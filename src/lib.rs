#![deny(missing_docs)]

//! An HTTP gateway in front of the Google Gemini AI API.
//!
//! Callers send a text prompt, or upload an image, document or audio file
//! with an optional prompt. Uploads are stored as temporary assets, encoded
//! as base64 content parts, sent to the generation backend and removed again
//! once the backend has answered.

pub mod asset;
pub mod backend;
pub mod client;
pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod server;

pub use asset::{TemporaryAssetHandle, UploadStore};
pub use backend::{BackendFailure, GenerationBackend};
pub use client::GenerativeModel;
pub use config::GatewayConfig;
pub use content::{ContentPart, ContentPartBuilder};
pub use pipeline::{Endpoint, PipelineError, PipelineInput, RequestPipeline, UploadedAsset};
