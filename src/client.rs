//! Client implementation for the Gemini AI API.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    backend::{BackendFailure, GenerationBackend, GenerationResult},
    content::ContentPart,
    error::GoogleGenerativeAIError,
    models::{ModelParams, Part, Request, RequestType, Response},
};

/// Default API endpoint for Google's Generative AI service
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default API version
const DEFAULT_API_VERSION: &str = "v1beta";

/// A client for interacting with the Gemini AI API.
#[derive(Debug, Clone)]
pub struct GenerativeModel {
    api_key: String,
    params: ModelParams,
    base_url: String,
    client: reqwest::Client,
}

impl GenerativeModel {
    /// Creates a new GenerativeModel with the specified API key and model.
    ///
    /// # Arguments
    ///
    /// * `api_key` - The API key for authentication
    /// * `params` - The model parameters
    pub fn new(api_key: impl Into<String>, params: impl Into<ModelParams>) -> Self {
        Self {
            api_key: api_key.into(),
            params: params.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Creates a new GenerativeModel from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `GOOGLE_API_KEY` - The API key for authentication
    /// * `GOOGLE_BASE_URL` - Optional override of the API endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the required environment variable is not set.
    pub fn from_env(model: impl Into<String>) -> Result<Self, GoogleGenerativeAIError> {
        let api_key = std::env::var("GOOGLE_API_KEY")?;
        let model = Self::new(api_key, ModelParams::builder().model(model).build());
        Ok(match std::env::var("GOOGLE_BASE_URL") {
            Ok(base_url) => model.with_base_url(base_url),
            Err(_) => model,
        })
    }

    /// Points the client at a different API endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Applies a total timeout to every request made by this client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, GoogleGenerativeAIError> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// The model identifier requests are sent to.
    pub fn model(&self) -> &str {
        &self.params.model
    }

    async fn make_request(
        &self,
        url: &str,
        mut request: Request,
    ) -> Result<reqwest::Response, GoogleGenerativeAIError> {
        request.generation_config = request
            .generation_config
            .or_else(|| self.params.generation_config.clone());

        let response = self.client.post(url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GoogleGenerativeAIError::new(format!(
                "Request failed with status {}: {}",
                status, error_body
            )));
        }

        Ok(response)
    }

    fn build_url(&self, request_type: RequestType) -> String {
        format!(
            "{}/{}/models/{}:{}?key={}",
            self.base_url, DEFAULT_API_VERSION, self.params.model, request_type, self.api_key
        )
    }

    /// Generates content using the Gemini AI API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or if the response cannot be parsed.
    pub async fn generate_response(
        &self,
        request: impl Into<Request>,
    ) -> Result<Response, GoogleGenerativeAIError> {
        let url = self.build_url(RequestType::GenerateContent);
        Ok(self.make_request(&url, request.into()).await?.json().await?)
    }

    /// Sends a single text prompt.
    pub async fn send_message(
        &self,
        prompt: impl Into<String>,
    ) -> Result<Response, GoogleGenerativeAIError> {
        self.generate_response(Request::with_prompt(prompt)).await
    }
}

#[async_trait]
impl GenerationBackend for GenerativeModel {
    async fn generate(&self, parts: Vec<ContentPart>) -> GenerationResult {
        debug!(model = %self.params.model, parts = parts.len(), "calling generateContent");

        let request = Request::from_parts(parts.into_iter().map(Part::from).collect());
        let response = self.generate_response(request).await?;

        if !response.has_text() {
            return Err(BackendFailure::new(match response.block_reason() {
                Some(reason) => format!("Prompt was blocked: {reason}"),
                None => "No valid response from the model".to_string(),
            }));
        }

        Ok(response.text())
    }
}
