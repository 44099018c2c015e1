//! Request models for the Gemini AI API.

use serde::{Deserialize, Serialize};

use super::{GenerationConfig, Part};

/// A request to the Gemini AI API.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The contents of the request, including the prompt text.
    pub contents: Vec<Content>,
    /// Optional generation settings for the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// The producer of a content object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Content written by the caller
    User,
    /// Content written by the model
    Model,
}

/// A content object containing parts of the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// Who produced this content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// The parts that make up the content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Request {
    /// Creates a new request with the given text prompt.
    ///
    /// # Arguments
    ///
    /// * `text` - The text prompt to generate content from
    pub fn with_prompt(text: impl Into<String>) -> Self {
        Self::from_parts(vec![Part::text(text)])
    }

    /// Creates a single-turn user request from an ordered list of parts.
    ///
    /// The parts are sent in the order given.
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![Content {
                role: Some(Role::User),
                parts,
            }],
            generation_config: None,
        }
    }
}
