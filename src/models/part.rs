//! Part model used in both requests and responses.

use serde::{Deserialize, Serialize};

use crate::content::ContentPart;

/// A single piece of a Gemini content object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// A text part containing a string value
    Text {
        /// The text content of the part
        text: String,
    },
    /// A part containing inline data
    InlineData {
        /// The inline data content of the part
        inline_data: InlineData,
    },
}

/// Base64 payload tagged with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    /// The MIME type of the inline data
    #[serde(alias = "mimeType")]
    pub mime_type: String,
    /// The base64 encoded content
    pub data: String,
}

impl Part {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

impl From<ContentPart> for Part {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text { value } => Self::Text { text: value },
            ContentPart::Media {
                mime_type,
                encoded_data,
            } => Self::InlineData {
                inline_data: InlineData {
                    mime_type,
                    data: encoded_data,
                },
            },
        }
    }
}
