//! Backend-neutral content parts.

use base64::{engine::general_purpose::STANDARD as base64_engine, Engine};
use std::io;
use thiserror::Error;

use crate::asset::TemporaryAssetHandle;

/// One unit of a multimodal generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// Plain text
    Text {
        /// The text content
        value: String,
    },
    /// Base64 encoded media tagged with its declared MIME type
    Media {
        /// Declared MIME type of the source asset
        mime_type: String,
        /// Standard base64 encoding of the asset bytes
        encoded_data: String,
    },
}

/// The stored asset could not be read.
#[derive(Debug, Error)]
#[error("Uploaded asset {location} is unavailable: {source}")]
pub struct AssetUnavailable {
    /// Location of the asset that failed to read
    pub location: String,
    /// Underlying read error
    #[source]
    pub source: io::Error,
}

/// Turns stored assets into [`ContentPart`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentPartBuilder;

impl ContentPartBuilder {
    /// Creates a text part.
    pub fn text(value: impl Into<String>) -> ContentPart {
        ContentPart::Text {
            value: value.into(),
        }
    }

    /// Reads the whole asset and encodes it as a media part.
    ///
    /// The MIME type is carried through as declared.
    ///
    /// # Errors
    ///
    /// Returns [`AssetUnavailable`] if the asset is disposed or cannot be read.
    pub fn build(
        asset: &TemporaryAssetHandle,
        mime_type: impl Into<String>,
    ) -> Result<ContentPart, AssetUnavailable> {
        let bytes = asset.read_bytes().map_err(|source| AssetUnavailable {
            location: asset.location(),
            source,
        })?;

        Ok(ContentPart::Media {
            mime_type: mime_type.into(),
            encoded_data: base64_engine.encode(bytes),
        })
    }
}
