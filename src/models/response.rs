//! Response models for the Gemini AI API.

use serde::Deserialize;

use super::{Content, Part};

/// A response from the Gemini AI API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// The generated candidates from the model.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Feedback on the prompt, present when the prompt was blocked.
    pub prompt_feedback: Option<PromptFeedback>,
    /// Metadata about token usage.
    pub usage_metadata: Option<UsageMetadata>,
    /// The version of the model used.
    pub model_version: Option<String>,
}

impl Response {
    /// Gets the text of the first candidate, its text parts concatenated as is.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        Part::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Returns true when the first candidate carries a text part.
    pub fn has_text(&self) -> bool {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .is_some_and(|content| {
                content
                    .parts
                    .iter()
                    .any(|part| matches!(part, Part::Text { .. }))
            })
    }

    /// The reason the prompt was blocked, if any.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }
}

/// A candidate response from the model.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of the candidate response.
    pub content: Option<Content>,
    /// The reason why the generation finished.
    pub finish_reason: Option<FinishReason>,
    /// Average log probabilities for the generation.
    pub avg_logprobs: Option<f64>,
}

/// Reason why the generation finished.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Natural stop point of the model or provided stop sequence.
    Stop,
    /// The maximum number of tokens as specified in the request was reached.
    MaxTokens,
    /// The response candidate content was flagged for safety reasons.
    Safety,
    /// The response candidate content was flagged for recitation reasons.
    Recitation,
    /// Any reason this client does not model.
    #[serde(other)]
    Other,
}

/// Feedback about the prompt itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked.
    pub block_reason: Option<String>,
}

/// Metadata about token usage in the request and response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_token_count: i32,
    /// Number of tokens in the generated candidates.
    pub candidates_token_count: Option<i32>,
    /// Total number of tokens used.
    #[serde(default)]
    pub total_token_count: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_comes_from_first_candidate_only() {
        let response: Response = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "Hi " }, { "text": "there" }] },
                  "finishReason": "STOP" },
                { "content": { "role": "model", "parts": [{ "text": "friend" }] },
                  "finishReason": "SOMETHING_NEW" }
            ],
            "usageMetadata": { "promptTokenCount": 3, "totalTokenCount": 7 },
            "modelVersion": "gemini-1.5-flash"
        }))
        .unwrap();

        assert_eq!(response.text(), "Hi there");
        assert!(response.has_text());
        assert_eq!(response.candidates[1].finish_reason, Some(FinishReason::Other));
    }

    #[test]
    fn split_parts_are_concatenated_without_separator() {
        let response: Response = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "Hello, wor" }, { "text": "ld!" }]
                }
            }]
        }))
        .unwrap();

        assert_eq!(response.text(), "Hello, world!");
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let response: Response = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();

        assert!(!response.has_text());
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }
}
