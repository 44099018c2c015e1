//! Mock API tests for the Gemini backend adapter.
//!
//! These tests use wiremock to stand in for the `generateContent` endpoint.

use gemini_gateway::{
    models::{GenerationConfig, ModelParams},
    ContentPart, GenerationBackend, GenerativeModel,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn model_for(server: &MockServer) -> GenerativeModel {
    GenerativeModel::new("test-api-key", ModelParams::default()).with_base_url(server.uri())
}

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
            "avgLogprobs": -0.12
        }],
        "usageMetadata": {
            "promptTokenCount": 4,
            "candidatesTokenCount": 2,
            "totalTokenCount": 6
        },
        "modelVersion": "gemini-1.5-flash"
    })
}

#[tokio::test]
async fn parts_are_sent_in_order_as_one_user_turn() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "test-api-key"))
        .and(body_json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": "Describe this image" },
                    { "inline_data": { "mime_type": "image/png", "data": "iVBORw==" } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("A red square")))
        .expect(1)
        .mount(&server)
        .await;

    let text = model_for(&server)
        .generate(vec![
            ContentPart::Text {
                value: "Describe this image".into(),
            },
            ContentPart::Media {
                mime_type: "image/png".into(),
                encoded_data: "iVBORw==".into(),
            },
        ])
        .await
        .unwrap();

    assert_eq!(text, "A red square");
}

#[tokio::test]
async fn generation_config_from_params_is_attached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }],
            "generation_config": { "temperature": 0.5, "maxOutputTokens": 64 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let params = ModelParams::builder()
        .generation_config(
            GenerationConfig::builder()
                .temperature(0.5)
                .max_output_tokens(64)
                .build(),
        )
        .build();
    let model = GenerativeModel::new("test-api-key", params).with_base_url(server.uri());

    let response = model.send_message("Hello").await.unwrap();
    assert_eq!(response.text(), "Hi there");
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let failure = model_for(&server)
        .generate(vec![ContentPart::Text {
            value: "Hello".into(),
        }])
        .await
        .unwrap_err();

    assert_eq!(
        failure.message,
        "Request failed with status 429 Too Many Requests: quota exceeded"
    );
}

#[tokio::test]
async fn blocked_prompt_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let failure = model_for(&server)
        .generate(vec![ContentPart::Text {
            value: "something unsafe".into(),
        }])
        .await
        .unwrap_err();

    assert_eq!(failure.message, "Prompt was blocked: SAFETY");
}

#[tokio::test]
async fn malformed_body_is_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = model_for(&server)
        .generate(vec![ContentPart::Text {
            value: "Hello".into(),
        }])
        .await;

    assert!(result.is_err());
}
