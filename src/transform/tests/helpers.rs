use crate::media::{fixtures::make_png_bytes, SourceImage};
use crate::transform::{BackoffPolicy, GeminiImageTransformer};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_MODEL: &str = "test-model";
pub const TEST_KEY: &str = "test-key";
pub const ENDPOINT_PATH: &str = "/models/test-model:generateContent";

/// Transformer pointed at the mock server, with millisecond backoff.
pub fn transformer_for(server: &MockServer) -> GeminiImageTransformer {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    GeminiImageTransformer::new(
        "test".to_string(),
        TEST_KEY.to_string(),
        Some(server.uri()),
        Some(TEST_MODEL.to_string()),
    )
    .with_policy(BackoffPolicy::new(3, Duration::from_millis(5)))
    .with_client(client)
}

pub fn drawing() -> SourceImage {
    SourceImage::from_bytes(make_png_bytes(256), "drawing.png").unwrap()
}

pub fn image_body(data: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [
                { "text": "Here is your picture" },
                { "inlineData": { "mimeType": "image/png", "data": data } }
            ]}
        }]
    })
}

pub fn text_only_body() -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "parts": [ { "text": "I cannot draw that." } ] }
        }]
    })
}

/// Mount a responder on the generate endpoint, optionally limited to `times` hits.
pub async fn mount(server: &MockServer, response: ResponseTemplate, times: Option<u64>) {
    let mut mock = Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(query_param("key", TEST_KEY))
        .respond_with(response);
    if let Some(n) = times {
        mock = mock.up_to_n_times(n);
    }
    mock.mount(server).await;
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}
