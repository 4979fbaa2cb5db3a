use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::config::{TransformConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use super::interface::{ImageTransformer, TransformError, TransformedImage};
use super::retry::{run_with_backoff, AttemptOutcome, BackoffPolicy, RetryError};
use crate::media::SourceImage;

// ── Wire Types ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentRequest {
    /// Prompt text first, then the drawing; ask for image+text output.
    pub fn for_image(prompt: &str, image: &SourceImage) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.to_base64(),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        }
    }
}

impl GenerateContentResponse {
    /// Base64 data of the first non-empty inline image in the first candidate.
    pub fn first_inline_image(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| {
                p.inline_data
                    .as_ref()
                    .map(|d| d.data.as_str())
                    .filter(|d| !d.is_empty())
            })
    }
}

// ── Transformer ────────────────────────────────────────

pub struct GeminiImageTransformer {
    id: String,
    api_key: String,
    base_url: String,
    model: String,
    policy: BackoffPolicy,
    client: Client,
}

impl GeminiImageTransformer {
    pub fn new(id: String, api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            id,
            api_key,
            base_url: base_url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            policy: BackoffPolicy::default(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(
            "gemini".to_string(),
            config.resolve_api_key(),
            config.base_url.clone(),
            config.model.clone(),
        )
        .with_policy(config.backoff_policy())
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn attempt(&self, url: &str, body: &GenerateContentRequest) -> AttemptOutcome<reqwest::Response> {
        let res = match self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
        {
            Ok(res) => res,
            // The URL carries the key; keep it out of error text.
            Err(e) => {
                return AttemptOutcome::Retryable(format!("Network error: {}", e.without_url()))
            }
        };

        let status = res.status();
        if status.is_success() {
            AttemptOutcome::Success(res)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            AttemptOutcome::Retryable(status.to_string())
        } else {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_u16().to_string());
            AttemptOutcome::Fatal(status_text)
        }
    }
}

#[async_trait]
impl ImageTransformer for GeminiImageTransformer {
    fn id(&self) -> String {
        self.id.clone()
    }

    async fn transform(
        &self,
        prompt: &str,
        image: &SourceImage,
    ) -> Result<TransformedImage, TransformError> {
        let url = self.endpoint();
        let body = GenerateContentRequest::for_image(prompt, image);

        tracing::info!(
            "[Transform] Sending {} ({} bytes) to model '{}'",
            image.mime_type(),
            image.bytes().len(),
            self.model
        );

        let res = run_with_backoff(self.policy, |_| self.attempt(&url, &body))
            .await
            .map_err(|e| match e {
                RetryError::Fatal { reason, .. } => TransformError::Api(reason),
                RetryError::Exhausted { attempts, last } => {
                    TransformError::RetriesExhausted { attempts, last }
                }
            })?;

        let parsed: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| TransformError::Decode(e.without_url().to_string()))?;

        let data = parsed
            .first_inline_image()
            .ok_or(TransformError::NoImageInResponse)?;

        Ok(TransformedImage {
            mime_type: image.mime_type().to_string(),
            data: data.to_string(),
        })
    }
}
