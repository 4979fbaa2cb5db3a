use async_trait::async_trait;
use thiserror::Error;

use crate::media::SourceImage;

pub const NO_IMAGE_MESSAGE: &str = "Please upload an image.";
pub const TRANSPORT_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";
pub const CONTENT_FAILURE_MESSAGE: &str = "Image transformation failed. Please try a different prompt.";

// ── Error Types ────────────────────────────────────────

/// Which side of the exchange failed. Only logs tell these apart; the user
/// sees one banner string per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Input,
    Transport,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("No image selected")]
    NoImage,
    #[error("API error: {0}")]
    Api(String),
    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
    #[error("Invalid response body: {0}")]
    Decode(String),
    #[error("Response contained no inline image data")]
    NoImageInResponse,
}

impl TransformError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TransformError::NoImage => FailureKind::Input,
            TransformError::Api(_)
            | TransformError::RetriesExhausted { .. }
            | TransformError::Decode(_) => FailureKind::Transport,
            TransformError::NoImageInResponse => FailureKind::Content,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            FailureKind::Input => NO_IMAGE_MESSAGE,
            FailureKind::Transport => TRANSPORT_FAILURE_MESSAGE,
            FailureKind::Content => CONTENT_FAILURE_MESSAGE,
        }
    }
}

// ── Result ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedImage {
    /// MIME type of the uploaded original; the result is labelled with it.
    pub mime_type: String,
    /// Base64 payload exactly as the API returned it.
    pub data: String,
}

impl TransformedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

// ── Transformer Trait ──────────────────────────────────

#[async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> String;

    /// Send the drawing with the composed prompt and return the first inline
    /// image of the response.
    async fn transform(
        &self,
        prompt: &str,
        image: &SourceImage,
    ) -> Result<TransformedImage, TransformError>;
}
