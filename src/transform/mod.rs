pub mod config;
pub mod gemini;
pub mod interface;
pub mod retry;

#[cfg(test)]
mod tests;

pub use config::TransformConfig;
pub use gemini::GeminiImageTransformer;
pub use interface::{FailureKind, ImageTransformer, TransformError, TransformedImage};
pub use retry::{AttemptOutcome, BackoffPolicy, RetryError};
