use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::BackoffPolicy;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each one after.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_api_key_env() -> Option<String> {
    Some("GEMINI_API_KEY".to_string())
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2000
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: None,
            model: None,
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl TransformConfig {
    /// An unresolvable key yields an empty string; the endpoint then rejects
    /// the call and the failure surfaces as a transport error.
    pub fn resolve_api_key(&self) -> String {
        crate::config::resolve_api_key(&self.api_key, &self.api_key_env).unwrap_or_default()
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}
