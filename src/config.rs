//! Shared config utilities for loading JSON config files,
//! resolving API keys, and applying the values injected at startup.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::transform::config::TransformConfig;

/// Environment variable carrying the identity service credential blob (JSON).
pub const FIREBASE_CONFIG_ENV: &str = "ARTIFY_FIREBASE_CONFIG";
pub const APP_ID_ENV: &str = "ARTIFY_APP_ID";
pub const INITIAL_AUTH_TOKEN_ENV: &str = "ARTIFY_INITIAL_AUTH_TOKEN";

const DEFAULT_APP_ID: &str = "default-app-id";

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(config) => {
                tracing::info!("[{}] Loaded config from {}", label, path.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "[{}] Failed to parse config {}: {}, using defaults",
                    label,
                    path.display(),
                    e
                );
                T::default()
            }
        },
        Err(_) => {
            tracing::info!(
                "[{}] No config file at {}, using defaults",
                label,
                path.display()
            );
            T::default()
        }
    }
}

/// Resolve an API key: check the direct `api_key` field first,
/// then fall back to reading the environment variable named in `api_key_env`.
pub fn resolve_api_key(api_key: &Option<String>, api_key_env: &Option<String>) -> Option<String> {
    if let Some(ref key) = api_key {
        if !key.is_empty() {
            return Some(key.clone());
        }
    }
    if let Some(ref env_var) = api_key_env {
        if let Ok(key) = std::env::var(env_var) {
            if !key.is_empty() {
                return Some(key);
            }
        }
    }
    None
}

// ── Identity Service Credentials ───────────────────────

/// Credential blob for the hosted identity service, in the shape the
/// service console hands out (camelCase keys).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub app_id: Option<String>,
    /// Overrides the Identity Toolkit base URL (emulators, tests).
    pub identity_base_url: Option<String>,
}

// ── App Config ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default)]
    pub initial_auth_token: Option<String>,
    #[serde(default)]
    pub transform: TransformConfig,
    /// Where downloads land. `None` = current directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            firebase: FirebaseConfig::default(),
            app_id: default_app_id(),
            initial_auth_token: None,
            transform: TransformConfig::default(),
            output_dir: None,
        }
    }
}

impl AppConfig {
    /// Apply startup-injected values on top of the file config.
    pub fn apply_env(&mut self) {
        self.apply_injected(
            std::env::var(FIREBASE_CONFIG_ENV).ok(),
            std::env::var(APP_ID_ENV).ok(),
            std::env::var(INITIAL_AUTH_TOKEN_ENV).ok(),
        );
    }

    /// Empty values are treated as absent. An unparsable credential blob is
    /// logged and ignored.
    pub fn apply_injected(
        &mut self,
        firebase_blob: Option<String>,
        app_id: Option<String>,
        initial_auth_token: Option<String>,
    ) {
        if let Some(blob) = firebase_blob.filter(|b| !b.trim().is_empty()) {
            match serde_json::from_str::<FirebaseConfig>(&blob) {
                Ok(firebase) => self.firebase = firebase,
                Err(e) => tracing::warn!("[Config] Ignoring invalid {}: {}", FIREBASE_CONFIG_ENV, e),
            }
        }
        if let Some(app_id) = app_id.filter(|a| !a.is_empty()) {
            self.app_id = app_id;
        }
        if let Some(token) = initial_auth_token.filter(|t| !t.is_empty()) {
            self.initial_auth_token = Some(token);
        }
    }
}

/// Default location: `<data dir>/artify-kids/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs_next::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("artify-kids")
        .join("config.json")
}

/// Load config from a JSON file. Falls back to defaults if file is missing or invalid.
pub fn load_config(path: &Path) -> AppConfig {
    load_json_config(path, "Config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("nope.json"));
        assert_eq!(config.app_id, "default-app-id");
        assert!(config.initial_auth_token.is_none());
        assert!(config.firebase.api_key.is_empty());
        assert_eq!(config.transform.max_attempts, 3);
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let config = load_config(&path);
        assert_eq!(config.app_id, "default-app-id");
    }

    #[test]
    fn written_config_loads_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        let mut config = AppConfig::default();
        config.app_id = "artify".to_string();
        config.firebase.api_key = "fb-key".to_string();
        config.transform.base_delay_ms = 10;

        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = load_config(&path);
        assert_eq!(loaded.app_id, "artify");
        assert_eq!(loaded.firebase.api_key, "fb-key");
        assert_eq!(loaded.transform.base_delay_ms, 10);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{ "firebase": { "apiKey": "abc", "projectId": "kids" } }"#)
            .unwrap();
        let config = load_config(&path);
        assert_eq!(config.firebase.api_key, "abc");
        assert_eq!(config.firebase.project_id.as_deref(), Some("kids"));
        assert_eq!(config.app_id, "default-app-id");
    }

    #[test]
    fn injected_values_override_file() {
        let mut config = AppConfig::default();
        config.apply_injected(
            Some(r#"{"apiKey":"injected","authDomain":"kids.example"}"#.to_string()),
            Some("app-42".to_string()),
            Some("tok".to_string()),
        );
        assert_eq!(config.firebase.api_key, "injected");
        assert_eq!(config.firebase.auth_domain.as_deref(), Some("kids.example"));
        assert_eq!(config.app_id, "app-42");
        assert_eq!(config.initial_auth_token.as_deref(), Some("tok"));
    }

    #[test]
    fn invalid_or_empty_injection_keeps_existing() {
        let mut config = AppConfig::default();
        config.firebase.api_key = "from-file".to_string();
        config.apply_injected(Some("[1,2".to_string()), Some(String::new()), Some(String::new()));
        assert_eq!(config.firebase.api_key, "from-file");
        assert_eq!(config.app_id, "default-app-id");
        assert!(config.initial_auth_token.is_none());
    }

    #[test]
    fn literal_key_wins_over_env() {
        let key = resolve_api_key(&Some("direct".to_string()), &Some("ARTIFY_TEST_UNSET_VAR".to_string()));
        assert_eq!(key.as_deref(), Some("direct"));
        assert!(resolve_api_key(&Some(String::new()), &None).is_none());
    }
}
