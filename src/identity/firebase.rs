//! Identity Toolkit REST client: anonymous and custom-token sign-in.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::interface::{AuthStateCallback, AuthUser, IdentityError, IdentityProvider};
use super::state::{AuthState, Subscription};
use crate::config::FirebaseConfig;

pub const DEFAULT_IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomTokenRequest<'a> {
    token: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    local_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomTokenResponse {
    id_token: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct FirebaseIdentity {
    api_key: String,
    base_url: String,
    client: Client,
    state: Arc<AuthState>,
}

impl FirebaseIdentity {
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config
                .identity_base_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_IDENTITY_BASE_URL.to_string()),
            client: Client::new(),
            state: Arc::new(AuthState::new()),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, IdentityError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        if self.api_key.is_empty() {
            return Err(IdentityError::Config("missing apiKey".to_string()));
        }

        let url = format!(
            "{}/v1/accounts:{}",
            self.base_url.trim_end_matches('/'),
            method
        );

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.without_url().to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .unwrap_or(text);
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        res.json::<R>()
            .await
            .map_err(|e| IdentityError::Malformed(e.without_url().to_string()))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in_anonymously(&self) -> Result<AuthUser, IdentityError> {
        let res: SignUpResponse = self
            .call("signUp", &SignUpRequest {
                return_secure_token: true,
            })
            .await?;

        let user = AuthUser {
            uid: res.local_id,
            is_anonymous: true,
        };
        self.state.set(Some(user.clone()));
        tracing::info!("[Identity] Signed in anonymously");
        Ok(user)
    }

    async fn sign_in_with_custom_token(&self, token: &str) -> Result<AuthUser, IdentityError> {
        let res: CustomTokenResponse = self
            .call("signInWithCustomToken", &CustomTokenRequest {
                token,
                return_secure_token: true,
            })
            .await?;

        // The custom-token exchange does not return the uid; look it up.
        let lookup: LookupResponse = self
            .call("lookup", &LookupRequest {
                id_token: &res.id_token,
            })
            .await?;
        let uid = lookup
            .users
            .into_iter()
            .next()
            .map(|u| u.local_id)
            .ok_or_else(|| IdentityError::Malformed("lookup returned no users".to_string()))?;

        let user = AuthUser {
            uid,
            is_anonymous: false,
        };
        self.state.set(Some(user.clone()));
        tracing::info!("[Identity] Signed in with custom token");
        Ok(user)
    }

    fn sign_out(&self) {
        self.state.set(None);
        tracing::info!("[Identity] Signed out");
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state.current()
    }

    fn on_auth_state_changed(&self, callback: AuthStateCallback) -> Subscription {
        self.state.subscribe(callback)
    }
}
