use async_trait::async_trait;
use thiserror::Error;

use super::state::Subscription;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Identity config error: {0}")]
    Config(String),
    #[error("Identity request failed: {0}")]
    Request(String),
    #[error("Identity service rejected sign-in ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Unexpected identity response: {0}")]
    Malformed(String),
}

/// A signed-in user. Only the id is used by the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub is_anonymous: bool,
}

/// Callback invoked with the current user, then on every auth-state change.
pub type AuthStateCallback = Box<dyn Fn(Option<&AuthUser>) + Send + Sync + 'static>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_anonymously(&self) -> Result<AuthUser, IdentityError>;

    async fn sign_in_with_custom_token(&self, token: &str) -> Result<AuthUser, IdentityError>;

    fn sign_out(&self);

    fn current_user(&self) -> Option<AuthUser>;

    /// The returned guard keeps the subscription alive; drop it to stop.
    fn on_auth_state_changed(&self, callback: AuthStateCallback) -> Subscription;
}
