use std::sync::{Arc, RwLock};

use super::interface::{AuthUser, IdentityProvider};
use super::state::Subscription;

/// Shared slot for the signed-in user's id. Written by [`bootstrap`] and the
/// auth subscription it sets up.
#[derive(Debug, Clone, Default)]
pub struct UserIdCell(Arc<RwLock<Option<String>>>);

impl UserIdCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set(&self, uid: Option<String>) {
        *self.0.write().unwrap_or_else(|e| e.into_inner()) = uid;
    }
}

/// Subscribe `user_id` to auth-state changes, then sign in: with
/// `initial_token` when one is given, anonymously otherwise.
///
/// On success the id is already set when this returns. Sign-in failure is
/// logged and otherwise ignored; the id just stays unset. The returned guard
/// must be held for as long as the id should track.
pub async fn bootstrap(
    provider: &dyn IdentityProvider,
    initial_token: Option<&str>,
    user_id: UserIdCell,
) -> Subscription {
    let sink = user_id.clone();
    let subscription = provider.on_auth_state_changed(Box::new(move |user: Option<&AuthUser>| {
        sink.set(user.map(|u| u.uid.clone()));
    }));

    let result = match initial_token.filter(|t| !t.is_empty()) {
        Some(token) => provider.sign_in_with_custom_token(token).await,
        None => provider.sign_in_anonymously().await,
    };

    match result {
        // The subscription task may not have run yet.
        Ok(user) => user_id.set(Some(user.uid)),
        Err(e) => tracing::error!("[Identity] Authentication failed: {}", e),
    }

    subscription
}
