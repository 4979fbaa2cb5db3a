//! Auth state store and scoped change subscriptions.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::interface::{AuthStateCallback, AuthUser};

/// Holds the signed-in user (or none) and fans changes out to subscribers.
pub struct AuthState {
    tx: watch::Sender<Option<AuthUser>>,
}

impl AuthState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn current(&self) -> Option<AuthUser> {
        self.tx.borrow().clone()
    }

    pub fn set(&self, user: Option<AuthUser>) {
        self.tx.send_replace(user);
    }

    /// Must be called within a tokio runtime. The callback sees the current
    /// value first, then every later change until the guard is dropped.
    pub fn subscribe(&self, callback: AuthStateCallback) -> Subscription {
        let mut rx = self.tx.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                {
                    let user = rx.borrow_and_update();
                    callback((*user).as_ref());
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
        Subscription {
            handle: Some(handle),
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Live auth-state subscription. Released on drop.
#[must_use = "dropping the subscription stops auth-state updates"]
pub struct Subscription {
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.release();
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("[Identity] Auth-state subscription released");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
