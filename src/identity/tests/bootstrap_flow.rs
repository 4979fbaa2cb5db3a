use super::helpers::*;
use crate::identity::interface::AuthStateCallback;
use crate::identity::{
    bootstrap, AuthState, AuthUser, IdentityError, IdentityProvider, Subscription, UserIdCell,
};
use async_trait::async_trait;
use std::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// In-process provider that records which sign-in path was taken.
struct FakeIdentity {
    state: AuthState,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeIdentity {
    fn new(fail: bool) -> Self {
        Self {
            state: AuthState::new(),
            fail,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn sign_in(&self, call: String, uid: &str, is_anonymous: bool) -> Result<AuthUser, IdentityError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(IdentityError::Request("offline".to_string()));
        }
        let user = AuthUser {
            uid: uid.to_string(),
            is_anonymous,
        };
        self.state.set(Some(user.clone()));
        Ok(user)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_anonymously(&self) -> Result<AuthUser, IdentityError> {
        self.sign_in("anonymous".to_string(), "anon", true)
    }

    async fn sign_in_with_custom_token(&self, token: &str) -> Result<AuthUser, IdentityError> {
        self.sign_in(format!("token:{}", token), "token-user", false)
    }

    fn sign_out(&self) {
        self.state.set(None);
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state.current()
    }

    fn on_auth_state_changed(&self, callback: AuthStateCallback) -> Subscription {
        self.state.subscribe(callback)
    }
}

#[tokio::test]
async fn test_token_present_uses_custom_token() {
    let provider = FakeIdentity::new(false);
    let user_id = UserIdCell::new();

    let _sub = bootstrap(&provider, Some("abc"), user_id.clone()).await;
    settle().await;

    assert_eq!(*provider.calls.lock().unwrap(), vec!["token:abc".to_string()]);
    assert_eq!(user_id.get().as_deref(), Some("token-user"));
}

#[tokio::test]
async fn test_empty_token_falls_back_to_anonymous() {
    let provider = FakeIdentity::new(false);
    let user_id = UserIdCell::new();

    let _sub = bootstrap(&provider, Some(""), user_id.clone()).await;
    settle().await;

    assert_eq!(*provider.calls.lock().unwrap(), vec!["anonymous".to_string()]);
    assert_eq!(user_id.get().as_deref(), Some("anon"));
}

#[tokio::test]
async fn test_id_is_set_when_bootstrap_returns() {
    let provider = FakeIdentity::new(false);
    let user_id = UserIdCell::new();

    let _sub = bootstrap(&provider, None, user_id.clone()).await;

    assert_eq!(user_id.get().as_deref(), Some("anon"));
}

#[tokio::test]
async fn test_failed_sign_in_leaves_id_unset() {
    let provider = FakeIdentity::new(true);
    let user_id = UserIdCell::new();

    let sub = bootstrap(&provider, None, user_id.clone()).await;
    settle().await;

    assert!(user_id.get().is_none());
    assert!(sub.is_active(), "failure must not tear down the subscription");
}

#[tokio::test]
async fn test_sign_out_clears_id() {
    let provider = FakeIdentity::new(false);
    let user_id = UserIdCell::new();

    let _sub = bootstrap(&provider, None, user_id.clone()).await;
    settle().await;
    assert!(user_id.get().is_some());

    provider.sign_out();
    settle().await;
    assert!(user_id.get().is_none());
}

#[tokio::test]
async fn test_bootstrap_against_identity_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "idToken": "t",
            "localId": "served-uid"
        })))
        .mount(&server)
        .await;

    let identity = identity_for(&server);
    let user_id = UserIdCell::new();
    let _sub = bootstrap(&identity, None, user_id.clone()).await;

    assert_eq!(user_id.get().as_deref(), Some("served-uid"));
}

#[tokio::test]
async fn test_unreachable_service_is_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let identity = identity_for(&server);
    let user_id = UserIdCell::new();
    let _sub = bootstrap(&identity, Some("expired-token"), user_id.clone()).await;
    settle().await;

    assert!(user_id.get().is_none());
}
