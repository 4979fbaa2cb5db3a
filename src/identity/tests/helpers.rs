use crate::config::FirebaseConfig;
use crate::identity::FirebaseIdentity;
use std::time::Duration;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "fb-test-key";

pub fn identity_for(server: &MockServer) -> FirebaseIdentity {
    let config = FirebaseConfig {
        api_key: TEST_API_KEY.to_string(),
        identity_base_url: Some(server.uri()),
        ..Default::default()
    };
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    FirebaseIdentity::new(&config).with_client(client)
}

/// Let spawned subscription tasks observe the latest change.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
