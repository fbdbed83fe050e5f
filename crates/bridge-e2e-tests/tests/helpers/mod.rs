//! Shared test harness for E2E registration tests.
//!
//! Stands up two mock servers, one for the OIDC token endpoint and one for
//! the registration API, so call counts can be asserted per endpoint.

#![allow(dead_code)]

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bridge_agent::{HttpSettings, RegistrationConfig};

pub const TOKEN_PATH: &str = "/realms/bridge/protocol/openid-connect/token";
pub const REGISTER_PATH: &str = "/api/v1/register";

/// A well-formed RSA public key (short modulus, test only).
pub const RSA_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAAAQQALMFV6n8TpDjNYfaLH7BE2W4Clyu8UOV6DqM3yFzxhhqvQ9Ro/ZImu0/gdQmeMsdb7IEVqj7TZ/iNIbZK33AEm bridge-node1";

/// A well-formed Ed25519 public key.
pub const ED25519_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIAABAgMEBQYHCAkKCwwNDg8QERITFBUWFxgZGhscHR4f bridge-node2";

pub const CLIENT_ID: &str = "bridge-node";
pub const CLIENT_SECRET: &str = "very-s3cret-value";

/// Token endpoint + registration API pair.
pub struct Fleet {
    pub idp: MockServer,
    pub api: MockServer,
}

impl Fleet {
    pub async fn start() -> Self {
        Self {
            idp: MockServer::start().await,
            api: MockServer::start().await,
        }
    }

    /// Token endpoint answers `200` with the given JSON body.
    pub async fn token_responds(&self, body: Value) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.idp)
            .await;
    }

    /// Token endpoint answers with a bare status.
    pub async fn token_fails(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(
                serde_json::json!({"error": "invalid_client", "error_description": "rejected"}),
            ))
            .mount(&self.idp)
            .await;
    }

    /// Registration API answers with `status` and a JSON body.
    pub async fn register_responds(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(REGISTER_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.api)
            .await;
    }

    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.api.uri())
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.idp.uri(), TOKEN_PATH)
    }

    /// Registration config pointed at both mock servers.
    pub fn config(&self, site_name: &str, public_key: &str) -> RegistrationConfig {
        RegistrationConfig::new(
            self.api_url(),
            site_name,
            public_key,
            self.token_url(),
            CLIENT_ID,
            CLIENT_SECRET,
        )
        .with_http(HttpSettings {
            timeout_secs: 2,
            connect_timeout_secs: 1,
            ..Default::default()
        })
    }

    pub async fn token_calls(&self) -> usize {
        self.idp.received_requests().await.unwrap_or_default().len()
    }

    pub async fn register_calls(&self) -> usize {
        self.api.received_requests().await.unwrap_or_default().len()
    }

    /// Body of the n-th request the registration API received.
    pub async fn register_body(&self, n: usize) -> Value {
        let requests = self.api.received_requests().await.unwrap_or_default();
        serde_json::from_slice(&requests[n].body).unwrap()
    }

    /// Raw form body of the n-th request the token endpoint received.
    pub async fn token_form(&self, n: usize) -> String {
        let requests = self.idp.received_requests().await.unwrap_or_default();
        String::from_utf8(requests[n].body.clone()).unwrap()
    }
}
