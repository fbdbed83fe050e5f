//! OIDC client-credentials grant.
//!
//! Exchanges the node's client id/secret for a bearer token. A new HTTP
//! client is built per call and no token is cached, so every registration
//! attempt requests exactly one fresh token.

use chrono::Utc;
use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use serde::Deserialize;

use bridge_protocol::AccessToken;

use crate::config::{HttpSettings, OidcCredentials};
use crate::error::{BridgeError, BridgeResult, truncate_body};

/// Token endpoint response (only fields we need).
///
/// Deliberately not `Debug`: it holds the raw token.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

/// Some identity providers send `expires_in` as a string.
fn lifetime_secs(value: Option<&serde_json::Value>) -> Option<u64> {
    match value? {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Request an access token from `credentials.token_url`.
///
/// Every failure is a [`BridgeError::Auth`]: non-success statuses,
/// unparseable bodies, bodies without an `access_token`, and an endpoint
/// that cannot be reached (`status: None`, message names the timeout or
/// connect failure).
pub async fn fetch_token(
    credentials: &OidcCredentials,
    http: &HttpSettings,
) -> BridgeResult<AccessToken> {
    let token_url = credentials.validate()?;
    let client = http.build_client()?;

    tracing::debug!(
        token_url = %token_url,
        client_id = %credentials.client_id,
        "requesting access token"
    );

    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.expose_secret()),
    ];

    let response = client
        .post(token_url.clone())
        .header(ACCEPT, "application/json")
        .form(&form)
        .send()
        .await
        .map_err(|e| BridgeError::token_unreachable(&e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BridgeError::token_unreachable(&e))?;

    if !status.is_success() {
        let excerpt = truncate_body(&body);
        tracing::warn!(
            token_url = %token_url,
            status = status.as_u16(),
            response_text = %excerpt,
            "token endpoint rejected client credentials"
        );
        return Err(BridgeError::Auth {
            status: Some(status.as_u16()),
            message: format!("token endpoint returned {status}: {excerpt}"),
        });
    }

    let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| BridgeError::Auth {
        status: Some(status.as_u16()),
        message: format!("unparseable token response: {e}"),
    })?;

    let value = parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BridgeError::Auth {
            status: Some(status.as_u16()),
            message: "token response has no access_token".into(),
        })?;

    let token = AccessToken::with_lifetime(
        value,
        parsed.token_type,
        lifetime_secs(parsed.expires_in.as_ref()),
        Utc::now(),
    );

    tracing::info!(
        token_type = %token.token_type(),
        expires_at = ?token.expires_at(),
        "access token obtained"
    );
    Ok(token)
}
