//! Registration API client.
//!
//! Sends the node identity with a bearer token and hands back whatever
//! JSON the API answers with. The payload is not interpreted here.

use reqwest::header::ACCEPT;
use url::Url;

use bridge_protocol::{AccessToken, NodeIdentity, RegistrationResult};

use crate::config::HttpSettings;
use crate::error::{BridgeError, BridgeResult, truncate_body};

/// Validate `site_name` and `public_key`, then register them.
///
/// Malformed input fails with [`BridgeError::Validation`] before any
/// request is made.
pub async fn register_node(
    api_url: &str,
    site_name: &str,
    public_key: &str,
    token: &AccessToken,
    http: &HttpSettings,
) -> BridgeResult<RegistrationResult> {
    let identity = NodeIdentity::new(site_name, public_key)?;
    let url = http.register_url(api_url)?;
    register_identity(&url, &identity, token, http).await
}

/// POST an already-validated identity to `url`.
pub async fn register_identity(
    url: &Url,
    identity: &NodeIdentity,
    token: &AccessToken,
    http: &HttpSettings,
) -> BridgeResult<RegistrationResult> {
    if token.is_expired() {
        return Err(BridgeError::auth(
            "access token expired before registration was attempted",
        ));
    }
    if !token.token_type().eq_ignore_ascii_case("bearer") {
        tracing::warn!(
            token_type = %token.token_type(),
            "token endpoint issued a non-bearer token, sending it as bearer"
        );
    }

    let client = http.build_client()?;
    tracing::info!(url = %url, site_name = %identity.site_name(), "registering node");

    let response = client
        .post(url.clone())
        .header(ACCEPT, "application/json")
        .bearer_auth(token.expose())
        .json(&identity.to_request())
        .send()
        .await
        .map_err(|e| {
            tracing::error!(
                url = %url,
                site_name = %identity.site_name(),
                error = %e,
                "error while calling registration endpoint"
            );
            BridgeError::transport(&e)
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BridgeError::transport(&e))?;

    if !status.is_success() {
        let excerpt = truncate_body(&body);
        tracing::error!(
            url = %url,
            site_name = %identity.site_name(),
            status = status.as_u16(),
            response_text = %excerpt,
            "registration API error"
        );
        return Err(BridgeError::Registration {
            status: status.as_u16(),
            body: excerpt,
        });
    }

    let raw_response = serde_json::from_str(&body).map_err(|e| BridgeError::Registration {
        status: status.as_u16(),
        body: format!("malformed response body ({e}): {}", truncate_body(&body)),
    })?;

    Ok(RegistrationResult::new(status.as_u16(), raw_response))
}
