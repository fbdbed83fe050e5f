//! One registration attempt: validate, fetch a token, register.
//!
//! Runs once per process. Any failure aborts the attempt; nothing is
//! retried.

use tracing::Instrument;
use uuid::Uuid;

use bridge_protocol::{NodeIdentity, RegistrationResult};

use crate::client::register_identity;
use crate::config::RegistrationConfig;
use crate::error::BridgeResult;
use crate::oidc::fetch_token;

/// Register the node described by `config`.
///
/// All local input is validated before the first request, so a
/// validation failure makes no network calls at all. Exactly one token
/// is requested per call.
pub async fn run(config: &RegistrationConfig) -> BridgeResult<RegistrationResult> {
    let run_id = Uuid::now_v7();
    let span = tracing::info_span!("registration", %run_id, site_name = %config.site_name);

    async move {
        let identity = NodeIdentity::new(config.site_name.as_str(), config.public_key.as_str())?;
        let register_url = config.http.register_url(&config.api_url)?;
        config.credentials.validate()?;

        tracing::info!(
            api_url = %config.api_url,
            token_url = %config.credentials.token_url,
            client_id = %config.credentials.client_id,
            "registering site"
        );

        let token = fetch_token(&config.credentials, &config.http).await?;
        let result = register_identity(&register_url, &identity, &token, &config.http).await?;

        let summary = result.summary();
        tracing::info!(
            status = result.status,
            id = ?summary.id,
            repo_url = ?summary.repo_url,
            created_at = ?summary.created_at,
            "registration successful"
        );
        Ok(result)
    }
    .instrument(span)
    .await
}
