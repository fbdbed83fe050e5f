//! Command-line arguments for `bridge-register`.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{HttpSettings, OidcCredentials, RegistrationConfig};
use crate::error::BridgeResult;

/// Register this node with the BRIDGE fleet-management API.
///
/// Prints the registration response as JSON on stdout. Diagnostics go to
/// stderr.
// Not `Debug`: the struct holds the client secret in plain text.
#[derive(Parser)]
#[command(name = "bridge-register", version, about, long_about = None)]
pub struct Cli {
    /// Registration API base URL (e.g. https://bridge.example.com/api/v1)
    pub api_url: String,

    /// Site name to register under
    pub site_name: String,

    /// SSH public key in authorized-keys form
    pub public_key: String,

    /// OIDC token endpoint URL
    pub token_url: String,

    /// OIDC client id
    pub client_id: String,

    /// OIDC client secret (never logged)
    pub client_secret: String,

    /// TOML file with HTTP settings (timeouts, register path)
    #[arg(short, long, env = "BRIDGE_REGISTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Connect timeout in seconds
    #[arg(long)]
    pub connect_timeout_secs: Option<u64>,

    /// Path appended to the API URL for registration
    #[arg(long)]
    pub register_path: Option<String>,

    /// Print the response on a single line
    #[arg(long)]
    pub compact: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// HTTP settings from the config file (if any), overridden by flags.
    pub fn http_settings(&self) -> BridgeResult<HttpSettings> {
        let mut http = match &self.config {
            Some(path) => HttpSettings::from_file(path)?,
            None => HttpSettings::default(),
        };
        if let Some(secs) = self.timeout_secs {
            http.timeout_secs = secs;
        }
        if let Some(secs) = self.connect_timeout_secs {
            http.connect_timeout_secs = secs;
        }
        if let Some(path) = &self.register_path {
            http.register_path = path.clone();
        }
        Ok(http)
    }

    /// Consume the arguments. The secret moves into its redacting wrapper.
    pub fn into_config(self) -> BridgeResult<RegistrationConfig> {
        let http = self.http_settings()?;
        Ok(RegistrationConfig {
            api_url: self.api_url,
            site_name: self.site_name,
            public_key: self.public_key,
            credentials: OidcCredentials::new(self.token_url, self.client_id, self.client_secret),
            http,
        })
    }
}
