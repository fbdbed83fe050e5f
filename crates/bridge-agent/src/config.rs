//! Registration configuration, passed explicitly to every operation.

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::error::{BridgeError, BridgeResult};

/// HTTP behaviour shared by the token and registration calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpSettings {
    /// Total time allowed per request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Time allowed to establish the TCP/TLS connection, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Path appended to the API URL for registration.
    #[serde(default = "default_register_path")]
    pub register_path: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_register_path() -> String {
    "register".into()
}
fn default_user_agent() -> String {
    concat!("bridge-register/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            register_path: default_register_path(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpSettings {
    /// Load settings from a TOML file path.
    pub fn from_file(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| BridgeError::Config(format!("invalid {}: {e}", path.display())))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Build a fresh HTTP client. Callers drop it after one request.
    pub fn build_client(&self) -> BridgeResult<reqwest::Client> {
        if self.timeout_secs == 0 {
            return Err(BridgeError::Config("timeout_secs must be greater than zero".into()));
        }
        reqwest::Client::builder()
            .timeout(self.timeout())
            .connect_timeout(self.connect_timeout())
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| BridgeError::Config(format!("failed to build HTTP client: {e}")))
    }

    /// Join `api_url` and `register_path` with exactly one `/` between them.
    pub fn register_url(&self, api_url: &str) -> BridgeResult<Url> {
        let joined = format!(
            "{}/{}",
            api_url.trim_end_matches('/'),
            self.register_path.trim_start_matches('/')
        );
        parse_http_url("api_url", &joined)
    }
}

/// OIDC client-credentials pair plus the endpoint that exchanges it.
///
/// `Debug` output never contains the client secret.
#[derive(Debug)]
pub struct OidcCredentials {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl OidcCredentials {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Check the local parts of the credentials without contacting the endpoint.
    pub fn validate(&self) -> BridgeResult<Url> {
        if self.client_id.trim().is_empty() {
            return Err(BridgeError::Validation("client_id must not be empty".into()));
        }
        parse_http_url("token_url", &self.token_url)
    }
}

/// Everything one registration run needs.
#[derive(Debug)]
pub struct RegistrationConfig {
    pub api_url: String,
    pub site_name: String,
    pub public_key: String,
    pub credentials: OidcCredentials,
    pub http: HttpSettings,
}

impl RegistrationConfig {
    /// Mirrors the positional arguments of `bridge-register`.
    pub fn new(
        api_url: impl Into<String>,
        site_name: impl Into<String>,
        public_key: impl Into<String>,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            site_name: site_name.into(),
            public_key: public_key.into(),
            credentials: OidcCredentials::new(token_url, client_id, client_secret),
            http: HttpSettings::default(),
        }
    }

    pub fn with_http(mut self, http: HttpSettings) -> Self {
        self.http = http;
        self
    }
}

fn parse_http_url(field: &str, raw: &str) -> BridgeResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| BridgeError::Validation(format!("{field} {raw:?} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BridgeError::Validation(format!(
            "{field} must use http or https, got {other:?}"
        ))),
    }
}
