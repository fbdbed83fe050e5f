//! OIDC access tokens held for the duration of one registration.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Token type assumed when the token endpoint omits `token_type`.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Bearer credential obtained from the OIDC token endpoint.
///
/// The token value is never printed: `Debug` shows it as `[REDACTED]`
/// and there is no `Display` impl.
#[derive(Debug)]
pub struct AccessToken {
    value: SecretString,
    token_type: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(
        value: impl Into<String>,
        token_type: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            value: SecretString::from(value.into()),
            token_type: token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            expires_at,
        }
    }

    /// Build a token from an `expires_in` lifetime measured from `issued_at`.
    pub fn with_lifetime(
        value: impl Into<String>,
        token_type: Option<String>,
        expires_in_secs: Option<u64>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let expires_at = expires_in_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime));
        Self::new(value, token_type, expires_at)
    }

    /// The raw token value, for building the `Authorization` header only.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Tokens without an expiry never expire locally.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
