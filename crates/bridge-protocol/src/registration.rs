use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Successful response from the registration API.
///
/// The body is kept verbatim. Callers decide which fields matter.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationResult {
    /// HTTP status the API answered with (any 2xx).
    pub status: u16,
    /// Parsed JSON body, unmodified.
    pub raw_response: Value,
}

/// Fields the registration API is known to return, when present.
///
/// Only used for log lines; absent or mistyped fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Configuration repository the node should clone next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
}

impl RegistrationResult {
    pub fn new(status: u16, raw_response: Value) -> Self {
        Self {
            status,
            raw_response,
        }
    }

    pub fn into_body(self) -> Value {
        self.raw_response
    }

    /// Best-effort extraction of well-known fields.
    pub fn summary(&self) -> RegistrationSummary {
        let body = &self.raw_response;
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);

        RegistrationSummary {
            id: body.get("id").and_then(Value::as_i64),
            site_name: text("site_name"),
            created_at: text("created_at")
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|t| t.with_timezone(&Utc)),
            created_by: text("created_by"),
            repo_url: text("github_repo_url").or_else(|| text("repo_url")),
        }
    }
}
