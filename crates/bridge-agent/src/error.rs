//! Registration error taxonomy.

use bridge_protocol::IdentityError;
use thiserror::Error;

/// Longest response body excerpt carried in an error message.
pub const MAX_BODY_CHARS: usize = 512;

/// Errors that abort a registration run.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed local input. Nothing was sent over the network.
    #[error("validation error: {0}")]
    Validation(String),

    /// The token endpoint was unreachable, rejected the credentials or
    /// returned an unusable body. `status` is `None` when no HTTP answer
    /// arrived.
    #[error("auth error{}: {message}", http_suffix(.status))]
    Auth { status: Option<u16>, message: String },

    /// The registration endpoint answered, but not with a usable 2xx.
    #[error("registration error (HTTP {status}): {body}")]
    Registration { status: u16, body: String },

    /// Connection, TLS or timeout failure talking to the registration API.
    #[error("transport error during register request: {0}")]
    Transport(String),

    /// Local settings could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

impl From<IdentityError> for BridgeError {
    fn from(e: IdentityError) -> Self {
        BridgeError::Validation(e.to_string())
    }
}

impl BridgeError {
    pub fn auth(message: impl Into<String>) -> Self {
        BridgeError::Auth {
            status: None,
            message: message.into(),
        }
    }

    /// Token endpoint send/read failure. No HTTP status was received.
    pub fn token_unreachable(err: &reqwest::Error) -> Self {
        BridgeError::Auth {
            status: None,
            message: format!("token endpoint unreachable: {}", describe_send_error(err)),
        }
    }

    /// Registration endpoint send/read failure.
    pub fn transport(err: &reqwest::Error) -> Self {
        BridgeError::Transport(describe_send_error(err))
    }

    /// HTTP status attached to the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            BridgeError::Auth { status, .. } => *status,
            BridgeError::Registration { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Process exit code for the `bridge-register` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            BridgeError::Config(_) => 1,
            BridgeError::Validation(_) => 3,
            BridgeError::Auth { .. } => 4,
            BridgeError::Registration { .. } => 5,
            BridgeError::Transport(_) => 6,
        }
    }
}

/// Keep timeouts and refused connections recognisable in the message.
fn describe_send_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Convenience alias for registration results.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Cut a response body down to [`MAX_BODY_CHARS`] characters.
pub fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}... ({} bytes total)", &body[..idx], body.len()),
        None => body.to_string(),
    }
}
