//! Node identity and SSH public-key syntax checks.
//!
//! A node registers under a site name together with the public half of
//! the keypair the bootstrap script generated for it. Both are validated
//! locally so that malformed input never reaches the network.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// `<algorithm> <base64-blob> [comment]` on a single line.
static RE_AUTHORIZED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+(\S+)(?:\s+(.*))?$").unwrap());

/// Key algorithms accepted in authorized-keys form.
pub const KNOWN_ALGORITHMS: &[&str] = &[
    "ssh-rsa",
    "ssh-dss",
    "ssh-ed25519",
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
    "sk-ssh-ed25519@openssh.com",
    "sk-ecdsa-sha2-nistp256@openssh.com",
];

/// Reasons a node identity is rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("site name must not be empty")]
    EmptySiteName,

    #[error("public key must not be empty")]
    EmptyKey,

    #[error("public key must be a single line")]
    MultiLine,

    #[error("public key is not in '<algorithm> <base64-blob> [comment]' form")]
    Malformed,

    #[error("unsupported key algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("key blob is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("key blob is for {found:?}, line declares {declared:?}")]
    AlgorithmMismatch { declared: String, found: String },
}

/// Parsed view of an SSH public key line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshPublicKey {
    pub algorithm: String,
    pub blob: Vec<u8>,
    pub comment: Option<String>,
}

impl SshPublicKey {
    /// Parse and validate a public key in authorized-keys text form.
    ///
    /// Surrounding whitespace (including the trailing newline of a
    /// `.pub` file) is ignored. The decoded blob must open with the
    /// length-prefixed algorithm name, as in the SSH wire encoding.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IdentityError::EmptyKey);
        }
        if text.contains(['\n', '\r']) {
            return Err(IdentityError::MultiLine);
        }

        let caps = RE_AUTHORIZED_KEY
            .captures(text)
            .ok_or(IdentityError::Malformed)?;
        let algorithm = &caps[1];
        let encoded = &caps[2];
        let comment = caps
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .filter(|c| !c.is_empty());

        if !KNOWN_ALGORITHMS.contains(&algorithm) {
            return Err(IdentityError::UnknownAlgorithm(algorithm.to_string()));
        }

        let blob = STANDARD
            .decode(encoded)
            .map_err(|e| IdentityError::InvalidBase64(e.to_string()))?;

        let embedded = embedded_algorithm(&blob).ok_or(IdentityError::Malformed)?;
        if embedded != algorithm {
            return Err(IdentityError::AlgorithmMismatch {
                declared: algorithm.to_string(),
                found: embedded.to_string(),
            });
        }

        Ok(Self {
            algorithm: algorithm.to_string(),
            blob,
            comment,
        })
    }
}

/// Read the leading SSH `string` (u32 big-endian length + bytes) of a key blob.
fn embedded_algorithm(blob: &[u8]) -> Option<&str> {
    let len_bytes: [u8; 4] = blob.get(..4)?.try_into().ok()?;
    let len = u32::from_be_bytes(len_bytes) as usize;
    let name = blob.get(4..4usize.checked_add(len)?)?;
    std::str::from_utf8(name).ok()
}

/// Who this node is, as presented to the registration API.
///
/// Validated at construction and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    site_name: String,
    public_key: String,
}

impl NodeIdentity {
    pub fn new(
        site_name: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let site_name = site_name.into();
        if site_name.trim().is_empty() {
            return Err(IdentityError::EmptySiteName);
        }

        let public_key = public_key.into();
        SshPublicKey::parse(&public_key)?;

        Ok(Self {
            site_name,
            public_key: public_key.trim().to_string(),
        })
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Public key in authorized-keys form, trimmed.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Body of the registration request for this node.
    pub fn to_request(&self) -> SiteRegistrationRequest<'_> {
        SiteRegistrationRequest {
            site_name: &self.site_name,
            public_key: &self.public_key,
        }
    }
}

/// JSON body POSTed to the registration endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SiteRegistrationRequest<'a> {
    pub site_name: &'a str,
    pub public_key: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ED25519_BLOB: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIAABAgMEBQYHCAkKCwwNDg8QERITFBUWFxgZGhscHR4f";
    const RSA_BLOB: &str = "AAAAB3NzaC1yc2EAAAADAQABAAAAQQALMFV6n8TpDjNYfaLH7BE2W4Clyu8UOV6DqM3yFzxhhqvQ9Ro/ZImu0/gdQmeMsdb7IEVqj7TZ/iNIbZK33AEm";

    #[test]
    fn parse_ed25519_with_comment() {
        let key = SshPublicKey::parse(&format!("ssh-ed25519 {ED25519_BLOB} bridge-node1")).unwrap();
        assert_eq!(key.algorithm, "ssh-ed25519");
        assert_eq!(key.comment.as_deref(), Some("bridge-node1"));
        assert_eq!(key.blob.len(), 4 + 11 + 4 + 32);
    }

    #[test]
    fn parse_rsa_without_comment() {
        let key = SshPublicKey::parse(&format!("ssh-rsa {RSA_BLOB}")).unwrap();
        assert_eq!(key.algorithm, "ssh-rsa");
        assert!(key.comment.is_none());
    }

    #[test]
    fn parse_tolerates_trailing_newline() {
        let key = SshPublicKey::parse(&format!("ssh-rsa {RSA_BLOB} root@node1\n")).unwrap();
        assert_eq!(key.comment.as_deref(), Some("root@node1"));
    }

    #[test]
    fn comment_may_contain_spaces() {
        let key = SshPublicKey::parse(&format!("ssh-rsa {RSA_BLOB} bridge node 1")).unwrap();
        assert_eq!(key.comment.as_deref(), Some("bridge node 1"));
    }

    #[test]
    fn reject_empty_key() {
        assert_eq!(SshPublicKey::parse(""), Err(IdentityError::EmptyKey));
        assert_eq!(SshPublicKey::parse("  \n"), Err(IdentityError::EmptyKey));
    }

    #[test]
    fn reject_missing_algorithm_prefix() {
        assert_eq!(
            SshPublicKey::parse(RSA_BLOB),
            Err(IdentityError::Malformed)
        );
        assert!(matches!(
            SshPublicKey::parse(&format!("{RSA_BLOB} bridge-node1")),
            Err(IdentityError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn reject_invalid_base64() {
        let err = SshPublicKey::parse("ssh-rsa AAAA... bridge-node1").unwrap_err();
        assert!(matches!(err, IdentityError::InvalidBase64(_)));
    }

    #[test]
    fn reject_multiline() {
        let text = format!("ssh-rsa {RSA_BLOB}\nssh-ed25519 {ED25519_BLOB}");
        assert_eq!(SshPublicKey::parse(&text), Err(IdentityError::MultiLine));
    }

    #[test]
    fn reject_blob_for_other_algorithm() {
        let err = SshPublicKey::parse(&format!("ssh-ed25519 {RSA_BLOB}")).unwrap_err();
        assert_eq!(
            err,
            IdentityError::AlgorithmMismatch {
                declared: "ssh-ed25519".into(),
                found: "ssh-rsa".into(),
            }
        );
    }

    #[test]
    fn reject_truncated_blob() {
        // Valid base64, but too short to hold the length-prefixed name.
        assert_eq!(
            SshPublicKey::parse("ssh-rsa AAAA"),
            Err(IdentityError::Malformed)
        );
    }

    #[test]
    fn identity_trims_key_and_keeps_site_name() {
        let id = NodeIdentity::new("TEST-node1", format!("ssh-rsa {RSA_BLOB} bridge-node1\n")).unwrap();
        assert_eq!(id.site_name(), "TEST-node1");
        assert_eq!(id.public_key(), format!("ssh-rsa {RSA_BLOB} bridge-node1"));
    }

    #[test]
    fn identity_rejects_blank_site_name() {
        let key = format!("ssh-rsa {RSA_BLOB}");
        assert_eq!(
            NodeIdentity::new("", key.clone()),
            Err(IdentityError::EmptySiteName)
        );
        assert_eq!(
            NodeIdentity::new("   ", key),
            Err(IdentityError::EmptySiteName)
        );
    }

    #[test]
    fn request_body_shape() {
        let id = NodeIdentity::new("TEST-node1", format!("ssh-ed25519 {ED25519_BLOB}")).unwrap();
        let json = serde_json::to_value(id.to_request()).unwrap();
        assert_eq!(json["site_name"], "TEST-node1");
        assert_eq!(json["public_key"], format!("ssh-ed25519 {ED25519_BLOB}"));
        assert_eq!(json.as_object().unwrap().len(), 2);
    }
}
