//! BRIDGE node registration: library crate for the `bridge-register` binary.
//!
//! Re-exports all modules so external crates (e.g. `bridge-e2e-tests`) can
//! drive `run`, `fetch_token` and `register_node` directly.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod oidc;
pub mod runner;

pub use client::{register_identity, register_node};
pub use config::{HttpSettings, OidcCredentials, RegistrationConfig};
pub use error::{BridgeError, BridgeResult};
pub use oidc::fetch_token;
pub use runner::run;
