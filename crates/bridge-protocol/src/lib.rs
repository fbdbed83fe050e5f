//! Shared types for BRIDGE node registration.
//!
//! No I/O lives here: just the identity a node presents, the token it
//! presents it with, and the response it gets back.

pub mod identity;
pub mod registration;
pub mod token;

pub use identity::*;
pub use registration::*;
pub use token::*;
