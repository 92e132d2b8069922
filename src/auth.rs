//! Credential models and identifiers for the three OAuth 1.0a token states.

pub mod credential;
pub mod id;
pub mod secret;

pub use credential::*;
pub use id::*;
pub use secret::*;
