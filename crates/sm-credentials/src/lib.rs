//! The persisted credential database: per-sensor topics and credentials,
//! the administrator and sensor-driver tokens, and the constant-time
//! authentication/authorization decisions the auth oracle delegates to.

pub mod error;
pub mod secret;
pub mod store;

pub use error::StoreError;
pub use secret::{generate_secret, Secret};
pub use store::CredentialStore;
