//! File-backed storage for configuration values and key material
//!
//! - `env_file`: the `KEY=VALUE` record format
//! - `CredentialStore`: read/modify/write of that file plus the read overlay
//! - `write_private`: owner-only atomic file replacement

mod credential_store;
mod env_file;
mod private_file;

pub use credential_store::CredentialStore;
pub use env_file::{ConfigEntry, ENCRYPTED_PREFIX};
pub use private_file::{restrict_permissions, write_private};
