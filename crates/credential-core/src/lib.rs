//! # credential-core
//!
//! Credential lifecycle for the workflow automation:
//! - File-backed AES-256-GCM master key, created once and never regenerated
//! - `KEY=VALUE` config store with an explicit read overlay
//! - Service account key validation and owner-only storage
//! - A single facade handing typed, read-only credentials to collaborators

pub mod crypto;
pub mod error;
pub mod facade;
pub mod service_account;
pub mod settings;
pub mod storage;

pub use crypto::{EncryptedSecret, KeyManager, MasterKey, SecretString};
pub use error::{CredentialError, Result};
pub use facade::{CredentialFacade, MailOAuthCredentials, MessagingCredentials};
pub use service_account::{ScopedCredential, ServiceAccountKey, ServiceAccountValidator};
pub use settings::{OAuthSettings, Settings};
pub use storage::{ConfigEntry, CredentialStore};
