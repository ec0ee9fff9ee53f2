//! Service account type definitions

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::SecretString;

/// Fields every key file must carry, in the order they are checked
pub const REQUIRED_FIELDS: [&str; 4] = ["type", "project_id", "private_key", "client_email"];

/// Parsed service account key file
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ServiceAccountKey {
    /// Account kind, `service_account` for downloaded keys
    #[serde(rename = "type")]
    pub key_type: String,
    pub project_id: String,
    /// PEM-encoded private key
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub auth_uri: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    /// Bind this identity to `scopes`. `default_token_uri` is used when the
    /// key file does not name one.
    pub fn scoped(&self, scopes: &[String], default_token_uri: &str) -> ScopedCredential {
        ScopedCredential {
            client_email: self.client_email.clone(),
            project_id: self.project_id.clone(),
            private_key_id: self.private_key_id.clone(),
            private_key: SecretString::new(self.private_key.clone()),
            token_uri: self
                .token_uri
                .clone()
                .unwrap_or_else(|| default_token_uri.to_string()),
            scopes: scopes.to_vec(),
        }
    }
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// A service account identity bound to a fixed scope list, ready for a
/// JWT-bearer token exchange by the mail and spreadsheet collaborators
#[derive(Debug, Clone)]
pub struct ScopedCredential {
    pub client_email: String,
    pub project_id: String,
    pub private_key_id: Option<String>,
    pub private_key: SecretString,
    pub token_uri: String,
    pub scopes: Vec<String>,
}

impl ScopedCredential {
    /// Scopes in the space-separated form token endpoints expect
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}
