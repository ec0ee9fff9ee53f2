//! Validation and restricted storage of uploaded key material

use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::types::{ServiceAccountKey, REQUIRED_FIELDS};
use crate::error::{CredentialError, Result};
use crate::storage::{write_private, CredentialStore};

/// Config key flagging that service account material is in place
pub const USE_SERVICE_ACCOUNT_KEY: &str = "USE_SERVICE_ACCOUNT";
/// Config key holding the stored key file's path
pub const SERVICE_ACCOUNT_FILE_KEY: &str = "SERVICE_ACCOUNT_FILE";

/// Parse and schema-check key material without touching the filesystem
pub fn parse_key_material(bytes: &[u8]) -> Result<ServiceAccountKey> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| CredentialError::ParseError(format!("key material is not valid JSON: {}", e)))?;

    let object = value.as_object().ok_or_else(|| {
        CredentialError::ParseError("key material must be a JSON object".to_string())
    })?;

    for field in REQUIRED_FIELDS {
        match object.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            _ => return Err(CredentialError::SchemaError(field.to_string())),
        }
    }

    serde_json::from_value(value)
        .map_err(|e| CredentialError::ParseError(format!("key material: {}", e)))
}

/// Validates uploaded key files and keeps one copy in the restricted location
#[derive(Debug, Clone)]
pub struct ServiceAccountValidator {
    stored_path: PathBuf,
}

impl ServiceAccountValidator {
    pub fn new(stored_path: impl Into<PathBuf>) -> Self {
        Self {
            stored_path: stored_path.into(),
        }
    }

    /// Location of the validated copy
    pub fn stored_path(&self) -> &Path {
        &self.stored_path
    }

    pub fn is_configured(&self) -> bool {
        self.stored_path.exists()
    }

    /// Validate the key file at `source`, copy it to the restricted location
    /// and record it in `store`.
    ///
    /// Nothing is written unless every required field is present.
    pub fn set_key_material(&self, source: &Path, store: &CredentialStore) -> Result<ServiceAccountKey> {
        let bytes = fs::read(source).map_err(|e| CredentialError::storage(source, e))?;
        let key = parse_key_material(&bytes)?;

        write_private(&self.stored_path, &bytes)?;

        store.update(USE_SERVICE_ACCOUNT_KEY, "true")?;
        store.update(
            SERVICE_ACCOUNT_FILE_KEY,
            &self.stored_path.to_string_lossy(),
        )?;

        info!("Service account configured: {}", key.client_email);
        Ok(key)
    }

    /// The stored key material, or `None` if none has been configured
    pub fn load_key_material(&self) -> Result<Option<ServiceAccountKey>> {
        let bytes = match fs::read(&self.stored_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No service account material at {:?}", self.stored_path);
                return Ok(None);
            }
            Err(e) => return Err(CredentialError::storage(&self.stored_path, e)),
        };

        parse_key_material(&bytes).map(Some)
    }
}
