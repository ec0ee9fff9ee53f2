//! Keep the configured OAuth client id in line with the downloaded
//! client-secrets file
//!
//! After an OAuth client is recreated in the provider console the config file
//! often still names the old (deleted) client id, and every exchange then
//! fails with `invalid_client`. Reconciling rewrites the ids and keeps the
//! configured secret.

use credential_core::facade::GMAIL_CLIENT_ID;
use credential_core::{CredentialError, CredentialStore, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

pub const GDRIVE_CLIENT_ID: &str = "GDRIVE_CLIENT_ID";

/// Config keys that must all carry the same client id
pub const CLIENT_ID_KEYS: [&str; 2] = [GMAIL_CLIENT_ID, GDRIVE_CLIENT_ID];

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
}

#[derive(Debug, Deserialize)]
struct ClientSection {
    client_id: String,
}

/// Outcome of `reconcile_client_id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientIdStatus {
    /// Config already names the file's client id
    Matched,
    /// Config was rewritten; `previous` is what it held before
    Updated { previous: String },
}

/// The client id from a downloaded client-secrets JSON (`installed` or `web`)
pub fn read_client_id(path: &Path) -> Result<String> {
    let contents = std::fs::read_to_string(path).map_err(|e| CredentialError::storage(path, e))?;
    let file: ClientSecretsFile = serde_json::from_str(&contents).map_err(|e| {
        CredentialError::ParseError(format!("client secrets {}: {}", path.display(), e))
    })?;

    file.installed
        .or(file.web)
        .map(|section| section.client_id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            CredentialError::ParseError(format!(
                "client secrets {} has no installed or web client_id",
                path.display()
            ))
        })
}

/// Point every client id key at the id in `client_secrets`, leaving the client
/// secret as configured. Compares against the store's overlay.
pub fn reconcile_client_id(store: &CredentialStore, client_secrets: &Path) -> Result<ClientIdStatus> {
    let file_id = read_client_id(client_secrets)?;
    let configured = store.get_or_empty(GMAIL_CLIENT_ID);

    if configured == file_id {
        info!("Configured client id matches {:?}", client_secrets);
        return Ok(ClientIdStatus::Matched);
    }

    warn!("Configured client id differs from {:?}; updating", client_secrets);
    let updates = CLIENT_ID_KEYS.map(|key| (key, file_id.as_str()));
    store.update_all(&updates)?;

    Ok(ClientIdStatus::Updated {
        previous: configured,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_secrets(dir: &TempDir, json: &str) -> std::path::PathBuf {
        let path = dir.path().join("client_secret.json");
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_read_installed_and_web_sections() {
        let temp_dir = TempDir::new().unwrap();

        let path = write_secrets(&temp_dir, r#"{"installed": {"client_id": "new.apps", "client_secret": "s"}}"#);
        assert_eq!(read_client_id(&path).unwrap(), "new.apps");

        let path = write_secrets(&temp_dir, r#"{"web": {"client_id": "web.apps"}}"#);
        assert_eq!(read_client_id(&path).unwrap(), "web.apps");

        let path = write_secrets(&temp_dir, r#"{"other": {}}"#);
        assert!(matches!(read_client_id(&path), Err(CredentialError::ParseError(_))));
    }

    #[test]
    fn test_mismatch_rewrites_ids_and_keeps_secret() {
        let temp_dir = TempDir::new().unwrap();
        let env_path = temp_dir.path().join(".env");
        fs::write(
            &env_path,
            "GMAIL_CLIENT_ID=old.apps\nGMAIL_CLIENT_SECRET=keep-me\nGDRIVE_CLIENT_ID=old.apps\n",
        )
        .unwrap();
        let store = CredentialStore::open_file_only(&env_path).unwrap();
        let secrets = write_secrets(&temp_dir, r#"{"installed": {"client_id": "new.apps"}}"#);

        let status = reconcile_client_id(&store, &secrets).unwrap();

        assert_eq!(
            status,
            ClientIdStatus::Updated {
                previous: "old.apps".to_string()
            }
        );
        assert_eq!(
            fs::read_to_string(&env_path).unwrap(),
            "GMAIL_CLIENT_ID=new.apps\nGMAIL_CLIENT_SECRET=keep-me\nGDRIVE_CLIENT_ID=new.apps\n"
        );
    }

    #[test]
    fn test_matching_id_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let env_path = temp_dir.path().join(".env");
        fs::write(&env_path, "GMAIL_CLIENT_ID=same.apps\n").unwrap();
        let store = CredentialStore::open_file_only(&env_path).unwrap();
        let secrets = write_secrets(&temp_dir, r#"{"installed": {"client_id": "same.apps"}}"#);

        assert_eq!(reconcile_client_id(&store, &secrets).unwrap(), ClientIdStatus::Matched);
        assert_eq!(fs::read_to_string(&env_path).unwrap(), "GMAIL_CLIENT_ID=same.apps\n");
    }
}
