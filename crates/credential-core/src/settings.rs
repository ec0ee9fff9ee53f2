//! Credential settings
//!
//! Where the config, key and key-material files live, plus the OAuth
//! endpoints and scopes. Stored as an optional camelCase JSON file; every
//! field falls back to its default.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CredentialError, Result};

/// Scopes requested for both the service account and the user OAuth grant
pub const DEFAULT_SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/spreadsheets",
];

/// Redirect target that shows the code to the user instead of calling back
pub const OUT_OF_BAND_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

fn default_scopes() -> Vec<String> {
    DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()
}

/// Manual OAuth flow configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OAuthSettings {
    pub authorize_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Config keys that receive the refresh token on success
    pub refresh_token_keys: Vec<String>,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            authorize_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            redirect_uri: OUT_OF_BAND_REDIRECT.to_string(),
            scopes: default_scopes(),
            refresh_token_keys: vec![
                "GMAIL_REFRESH_TOKEN".to_string(),
                "GDRIVE_REFRESH_TOKEN".to_string(),
            ],
        }
    }
}

/// Credential settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Directory holding the config, key and key-material files
    pub config_dir: PathBuf,
    pub env_file: String,
    pub key_file: String,
    pub service_account_file: String,
    pub service_account_scopes: Vec<String>,
    pub service_account_token_uri: String,
    pub oauth: OAuthSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            config_dir: PathBuf::from("config"),
            env_file: ".env".to_string(),
            key_file: ".encryption_key".to_string(),
            service_account_file: "service_account.json".to_string(),
            service_account_scopes: default_scopes(),
            service_account_token_uri: "https://oauth2.googleapis.com/token".to_string(),
            oauth: OAuthSettings::default(),
        }
    }
}

impl Settings {
    /// Defaults rooted at `config_dir`
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            ..Self::default()
        }
    }

    /// Defaults rooted at the platform config directory
    pub fn user_default() -> Result<Self> {
        ProjectDirs::from("com", "workflow-credentials", "workflow-credentials")
            .map(|dirs| Self::with_config_dir(dirs.config_dir()))
            .ok_or_else(|| {
                CredentialError::StorageError("Could not determine config directory".to_string())
            })
    }

    /// Load settings from a JSON file, or defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| CredentialError::storage(path, e))?;
        let settings = serde_json::from_str(&contents).map_err(|e| {
            CredentialError::ParseError(format!("settings file {}: {}", path.display(), e))
        })?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn env_path(&self) -> PathBuf {
        self.config_dir.join(&self.env_file)
    }

    pub fn key_path(&self) -> PathBuf {
        self.config_dir.join(&self.key_file)
    }

    pub fn service_account_path(&self) -> PathBuf {
        self.config_dir.join(&self.service_account_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        let settings = Settings::default();
        assert_eq!(settings.env_path(), PathBuf::from("config/.env"));
        assert_eq!(settings.key_path(), PathBuf::from("config/.encryption_key"));
        assert_eq!(
            settings.service_account_path(),
            PathBuf::from("config/service_account.json")
        );
        assert_eq!(settings.oauth.redirect_uri, OUT_OF_BAND_REDIRECT);
        assert_eq!(settings.oauth.scopes.len(), 4);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_or_default(&temp_dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_overrides_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"configDir": "/srv/creds", "oauth": {"tokenUrl": "http://localhost:9000/token"}}"#,
        )
        .unwrap();

        let settings = Settings::load_or_default(&path).unwrap();
        assert_eq!(settings.config_dir, PathBuf::from("/srv/creds"));
        assert_eq!(settings.oauth.token_url, "http://localhost:9000/token");
        assert_eq!(settings.oauth.redirect_uri, OUT_OF_BAND_REDIRECT);
        assert_eq!(settings.env_file, ".env");
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Settings::load_or_default(&path),
            Err(CredentialError::ParseError(_))
        ));
    }

    #[test]
    fn test_user_default_keeps_file_names() {
        // Containers without a home directory have no platform config dir
        if let Ok(settings) = Settings::user_default() {
            assert!(settings.env_path().ends_with(".env"));
        }
    }
}
