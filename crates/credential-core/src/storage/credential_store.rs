//! File-backed `KEY=VALUE` credential store
//!
//! Reads and writes go through different paths. `update` rewrites
//! the file immediately; `get` answers from the overlay snapshot taken when the
//! store was opened. A value written in this process becomes readable only
//! after `reload()` (or a restart), which is the contract the workflow scripts
//! were built around.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::env_file::{self, ConfigEntry, ENCRYPTED_PREFIX};
use super::private_file::write_private;
use crate::crypto::{KeyManager, SecretString};
use crate::error::{CredentialError, Result};

/// Where overlay values come from besides the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverlaySource {
    /// Process environment wins over file values
    ProcessEnv,
    /// File values only
    FileOnly,
}

/// Persists configuration as a flat `KEY=VALUE` file
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    source: OverlaySource,
    overlay: HashMap<String, String>,
}

impl CredentialStore {
    /// Open the store, layering the process environment over the file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path.into(), OverlaySource::ProcessEnv)
    }

    /// Open the store with an overlay built from the file alone
    pub fn open_file_only(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path.into(), OverlaySource::FileOnly)
    }

    fn open_with(path: PathBuf, source: OverlaySource) -> Result<Self> {
        let mut store = Self {
            path,
            source,
            overlay: HashMap::new(),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-snapshot the overlay from the file (and environment)
    pub fn reload(&mut self) -> Result<()> {
        let mut overlay = HashMap::new();

        for entry in self.entries()? {
            // First occurrence wins, matching which line `update` rewrites
            overlay.entry(entry.key).or_insert(entry.value);
        }

        if self.source == OverlaySource::ProcessEnv {
            overlay.extend(std::env::vars_os().filter_map(|(key, value)| {
                Some((key.into_string().ok()?, value.into_string().ok()?))
            }));
        }

        debug!("Loaded {} overlay values for {:?}", overlay.len(), self.path);
        self.overlay = overlay;
        Ok(())
    }

    /// Value from the overlay snapshot; never re-reads the file
    pub fn get(&self, key: &str) -> Option<&str> {
        self.overlay.get(key).map(String::as_str)
    }

    /// Overlay value, or an empty string when unset
    pub fn get_or_empty(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    /// Overlay value, decrypting it if it carries the `enc:` prefix
    pub fn get_secret(&self, key: &str, keys: &KeyManager) -> Result<Option<SecretString>> {
        match self.get(key) {
            Some(value) => match value.strip_prefix(ENCRYPTED_PREFIX) {
                Some(encoded) => keys.decrypt_string(encoded).map(Some),
                None => Ok(Some(SecretString::new(value.to_string()))),
            },
            None => Ok(None),
        }
    }

    /// Records currently on disk, in file order
    pub fn entries(&self) -> Result<Vec<ConfigEntry>> {
        Ok(env_file::parse(&self.read_contents()?))
    }

    /// Replace the first record for `key` or append one, then write the whole
    /// file back. The overlay is left untouched.
    pub fn update(&self, key: &str, value: &str) -> Result<()> {
        self.update_all(&[(key, value)])
    }

    /// Apply several updates in one file rewrite; either all land or none do
    pub fn update_all(&self, updates: &[(&str, &str)]) -> Result<()> {
        for (key, value) in updates {
            env_file::validate_entry(key, value)?;
        }

        let mut contents = self.read_contents()?;
        for (key, value) in updates {
            contents = env_file::upsert(&contents, key, value);
        }
        write_private(&self.path, contents.as_bytes())?;

        for (key, _) in updates {
            info!("Updated {} in {:?}", key, self.path);
        }
        Ok(())
    }

    /// Encrypt `plaintext` and store it with the `enc:` prefix
    pub fn update_secret(&self, key: &str, plaintext: &str, keys: &KeyManager) -> Result<()> {
        let encoded = keys.encrypt_string(plaintext)?;
        self.update(key, &format!("{}{}", ENCRYPTED_PREFIX, encoded))
    }

    fn read_contents(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(CredentialError::storage(&self.path, e)),
        }
    }
}
