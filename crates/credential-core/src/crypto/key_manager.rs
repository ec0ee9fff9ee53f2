//! Master key lifecycle
//!
//! The key lives in a single file next to the config. It is created on first
//! use and reused forever after: regenerating it would make every stored
//! secret permanently undecryptable, so an existing but unusable key file is
//! an error rather than a reason to start over.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use super::encryption::{decrypt, encrypt, EncryptedSecret};
use super::secure_memory::{MasterKey, SecretString, KEY_LEN};
use crate::error::{CredentialError, Result};

/// Owns the master key and performs all secret encryption
#[derive(Debug)]
pub struct KeyManager {
    /// Backing file; `None` for an in-memory key
    key_path: Option<PathBuf>,
    key: OnceLock<MasterKey>,
}

impl KeyManager {
    /// Manager backed by the key file at `key_path` (created lazily)
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: Some(key_path.into()),
            key: OnceLock::new(),
        }
    }

    /// Manager around an already loaded key; nothing touches the filesystem
    pub fn with_key(key: MasterKey) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(key);
        Self {
            key_path: None,
            key: cell,
        }
    }

    pub fn key_path(&self) -> Option<&Path> {
        self.key_path.as_deref()
    }

    /// Load the key file, or generate and persist a key if none exists
    pub fn get_or_create_key(&self) -> Result<&MasterKey> {
        if let Some(key) = self.key.get() {
            return Ok(key);
        }

        let path = self.key_path.as_deref().ok_or_else(|| {
            CredentialError::StorageError("Key manager has neither a key nor a key file".to_string())
        })?;

        let key = load_or_create(path)?;
        Ok(self.key.get_or_init(|| key))
    }

    /// Encrypt with a fresh nonce
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedSecret> {
        encrypt(plaintext, self.get_or_create_key()?)
    }

    /// Decrypt, failing with `IntegrityError` if authentication fails
    pub fn decrypt(&self, secret: &EncryptedSecret) -> Result<Vec<u8>> {
        decrypt(secret, self.get_or_create_key()?)
    }

    /// Encrypt a string and return its text-safe encoding
    pub fn encrypt_string(&self, plaintext: &str) -> Result<String> {
        Ok(self.encrypt(plaintext.as_bytes())?.to_string())
    }

    /// Decrypt an encoded value produced by `encrypt_string`
    pub fn decrypt_string(&self, encoded: &str) -> Result<SecretString> {
        let secret = EncryptedSecret::from_encoded(encoded)?;
        let plaintext = self.decrypt(&secret)?;
        String::from_utf8(plaintext)
            .map(SecretString::new)
            .map_err(|e| CredentialError::IntegrityError(format!("Invalid UTF-8: {}", e)))
    }
}

fn load_or_create(path: &Path) -> Result<MasterKey> {
    if path.exists() {
        return read_key(path);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| creation_error(parent, e))?;
    }

    let key = MasterKey::generate();
    let tmp_path = temp_path(path);

    let published = write_temp(&tmp_path, &key).and_then(|_| fs::hard_link(&tmp_path, path));
    let _ = fs::remove_file(&tmp_path);

    match published {
        Ok(()) => {
            info!("Created new master key at {:?}", path);
            Ok(key)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            // Another creator won the race; theirs is the key now.
            debug!("Master key appeared concurrently at {:?}", path);
            read_key(path)
        }
        Err(e) => Err(creation_error(path, e)),
    }
}

/// Sibling temp file, unique per process and attempt
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.{:016x}.tmp", std::process::id(), rand::random::<u64>()));
    path.with_file_name(name)
}

fn write_temp(tmp_path: &Path, key: &MasterKey) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(tmp_path)?;
    file.write_all(key.as_bytes())?;
    file.sync_all()
}

/// Permission problems are fatal; anything else is an ordinary storage error
fn creation_error(path: &Path, err: std::io::Error) -> CredentialError {
    if err.kind() == ErrorKind::PermissionDenied {
        CredentialError::KeyCreationError {
            path: path.to_path_buf(),
            source: err,
        }
    } else {
        CredentialError::storage(path, err)
    }
}

fn read_key(path: &Path) -> Result<MasterKey> {
    let bytes = fs::read(path).map_err(|e| CredentialError::storage(path, e))?;
    let key = MasterKey::from_slice(&bytes).ok_or_else(|| {
        CredentialError::StorageError(format!(
            "Master key file {} holds {} bytes, expected {}; refusing to replace it",
            path.display(),
            bytes.len(),
            KEY_LEN
        ))
    })?;
    debug!("Loaded master key from {:?}", path);
    Ok(key)
}
