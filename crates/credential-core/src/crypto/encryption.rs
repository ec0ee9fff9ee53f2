//! AES-256-GCM authenticated encryption
//!
//! Encoded form: standard base64 of `nonce ‖ ciphertext ‖ tag`
//! - Nonce: 12 bytes (96 bits), drawn fresh per call
//! - Ciphertext: same length as the plaintext
//! - Auth tag: 16 bytes (128 bits)

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use super::MasterKey;
use crate::error::{CredentialError, Result};

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// One encrypted secret value, safe to store as text once encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedSecret {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

impl std::fmt::Display for EncryptedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut raw = Vec::with_capacity(NONCE_LEN + self.ciphertext.len() + TAG_LEN);
        raw.extend_from_slice(&self.nonce);
        raw.extend_from_slice(&self.ciphertext);
        raw.extend_from_slice(&self.tag);
        f.write_str(&STANDARD.encode(raw))
    }
}

impl EncryptedSecret {
    /// Parse the base64 form produced by `Display`.
    ///
    /// A token that cannot be decoded is treated as corrupted data.
    pub fn from_encoded(encoded: &str) -> Result<Self> {
        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CredentialError::IntegrityError(format!("Invalid base64: {}", e)))?;

        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(CredentialError::IntegrityError(format!(
                "Encrypted value too short: {} bytes",
                raw.len()
            )));
        }

        let tag_start = raw.len() - TAG_LEN;
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&raw[..NONCE_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&raw[tag_start..]);

        Ok(Self {
            nonce,
            ciphertext: raw[NONCE_LEN..tag_start].to_vec(),
            tag,
        })
    }
}

/// Encrypt plaintext under `key` with a freshly drawn nonce
pub fn encrypt(plaintext: &[u8], key: &MasterKey) -> Result<EncryptedSecret> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CredentialError::StorageError(format!("Invalid master key: {}", e)))?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    // aes-gcm appends the tag to the ciphertext
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CredentialError::StorageError(format!("Encryption failed: {}", e)))?;

    let tag_start = sealed.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&sealed[tag_start..]);

    Ok(EncryptedSecret {
        nonce,
        ciphertext: sealed[..tag_start].to_vec(),
        tag,
    })
}

/// Decrypt and authenticate. Any tag mismatch is an `IntegrityError`; no
/// partial plaintext is ever returned.
pub fn decrypt(secret: &EncryptedSecret, key: &MasterKey) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CredentialError::StorageError(format!("Invalid master key: {}", e)))?;

    let mut sealed = Vec::with_capacity(secret.ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(&secret.ciphertext);
    sealed.extend_from_slice(&secret.tag);

    cipher
        .decrypt(Nonce::from_slice(&secret.nonce), sealed.as_slice())
        .map_err(|_| {
            CredentialError::IntegrityError(
                "authentication tag mismatch (wrong key, corrupted or tampered value)"
                    .to_string(),
            )
        })
}
