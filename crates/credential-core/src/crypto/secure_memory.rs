//! Key and secret holders that wipe themselves on drop

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the master key in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Master encryption key - zeroed when dropped, never printed
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; KEY_LEN],
}

impl MasterKey {
    /// Draw a fresh key from the operating system CSPRNG
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Build from a slice; `None` unless it is exactly `KEY_LEN` bytes
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let key: [u8; KEY_LEN] = slice.try_into().ok()?;
        Some(Self { key })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterKey({} bytes, redacted)", KEY_LEN)
    }
}

/// Decrypted secret value (refresh tokens, client secrets) - zeroed when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Borrow the plaintext
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Consume and return the inner value
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString(redacted)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_key_from_slice() {
        let bytes = [42u8; KEY_LEN];
        let key = MasterKey::from_slice(&bytes).unwrap();
        assert_eq!(key.as_bytes(), &bytes);
    }

    #[test]
    fn test_master_key_rejects_wrong_length() {
        assert!(MasterKey::from_slice(&[42u8; 16]).is_none());
        assert!(MasterKey::from_slice(&[42u8; 44]).is_none());
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = MasterKey::generate();
        let b = MasterKey::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn test_debug_redacted() {
        let key = MasterKey::from_slice(&[7u8; KEY_LEN]).unwrap();
        let debug = format!("{:?}", key);
        assert_eq!(debug, "MasterKey(32 bytes, redacted)");

        let secret = SecretString::new("1//refresh-token".to_string());
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("refresh-token"));
    }

    #[test]
    fn test_secret_string_into_inner() {
        let secret = SecretString::from("xoxb-123".to_string());
        assert_eq!(secret.expose(), "xoxb-123");
        assert_eq!(secret.into_inner(), "xoxb-123");
    }
}
