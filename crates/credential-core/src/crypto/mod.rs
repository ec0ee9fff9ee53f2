//! Cryptographic primitives for secret storage
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption
//! - The file-backed master key and its manager
//! - Secure memory handling with zeroize

mod encryption;
mod key_manager;
mod secure_memory;

pub use encryption::{decrypt, encrypt, EncryptedSecret};
pub use key_manager::KeyManager;
pub use secure_memory::{MasterKey, SecretString, KEY_LEN};
