//! Service account key material: validation, restricted storage, scoping

mod types;
mod validator;

pub use types::{ScopedCredential, ServiceAccountKey, REQUIRED_FIELDS};
pub use validator::{
    parse_key_material, ServiceAccountValidator, SERVICE_ACCOUNT_FILE_KEY, USE_SERVICE_ACCOUNT_KEY,
};
