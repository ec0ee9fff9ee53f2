//! Owner-only file writes

use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::error::{CredentialError, Result};

/// Replace `path` with `contents` in one operation.
///
/// Writes a sibling temp file with owner-only permission (0600 on unix) and
/// renames it over the target, so readers see either the old or the new
/// file, never a partial one.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CredentialError::storage(parent, e))?;
    }

    let temp_path = path.with_extension("tmp");
    // A stale temp file from an interrupted write would keep its old mode.
    if temp_path.exists() {
        fs::remove_file(&temp_path).map_err(|e| CredentialError::storage(&temp_path, e))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(&temp_path)
        .map_err(|e| CredentialError::storage(&temp_path, e))?;
    file.write_all(contents)
        .and_then(|_| file.sync_all())
        .map_err(|e| CredentialError::storage(&temp_path, e))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| CredentialError::storage(path, e))?;
    restrict_permissions(path)?;

    debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

/// Force owner-only permission on an existing file
pub fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| CredentialError::storage(path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
