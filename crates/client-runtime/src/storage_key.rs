//! # Device Storage Key
//!
//! The key that seals delegated session keys before they are persisted. It is
//! created once per device and kept hex-encoded next to the session file.

use shared_crypto::SecretKey;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Storage key file errors.
#[derive(Debug, Error)]
pub enum StorageKeyError {
    /// Reading or writing the key file failed.
    #[error("storage key file: {0}")]
    Io(#[from] io::Error),

    /// The file does not hold 32 hex-encoded bytes.
    #[error("storage key file is malformed: {0}")]
    Malformed(String),
}

/// Read the key at `path`, creating it on first use.
///
/// # Errors
/// * `StorageKeyError::Io` - the file or its directory is not accessible
/// * `StorageKeyError::Malformed` - existing content is not a key
pub fn load_or_create(path: &Path) -> Result<SecretKey, StorageKeyError> {
    match fs::read_to_string(path) {
        Ok(content) => parse(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let key = SecretKey::generate();
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(path, hex::encode(key.as_bytes()))?;
            restrict_permissions(path)?;
            info!(path = %path.display(), "[runtime] Created device storage key");
            Ok(key)
        }
        Err(e) => Err(e.into()),
    }
}

fn parse(content: &str) -> Result<SecretKey, StorageKeyError> {
    let bytes = hex::decode(content.trim()).map_err(|e| StorageKeyError::Malformed(e.to_string()))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| StorageKeyError::Malformed(format!("expected 32 bytes, got {}", b.len())))?;
    Ok(SecretKey::from_bytes(bytes))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
