//! Credential persistence in a local JSON file.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use super::{AuthError, Credential, CredentialStore};

/// Stores the credential as JSON, readable only by the current user on Unix.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
  path: PathBuf,
}

impl FileCredentialStore {
  pub fn new(path: PathBuf) -> Self {
    Self { path }
  }

  pub fn path(&self) -> &PathBuf {
    &self.path
  }
}

impl CredentialStore for FileCredentialStore {
  fn try_get(&self) -> Result<Option<Credential>, AuthError> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(AuthError::Storage(e)),
    };

    let credential: Credential = serde_json::from_str(&content)?;
    if credential.username.is_empty() || credential.token.is_empty() {
      return Ok(None);
    }
    Ok(Some(credential))
  }

  fn save(&self, credential: &Credential) -> Result<(), AuthError> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent)?;
    }

    let temp_path = self.path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(credential)?;
    fs::write(&temp_path, content)?;
    restrict_permissions(&temp_path)?;
    fs::rename(&temp_path, &self.path)?;

    debug!(path = %self.path.display(), "stored credential");
    Ok(())
  }

  fn delete(&self) -> Result<bool, AuthError> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(true),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(AuthError::Storage(e)),
    }
  }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> io::Result<()> {
  Ok(())
}
