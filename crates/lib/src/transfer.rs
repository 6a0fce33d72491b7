//! Moving whole manifests in and out.
//!
//! Export turns the local installed set into a manifest; import replaces the
//! user's stored manifest with a local file.

use std::path::Path;

use tracing::info;

use crate::auth::{CredentialGate, CredentialStore, LoginFlow};
use crate::manifest::{Manifest, PackageSpec, read_manifest_file};
use crate::store::ManifestStore;
use crate::sync::SyncError;
use crate::winget::PackageManager;

/// Build a manifest declaring every installed package, without pins.
pub async fn export_installed<D: PackageManager>(driver: &D) -> Result<Manifest, SyncError> {
  let installed = driver.list_installed().await?;
  let manifest: Manifest = installed.into_iter().map(|p| PackageSpec::new(p.id)).collect();
  info!(packages = manifest.len(), "exported installed packages");
  Ok(manifest)
}

/// Overwrite the stored manifest with the one at `path`.
///
/// The file is read before a credential is requested, so a missing file fails
/// with [`SyncError::ManifestNotFound`] without any login.
pub async fn import_manifest<C, L, S>(
  gate: &CredentialGate<C, L>,
  store: &S,
  path: &Path,
) -> Result<Manifest, SyncError>
where
  C: CredentialStore,
  L: LoginFlow,
  S: ManifestStore,
{
  let manifest = read_manifest_file(path)?;
  let credential = gate.ensure_credential().await?;
  store.save(&credential, &manifest).await?;
  info!(path = %path.display(), packages = manifest.len(), "imported manifest");
  Ok(manifest)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::auth::Credential;
  use crate::manifest::write_manifest_file;
  use crate::util::testutil::{FakeDriver, FakeLogin, MemoryCredentialStore, MemoryStore};
  use tempfile::TempDir;

  #[tokio::test]
  async fn export_lists_installed_ids_only() {
    let driver = FakeDriver::new().installed("Git.Git", "2.43.0").installed("Foo.Bar", "1.0.0");

    let manifest = export_installed(&driver).await.unwrap();

    assert_eq!(manifest.len(), 2);
    let git = manifest.get("git.git").unwrap();
    assert_eq!(git.id, "Git.Git");
    assert_eq!(git.version, None);
    assert!(!git.has_pin());
  }

  #[tokio::test]
  async fn import_replaces_stored_manifest() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("GistGet.yaml");
    let local: Manifest = [PackageSpec::new("New.Tool")].into_iter().collect();
    write_manifest_file(&path, &local).unwrap();

    let gate = CredentialGate::new(
      MemoryCredentialStore::with(Credential::new("octocat", "t0ken")),
      FakeLogin::failing(),
    );
    let store = MemoryStore::with([PackageSpec::new("Old.Tool")].into_iter().collect());

    import_manifest(&gate, &store, &path).await.unwrap();

    assert_eq!(store.manifest(), local);
    assert_eq!(store.saves(), 1);
  }

  #[tokio::test]
  async fn import_missing_file_does_not_log_in() {
    let temp = TempDir::new().unwrap();
    let login = FakeLogin::failing();
    let gate = CredentialGate::new(MemoryCredentialStore::empty(), login.clone());
    let store = MemoryStore::new();

    let result = import_manifest(&gate, &store, &temp.path().join("missing.yaml")).await;

    assert!(matches!(result, Err(SyncError::ManifestNotFound(_))));
    assert_eq!(login.calls(), 0);
    assert_eq!(store.saves(), 0);
  }
}
