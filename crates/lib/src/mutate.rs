//! Single-package mutations that keep the manifest in step with the machine.
//!
//! Every mutation follows the same shape: obtain a credential, load the
//! manifest, run the primary package-manager command, and write the manifest
//! back only if that command exited zero. A manifest entry therefore never
//! records a change that did not happen locally.
//!
//! Follow-up commands (pinning after an install, unpinning after an
//! uninstall) are best-effort. Their failures are reported through
//! [`MutationOutcome::warnings`] and never undo the primary change.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::{AuthError, CredentialGate, CredentialStore, LoginFlow};
use crate::manifest::{InstallerAttrs, PackageSpec, PinType};
use crate::resolve::{needs_installed_version, resolve_install, resolve_upgrade};
use crate::store::{ManifestStore, StoreError};
use crate::winget::args::{install_args, pin_add_args, pin_remove_args, uninstall_args, upgrade_args};
use crate::winget::{DriverError, PackageManager, clear_pin, invoke_best_effort};

/// Errors that abort a mutation before its outcome is known.
///
/// A package-manager command that runs and fails is not an error; it is an
/// outcome with a non-zero [`MutationOutcome::exit_code`].
#[derive(Debug, Error)]
pub enum MutateError {
  #[error("package identifier must not be empty")]
  EmptyIdentifier,

  #[error("pin version must not be empty")]
  EmptyPinVersion,

  #[error(transparent)]
  Auth(#[from] AuthError),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Driver(#[from] DriverError),
}

/// What a mutation did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
  /// Exit code of the primary command; 0 on success.
  pub exit_code: i32,
  pub manifest_written: bool,
  /// Failures of best-effort follow-up commands.
  pub warnings: Vec<String>,
}

impl MutationOutcome {
  fn aborted(exit_code: i32) -> Self {
    Self {
      exit_code,
      ..Default::default()
    }
  }

  fn completed(manifest_written: bool, warnings: Vec<String>) -> Self {
    Self {
      exit_code: 0,
      manifest_written,
      warnings,
    }
  }

  pub fn is_success(&self) -> bool {
    self.exit_code == 0
  }
}

#[derive(Debug, Default, Clone)]
pub struct InstallRequest {
  /// Explicit version; `None` installs the pinned or latest version.
  pub version: Option<String>,
  pub attrs: InstallerAttrs,
}

#[derive(Debug, Default, Clone)]
pub struct UninstallRequest {
  pub attrs: InstallerAttrs,
}

#[derive(Debug, Default, Clone)]
pub struct UpgradeRequest {
  pub version: Option<String>,
  /// Only explicitly supplied values replace the stored ones.
  pub attrs: InstallerAttrs,
}

#[derive(Debug, Clone)]
pub struct PinRequest {
  pub version: String,
  /// Overrides the stored pin type when set.
  pub pin_type: Option<PinType>,
  /// Replace an existing local pin.
  pub force: bool,
}

fn checked_id(id: &str) -> Result<&str, MutateError> {
  let id = id.trim();
  if id.is_empty() {
    return Err(MutateError::EmptyIdentifier);
  }
  Ok(id)
}

/// Coordinates one user-invoked mutation across the credential gate, the
/// manifest store and the package manager.
pub struct MutationCoordinator<'a, C, L, S, D> {
  gate: &'a CredentialGate<C, L>,
  store: &'a S,
  driver: &'a D,
}

impl<'a, C, L, S, D> MutationCoordinator<'a, C, L, S, D>
where
  C: CredentialStore,
  L: LoginFlow,
  S: ManifestStore,
  D: PackageManager,
{
  pub fn new(gate: &'a CredentialGate<C, L>, store: &'a S, driver: &'a D) -> Self {
    Self { gate, store, driver }
  }

  /// Install a package and record it in the manifest.
  ///
  /// A stored pin decides the version unless one is given explicitly; an
  /// explicit version moves an existing pin but never creates one.
  pub async fn install(&self, id: &str, request: &InstallRequest) -> Result<MutationOutcome, MutateError> {
    let id = checked_id(id)?;
    let credential = self.gate.ensure_credential().await?;
    let mut manifest = self.store.load(&credential).await?;

    let existing = manifest.get(id);
    let resolution = resolve_install(request.version.as_deref(), existing);
    // the entry is replaced, so stored installer options do not carry over
    let attrs = request.attrs.clone();

    info!(id = %id, version = ?resolution.version_to_apply, "installing package");
    let code = self
      .driver
      .invoke(&install_args(id, resolution.version_to_apply.as_deref(), &attrs))
      .await?;
    if code != 0 {
      warn!(id = %id, code, "install failed, manifest unchanged");
      return Ok(MutationOutcome::aborted(code));
    }

    let mut warnings = Vec::new();
    if let Some(pin) = &resolution.pin_to_persist {
      let args = pin_add_args(id, pin, resolution.pin_type_to_persist, false);
      warnings.extend(invoke_best_effort(self.driver, "pin add", id, &args).await);
    }

    manifest.insert(PackageSpec {
      id: id.to_string(),
      version: resolution.pin_to_persist.clone(),
      pin: resolution.pin_to_persist,
      pin_type: resolution.pin_type_to_persist,
      uninstall: None,
      attrs,
    });
    self.store.save(&credential, &manifest).await?;
    info!(id = %id, "manifest updated");

    Ok(MutationOutcome::completed(true, warnings))
  }

  /// Uninstall a package and mark it as uninstalled in the manifest.
  ///
  /// The entry keeps its installer attributes; version and pin fields are
  /// cleared.
  pub async fn uninstall(&self, id: &str, request: &UninstallRequest) -> Result<MutationOutcome, MutateError> {
    let id = checked_id(id)?;
    let credential = self.gate.ensure_credential().await?;
    let mut manifest = self.store.load(&credential).await?;

    let existing = manifest.get(id).cloned().unwrap_or_else(|| PackageSpec::new(id));
    let attrs = existing.attrs.overlay(&request.attrs);

    info!(id = %id, "uninstalling package");
    let code = self.driver.invoke(&uninstall_args(id, &attrs)).await?;
    if code != 0 {
      warn!(id = %id, code, "uninstall failed, manifest unchanged");
      return Ok(MutationOutcome::aborted(code));
    }

    let warnings: Vec<String> = clear_pin(self.driver, id).await.into_iter().collect();

    manifest.insert(PackageSpec {
      id: id.to_string(),
      version: None,
      pin: None,
      pin_type: None,
      uninstall: Some(true),
      ..existing
    });
    self.store.save(&credential, &manifest).await?;
    info!(id = %id, "manifest updated");

    Ok(MutationOutcome::completed(true, warnings))
  }

  /// Upgrade a package, re-pinning it if it was pinned.
  ///
  /// The manifest is only loaded once the upgrade succeeded. An already
  /// tracked, unpinned package is left as it is in the manifest.
  pub async fn upgrade(&self, id: &str, request: &UpgradeRequest) -> Result<MutationOutcome, MutateError> {
    let id = checked_id(id)?;
    let credential = self.gate.ensure_credential().await?;

    info!(id = %id, version = ?request.version, "upgrading package");
    let code = self
      .driver
      .invoke(&upgrade_args(id, request.version.as_deref(), &request.attrs))
      .await?;
    if code != 0 {
      warn!(id = %id, code, "upgrade failed, manifest not loaded");
      return Ok(MutationOutcome::aborted(code));
    }

    let mut manifest = self.store.load(&credential).await?;
    let existing = manifest.get(id).cloned();

    let installed_after = if needs_installed_version(request.version.as_deref(), existing.as_ref()) {
      self.installed_version(id).await
    } else {
      None
    };
    let resolution = resolve_upgrade(request.version.as_deref(), existing.as_ref(), installed_after.as_deref());

    let should_update = existing
      .as_ref()
      .is_none_or(|e| e.is_uninstall() || e.has_pin());
    if !should_update {
      debug!(id = %id, "tracked and unpinned, manifest unchanged");
      return Ok(MutationOutcome::completed(false, Vec::new()));
    }

    let mut warnings = Vec::new();
    if let Some(pin) = &resolution.pin_to_persist {
      let args = pin_add_args(id, pin, resolution.pin_type_to_persist, true);
      warnings.extend(invoke_best_effort(self.driver, "pin add", id, &args).await);
    }

    let base = existing.unwrap_or_else(|| PackageSpec::new(id));
    manifest.insert(PackageSpec {
      id: id.to_string(),
      version: resolution.pin_to_persist.clone(),
      pin: resolution.pin_to_persist,
      pin_type: resolution.pin_type_to_persist,
      uninstall: None,
      attrs: base.attrs.overlay(&request.attrs),
    });
    self.store.save(&credential, &manifest).await?;
    info!(id = %id, "manifest updated");

    Ok(MutationOutcome::completed(true, warnings))
  }

  /// Pin a package locally and record the pin.
  pub async fn pin_add(&self, id: &str, request: &PinRequest) -> Result<MutationOutcome, MutateError> {
    let id = checked_id(id)?;
    if request.version.trim().is_empty() {
      return Err(MutateError::EmptyPinVersion);
    }
    let credential = self.gate.ensure_credential().await?;
    let mut manifest = self.store.load(&credential).await?;

    let base = manifest.get(id).cloned().unwrap_or_else(|| PackageSpec::new(id));
    let pin_type = request.pin_type.or(base.pin_type);

    info!(id = %id, version = %request.version, pin_type = ?pin_type, "adding pin");
    let code = self
      .driver
      .invoke(&pin_add_args(id, &request.version, pin_type, request.force))
      .await?;
    if code != 0 {
      warn!(id = %id, code, "pin add failed, manifest unchanged");
      return Ok(MutationOutcome::aborted(code));
    }

    manifest.insert(PackageSpec {
      id: id.to_string(),
      version: Some(request.version.clone()),
      pin: Some(request.version.clone()),
      pin_type,
      ..base
    });
    self.store.save(&credential, &manifest).await?;

    Ok(MutationOutcome::completed(true, Vec::new()))
  }

  /// Remove a local pin and clear it from the manifest entry, if any.
  pub async fn pin_remove(&self, id: &str) -> Result<MutationOutcome, MutateError> {
    let id = checked_id(id)?;
    let credential = self.gate.ensure_credential().await?;
    let mut manifest = self.store.load(&credential).await?;

    info!(id = %id, "removing pin");
    let code = self.driver.invoke(&pin_remove_args(id)).await?;
    if code != 0 {
      warn!(id = %id, code, "pin remove failed, manifest unchanged");
      return Ok(MutationOutcome::aborted(code));
    }

    let Some(existing) = manifest.get(id).cloned() else {
      debug!(id = %id, "not in manifest, nothing to record");
      return Ok(MutationOutcome::completed(false, Vec::new()));
    };

    manifest.insert(PackageSpec {
      version: None,
      pin: None,
      pin_type: None,
      ..existing
    });
    self.store.save(&credential, &manifest).await?;

    Ok(MutationOutcome::completed(true, Vec::new()))
  }

  /// Version installed after an upgrade; `None` if it cannot be determined.
  async fn installed_version(&self, id: &str) -> Option<String> {
    match self.driver.find_by_id(id).await {
      Ok(found) => found.map(|p| p.version).filter(|v| !v.is_empty()),
      Err(e) => {
        warn!(id = %id, error = %e, "could not read installed version, keeping previous pin");
        None
      }
    }
  }
}
