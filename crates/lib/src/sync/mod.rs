//! Bulk reconciliation of the local package state with a manifest.
//!
//! A sync run loads the manifest once, snapshots the installed packages once,
//! computes a [`SyncPlan`] and executes it in three ordered phases:
//!
//! 1. uninstall entries marked `uninstall: true` that are installed
//! 2. install declared entries that are missing
//! 3. bring pins of entries that were already installed in line
//!
//! The snapshot is not refreshed between phases, so phase 3 never touches a
//! package that phase 2 just installed. A failure on one package is recorded
//! in the [`SyncResult`] and the run moves on.

mod plan;
mod result;

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

pub use plan::{SyncPlan, compute_plan};
pub use result::SyncResult;

use crate::auth::{AuthError, CredentialGate, CredentialStore, LoginFlow};
use crate::manifest::{Manifest, ManifestError, PackageSpec, read_manifest_file};
use crate::store::{ManifestStore, StoreError};
use crate::winget::args::{install_args, pin_add_args, pin_remove_args, uninstall_args};
use crate::winget::{DriverError, PackageManager, clear_pin, invoke_best_effort};

/// Errors that prevent a sync run from starting.
///
/// Per-package failures during the run are part of the [`SyncResult`].
#[derive(Debug, Error)]
pub enum SyncError {
  #[error("manifest file not found: {}", .0.display())]
  ManifestNotFound(PathBuf),

  #[error(transparent)]
  Manifest(ManifestError),

  #[error(transparent)]
  Auth(#[from] AuthError),

  #[error(transparent)]
  Store(#[from] StoreError),

  #[error(transparent)]
  Driver(#[from] DriverError),
}

impl From<ManifestError> for SyncError {
  fn from(e: ManifestError) -> Self {
    match e {
      ManifestError::NotFound(path) => SyncError::ManifestNotFound(path),
      other => SyncError::Manifest(other),
    }
  }
}

/// Where the manifest for a sync run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
  /// The logged-in user's manifest; requires a credential.
  Authenticated,
  /// Anonymous fetch of a raw manifest.
  Url(String),
  /// Local file; no credential or network access.
  File(PathBuf),
}

impl ManifestSource {
  pub fn requires_credential(&self) -> bool {
    matches!(self, ManifestSource::Authenticated)
  }
}

pub struct PackageStateReconciler<'a, C, L, S, D> {
  gate: &'a CredentialGate<C, L>,
  store: &'a S,
  driver: &'a D,
}

impl<'a, C, L, S, D> PackageStateReconciler<'a, C, L, S, D>
where
  C: CredentialStore,
  L: LoginFlow,
  S: ManifestStore,
  D: PackageManager,
{
  pub fn new(gate: &'a CredentialGate<C, L>, store: &'a S, driver: &'a D) -> Self {
    Self { gate, store, driver }
  }

  /// Load the manifest from `source` and apply it.
  pub async fn reconcile(&self, source: &ManifestSource) -> Result<SyncResult, SyncError> {
    let manifest = self.load_manifest(source).await?;
    let plan = self.plan(&manifest).await?;
    Ok(self.execute(&plan).await)
  }

  /// Load the manifest for a run.
  ///
  /// A local file is read before anything else is touched; a missing file
  /// is [`SyncError::ManifestNotFound`].
  pub async fn load_manifest(&self, source: &ManifestSource) -> Result<Manifest, SyncError> {
    let manifest = match source {
      ManifestSource::File(path) => read_manifest_file(path)?,
      ManifestSource::Url(url) => self.store.load_from_url(url).await?,
      ManifestSource::Authenticated => {
        let credential = self.gate.ensure_credential().await?;
        self.store.load(&credential).await?
      }
    };
    info!(source = ?source, packages = manifest.len(), "manifest loaded");
    Ok(manifest)
  }

  /// Snapshot the local state and diff it against `manifest`.
  pub async fn plan(&self, manifest: &Manifest) -> Result<SyncPlan, SyncError> {
    let installed = self.driver.list_installed().await?;
    let pins = match self.driver.list_pins().await {
      Ok(pins) => pins,
      Err(e) => {
        warn!(error = %e, "could not list local pins, re-applying all");
        None
      }
    };

    let plan = compute_plan(manifest, &installed, pins.as_deref());
    debug!(
      uninstall = plan.to_uninstall.len(),
      install = plan.to_install.len(),
      pin = plan.pins_to_set.len(),
      unpin = plan.pins_to_clear.len(),
      "computed sync plan"
    );
    Ok(plan)
  }

  /// Execute a plan. Never fails as a whole; see [`SyncResult`].
  pub async fn execute(&self, plan: &SyncPlan) -> SyncResult {
    let mut result = SyncResult::default();

    for spec in &plan.to_uninstall {
      self.uninstall(spec, &mut result).await;
    }
    for spec in &plan.to_install {
      self.install(spec, &mut result).await;
    }
    for spec in &plan.pins_to_set {
      self.apply_pin(spec, &mut result).await;
    }
    for spec in &plan.pins_to_clear {
      self.remove_pin(spec, &mut result).await;
    }

    info!(
      installed = result.installed.len(),
      uninstalled = result.uninstalled.len(),
      pin_updated = result.pin_updated.len(),
      pin_removed = result.pin_removed.len(),
      failed = result.failed.len(),
      "sync finished"
    );
    result
  }

  async fn uninstall(&self, spec: &PackageSpec, result: &mut SyncResult) {
    info!(id = %spec.id, "uninstalling package");
    match self.driver.invoke(&uninstall_args(&spec.id, &spec.attrs)).await {
      Ok(0) => {
        result.uninstalled.push(spec.clone());
        result.warnings.extend(clear_pin(self.driver, &spec.id).await);
      }
      Ok(code) => {
        warn!(id = %spec.id, code, "uninstall failed");
        result.record_failure(spec, format!("uninstall {} exited with code {}", spec.id, code));
      }
      Err(e) => {
        warn!(id = %spec.id, error = %e, "uninstall failed");
        result.record_failure(spec, format!("uninstall {} failed: {}", spec.id, e));
      }
    }
  }

  async fn install(&self, spec: &PackageSpec, result: &mut SyncResult) {
    let version = spec.pin().or(spec.version.as_deref()).filter(|v| !v.is_empty());

    info!(id = %spec.id, version = ?version, "installing package");
    match self.driver.invoke(&install_args(&spec.id, version, &spec.attrs)).await {
      Ok(0) => {
        result.installed.push(spec.clone());
        if let Some(pin) = spec.pin() {
          let args = pin_add_args(&spec.id, pin, spec.pin_type, false);
          result
            .warnings
            .extend(invoke_best_effort(self.driver, "pin add", &spec.id, &args).await);
        }
      }
      Ok(code) => {
        warn!(id = %spec.id, code, "install failed");
        result.record_failure(spec, format!("install {} exited with code {}", spec.id, code));
      }
      Err(e) => {
        warn!(id = %spec.id, error = %e, "install failed");
        result.record_failure(spec, format!("install {} failed: {}", spec.id, e));
      }
    }
  }

  async fn apply_pin(&self, spec: &PackageSpec, result: &mut SyncResult) {
    let Some(pin) = spec.pin() else {
      return;
    };

    debug!(id = %spec.id, pin = %pin, "syncing pin");
    match self.driver.invoke(&pin_add_args(&spec.id, pin, spec.pin_type, true)).await {
      Ok(0) => result.pin_updated.push(spec.clone()),
      Ok(code) => {
        warn!(id = %spec.id, code, "pin add failed");
        result
          .warnings
          .push(format!("pin add for {} failed with exit code {}", spec.id, code));
      }
      Err(e) => {
        warn!(id = %spec.id, error = %e, "pin add failed");
        result.errors.push(format!("pin add for {} failed: {}", spec.id, e));
      }
    }
  }

  async fn remove_pin(&self, spec: &PackageSpec, result: &mut SyncResult) {
    debug!(id = %spec.id, "clearing pin");
    match self.driver.invoke(&pin_remove_args(&spec.id)).await {
      Ok(0) => result.pin_removed.push(spec.clone()),
      // no pin to remove
      Ok(code) => debug!(id = %spec.id, code, "no local pin removed"),
      Err(e) => {
        warn!(id = %spec.id, error = %e, "pin remove failed");
        result.errors.push(format!("pin remove for {} failed: {}", spec.id, e));
      }
    }
  }
}
