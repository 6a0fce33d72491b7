//! Implementation of the `gistget uninstall` command.

use anyhow::{Context, Result};

use gistget_lib::manifest::InstallerAttrs;
use gistget_lib::mutate::{MutationCoordinator, UninstallRequest};

use super::{Services, report_outcome, runtime};

/// Uninstall a package and mark it `uninstall: true` in the manifest, so
/// other machines remove it on their next sync.
pub fn cmd_uninstall(id: &str, attrs: InstallerAttrs) -> Result<i32> {
  let services = Services::from_env()?;
  let coordinator = MutationCoordinator::new(&services.gate, &services.store, &services.driver);

  let outcome = runtime()?
    .block_on(coordinator.uninstall(id, &UninstallRequest { attrs }))
    .with_context(|| format!("Failed to uninstall {}", id))?;

  Ok(report_outcome("uninstall", "Uninstalled", id, &outcome))
}
