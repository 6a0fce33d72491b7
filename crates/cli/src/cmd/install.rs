//! Implementation of the `gistget install` command.

use anyhow::{Context, Result};

use gistget_lib::manifest::InstallerAttrs;
use gistget_lib::mutate::{InstallRequest, MutationCoordinator};

use super::{Services, report_outcome, runtime};

/// Install a package and record it in the manifest.
///
/// Returns winget's exit code when the install fails; the manifest is only
/// written after a successful install.
pub fn cmd_install(id: &str, version: Option<String>, attrs: InstallerAttrs) -> Result<i32> {
  let services = Services::from_env()?;
  let coordinator = MutationCoordinator::new(&services.gate, &services.store, &services.driver);
  let request = InstallRequest { version, attrs };

  let outcome = runtime()?
    .block_on(coordinator.install(id, &request))
    .with_context(|| format!("Failed to install {}", id))?;

  Ok(report_outcome("install", "Installed", id, &outcome))
}
