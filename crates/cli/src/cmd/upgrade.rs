//! Implementation of the `gistget upgrade` command.

use anyhow::{Context, Result};

use gistget_lib::manifest::InstallerAttrs;
use gistget_lib::mutate::{MutationCoordinator, UpgradeRequest};

use super::{Services, report_outcome, runtime};

pub fn cmd_upgrade(id: &str, version: Option<String>, attrs: InstallerAttrs) -> Result<i32> {
  let services = Services::from_env()?;
  let coordinator = MutationCoordinator::new(&services.gate, &services.store, &services.driver);
  let request = UpgradeRequest { version, attrs };

  let outcome = runtime()?
    .block_on(coordinator.upgrade(id, &request))
    .with_context(|| format!("Failed to upgrade {}", id))?;

  Ok(report_outcome("upgrade", "Upgraded", id, &outcome))
}
