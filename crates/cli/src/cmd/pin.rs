//! Implementation of the `gistget pin` commands.

use anyhow::{Context, Result};

use gistget_lib::manifest::PinType;
use gistget_lib::mutate::{MutationCoordinator, PinRequest};

use super::{Services, report_outcome, runtime};

/// Pin a package locally and record the pin in the manifest.
pub fn cmd_pin_add(id: &str, version: String, pin_type: Option<PinType>, force: bool) -> Result<i32> {
  let services = Services::from_env()?;
  let coordinator = MutationCoordinator::new(&services.gate, &services.store, &services.driver);
  let request = PinRequest {
    version,
    pin_type,
    force,
  };

  let outcome = runtime()?
    .block_on(coordinator.pin_add(id, &request))
    .with_context(|| format!("Failed to pin {}", id))?;

  Ok(report_outcome("pin add", "Pinned", id, &outcome))
}

/// Remove a local pin and clear it from the manifest.
pub fn cmd_pin_remove(id: &str) -> Result<i32> {
  let services = Services::from_env()?;
  let coordinator = MutationCoordinator::new(&services.gate, &services.store, &services.driver);

  let outcome = runtime()?
    .block_on(coordinator.pin_remove(id))
    .with_context(|| format!("Failed to unpin {}", id))?;

  Ok(report_outcome("pin remove", "Unpinned", id, &outcome))
}
