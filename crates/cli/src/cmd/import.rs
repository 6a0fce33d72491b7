//! Implementation of the `gistget import` command.

use std::path::Path;

use anyhow::{Context, Result};

use gistget_lib::transfer::import_manifest;

use super::{Services, runtime};
use crate::output::print_success;
use crate::prompts::confirm;

/// Replace the stored manifest with a local file, after confirmation.
pub fn cmd_import(path: &Path, force: bool) -> Result<i32> {
  let question = format!("Replace the stored manifest with {}?", path.display());
  if !confirm(&question, force)? {
    return Ok(1);
  }

  let services = Services::from_env()?;
  let manifest = runtime()?
    .block_on(import_manifest(&services.gate, &services.store, path))
    .with_context(|| format!("Failed to import {}", path.display()))?;

  print_success(&format!("Imported {} packages", manifest.len()));
  Ok(0)
}
