//! Implementation of the `gistget export` command.

use std::path::Path;

use anyhow::{Context, Result};

use gistget_lib::manifest::write_manifest_file;
use gistget_lib::transfer::export_installed;

use super::{Services, runtime};
use crate::output::print_success;

/// Write a manifest listing every installed package to `output`, or to
/// stdout when no path is given.
pub fn cmd_export(output: Option<&Path>) -> Result<i32> {
  let services = Services::from_env()?;
  let manifest = runtime()?
    .block_on(export_installed(&services.driver))
    .context("Failed to list installed packages")?;

  match output {
    Some(path) => {
      write_manifest_file(path, &manifest).with_context(|| format!("Failed to write {}", path.display()))?;
      print_success(&format!("Exported {} packages to {}", manifest.len(), path.display()));
    }
    None => {
      let yaml = manifest.to_yaml().context("Failed to serialize manifest")?;
      print!("{}", yaml);
    }
  }

  Ok(0)
}
