//! Implementation of the `gistget sync` command.
//!
//! Loads a manifest from the user's gist, a URL or a local file and brings
//! the machine in line with it. With `--dry-run` only the plan is shown.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;

use gistget_lib::sync::{ManifestSource, PackageStateReconciler, SyncPlan, SyncResult};

use super::{Services, runtime};
use crate::output::{
  describe_spec, print_error, print_info, print_json, print_stat, print_success, print_warning, symbols,
};

pub fn cmd_sync(url: Option<String>, file: Option<PathBuf>, dry_run: bool, json: bool) -> Result<i32> {
  let source = match (url, file) {
    (Some(url), _) => ManifestSource::Url(url),
    (None, Some(file)) => ManifestSource::File(file),
    (None, None) => ManifestSource::Authenticated,
  };

  let services = Services::from_env()?;
  let reconciler = PackageStateReconciler::new(&services.gate, &services.store, &services.driver);
  let rt = runtime()?;

  if dry_run {
    let plan = rt
      .block_on(async {
        let manifest = reconciler.load_manifest(&source).await?;
        reconciler.plan(&manifest).await
      })
      .context("Failed to plan sync")?;

    if json {
      print_json(&plan)?;
    } else {
      print_plan(&plan);
    }
    return Ok(0);
  }

  let result = rt.block_on(reconciler.reconcile(&source)).context("Sync failed")?;

  if json {
    let mut value = serde_json::to_value(&result).context("Failed to serialize sync result")?;
    value["success"] = json!(result.is_success());
    print_json(&value)?;
  } else {
    print_result(&result);
  }

  Ok(if result.is_success() { 0 } else { 1 })
}

fn print_plan(plan: &SyncPlan) {
  if plan.is_empty() {
    print_info("Nothing to do");
    return;
  }

  for spec in &plan.to_uninstall {
    println!("  {} uninstall {}", symbols::MINUS, spec.id);
  }
  for spec in &plan.to_install {
    println!("  {} install {}", symbols::PLUS, describe_spec(spec));
  }
  for spec in &plan.pins_to_set {
    println!("  {} pin {}", symbols::TILDE, describe_spec(spec));
  }
  for spec in &plan.pins_to_clear {
    println!("  {} unpin {}", symbols::TILDE, spec.id);
  }
}

fn print_result(result: &SyncResult) {
  for spec in &result.uninstalled {
    print_success(&format!("Uninstalled {}", spec.id));
  }
  for spec in &result.installed {
    print_success(&format!("Installed {}", describe_spec(spec)));
  }
  for spec in &result.pin_updated {
    print_info(&format!("Pinned {}", describe_spec(spec)));
  }
  for spec in &result.pin_removed {
    print_info(&format!("Unpinned {}", spec.id));
  }
  for warning in &result.warnings {
    print_warning(warning);
  }
  for error in &result.errors {
    print_error(error);
  }

  if result.is_noop() {
    print_info("Already in sync");
    return;
  }

  println!();
  print_stat("Installed", &result.installed.len().to_string());
  print_stat("Uninstalled", &result.uninstalled.len().to_string());
  print_stat("Pins updated", &result.pin_updated.len().to_string());
  print_stat("Pins removed", &result.pin_removed.len().to_string());
  if !result.failed.is_empty() {
    print_stat("Failed", &result.failed.len().to_string());
  }
}
