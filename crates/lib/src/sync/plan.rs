//! Diff between the declared manifest and the local package state.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::manifest::{Manifest, PackageSpec, PinType, package_key};
use crate::winget::{InstalledPackage, LocalPin};

/// What a sync run will do, phase by phase.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
  /// Marked for removal and currently installed.
  pub to_uninstall: Vec<PackageSpec>,
  /// Declared and not installed.
  pub to_install: Vec<PackageSpec>,
  /// Installed before the run, pinned in the manifest.
  pub pins_to_set: Vec<PackageSpec>,
  /// Installed before the run, unpinned in the manifest.
  pub pins_to_clear: Vec<PackageSpec>,
}

impl SyncPlan {
  pub fn is_empty(&self) -> bool {
    self.to_uninstall.is_empty()
      && self.to_install.is_empty()
      && self.pins_to_set.is_empty()
      && self.pins_to_clear.is_empty()
  }
}

/// Compute the plan for `manifest` against the installed snapshot.
///
/// `pins` is the local pin table when the package manager can report it.
/// With it, pins that already match are left out of the plan; without it
/// every pinned entry gets its pin re-applied. Unpinned entries always get a
/// `pin remove`, since a row missing from the table may only be misparsed.
///
/// # Diff Logic
///
/// - `uninstall: true` and installed → `to_uninstall`
/// - `uninstall: true` and not installed → nothing
/// - not installed → `to_install`
/// - installed and pinned → `pins_to_set`, unless the known local pin matches
/// - installed and unpinned → `pins_to_clear`
pub fn compute_plan(manifest: &Manifest, installed: &[InstalledPackage], pins: Option<&[LocalPin]>) -> SyncPlan {
  let installed: HashSet<String> = installed.iter().map(|p| package_key(&p.id)).collect();
  let pins: Option<HashMap<String, &LocalPin>> =
    pins.map(|pins| pins.iter().map(|p| (package_key(&p.id), p)).collect());

  let mut plan = SyncPlan::default();

  for spec in manifest.iter() {
    let key = spec.key();
    let is_installed = installed.contains(&key);

    if spec.is_uninstall() {
      if is_installed {
        plan.to_uninstall.push(spec.clone());
      }
      continue;
    }

    if !is_installed {
      plan.to_install.push(spec.clone());
      continue;
    }

    if !spec.has_pin() {
      plan.pins_to_clear.push(spec.clone());
      continue;
    }
    let local = pins.as_ref().and_then(|pins| pins.get(&key).copied());
    if !local.is_some_and(|local| pin_matches(spec, local)) {
      plan.pins_to_set.push(spec.clone());
    }
  }

  plan
}

fn pin_matches(spec: &PackageSpec, local: &LocalPin) -> bool {
  local.version.as_deref() == spec.pin() && local.blocking == (spec.pin_type == Some(PinType::Blocking))
}
