//! Outcome of a sync run.

use serde::Serialize;

use crate::manifest::PackageSpec;

/// Per-package outcomes of one sync run.
///
/// A package appears in at most one of the outcome lists. Failures of
/// best-effort follow-up commands go to `warnings` and do not affect
/// [`SyncResult::is_success`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
  pub installed: Vec<PackageSpec>,
  pub uninstalled: Vec<PackageSpec>,
  pub pin_updated: Vec<PackageSpec>,
  pub pin_removed: Vec<PackageSpec>,
  pub failed: Vec<PackageSpec>,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

impl SyncResult {
  pub fn is_success(&self) -> bool {
    self.failed.is_empty() && self.errors.is_empty()
  }

  /// True if nothing was changed or attempted.
  pub fn is_noop(&self) -> bool {
    self.installed.is_empty()
      && self.uninstalled.is_empty()
      && self.pin_updated.is_empty()
      && self.pin_removed.is_empty()
      && self.failed.is_empty()
  }

  pub(super) fn record_failure(&mut self, spec: &PackageSpec, error: String) {
    self.failed.push(spec.clone());
    self.errors.push(error);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn warnings_do_not_fail_a_run() {
    let result = SyncResult {
      warnings: vec!["pin add for A.B failed with exit code 1".into()],
      ..Default::default()
    };
    assert!(result.is_success());
  }

  #[test]
  fn errors_alone_fail_a_run() {
    let result = SyncResult {
      errors: vec!["boom".into()],
      ..Default::default()
    };
    assert!(!result.is_success());
    assert!(result.is_noop());
  }

  #[test]
  fn serializes_camel_case() {
    let result = SyncResult {
      pin_updated: vec![PackageSpec::new("A.B")],
      ..Default::default()
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["pinUpdated"][0]["id"], "A.B");
  }
}
