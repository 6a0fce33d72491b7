//! Sync and export integration tests.
//!
//! These need a shell to stand in for winget, so they only run on unix.

#![cfg(unix)]

use predicates::prelude::*;

use super::common::{EXPORT_GIT_ONLY, TestEnv};

const MANIFEST: &str = r#"
Git.Git:
  pin: 2.43.0
New.Tool:
Old.Tool:
  uninstall: true
"#;

#[test]
fn sync_dry_run_prints_plan_without_changes() {
  let env = TestEnv::new();
  let winget = env.fake_winget(EXPORT_GIT_ONLY);
  let manifest = env.write_file("GistGet.yaml", MANIFEST);

  env
    .gistget_cmd()
    .env("GISTGET_WINGET", &winget)
    .args(["sync", "--dry-run", "--json", "--file"])
    .arg(&manifest)
    .assert()
    .success()
    .stdout(predicate::str::contains("\"toInstall\""))
    .stdout(predicate::str::contains("New.Tool"));

  let calls = env.winget_calls();
  assert!(calls.iter().all(|c| c.starts_with("export") || c.starts_with("pin list")));
}

#[test]
fn sync_from_file_installs_and_pins() {
  let env = TestEnv::new();
  let winget = env.fake_winget(EXPORT_GIT_ONLY);
  let manifest = env.write_file("GistGet.yaml", MANIFEST);

  env
    .gistget_cmd()
    .env("GISTGET_WINGET", &winget)
    .args(["sync", "--file"])
    .arg(&manifest)
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed New.Tool"))
    .stdout(predicate::str::contains("Pinned Git.Git (pin 2.43.0)"));

  let calls = env.winget_calls();
  assert!(calls.iter().any(|c| c.starts_with("install") && c.contains("New.Tool")));
  assert!(calls.iter().any(|c| c.starts_with("pin add") && c.contains("Git.Git")));
  // Old.Tool is not installed, so there is nothing to remove
  assert!(!calls.iter().any(|c| c.starts_with("uninstall")));
}

#[test]
fn sync_from_file_needs_no_login() {
  let env = TestEnv::new();
  let winget = env.fake_winget(EXPORT_GIT_ONLY);
  let manifest = env.write_file("GistGet.yaml", "Git.Git:\n");

  env
    .gistget_cmd()
    .env("GISTGET_WINGET", &winget)
    .args(["sync", "--file"])
    .arg(&manifest)
    .assert()
    .success();

  assert!(!env.root().join("credentials.json").exists());
}

#[test]
fn export_writes_installed_packages() {
  let env = TestEnv::new();
  let winget = env.fake_winget(EXPORT_GIT_ONLY);
  let output = env.root().join("exported.yaml");

  env
    .gistget_cmd()
    .env("GISTGET_WINGET", &winget)
    .arg("export")
    .arg("--output")
    .arg(&output)
    .assert()
    .success()
    .stdout(predicate::str::contains("Exported 1 packages"));

  let content = std::fs::read_to_string(&output).unwrap();
  assert!(content.contains("Git.Git"));
}

#[test]
fn export_to_stdout() {
  let env = TestEnv::new();
  let winget = env.fake_winget(EXPORT_GIT_ONLY);

  env
    .gistget_cmd()
    .env("GISTGET_WINGET", &winget)
    .arg("export")
    .assert()
    .success()
    .stdout(predicate::str::contains("Git.Git"));
}
