//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// `winget export` output listing Git.Git 2.43.0 as the only installed package.
pub const EXPORT_GIT_ONLY: &str =
  r#"{"Sources":[{"Packages":[{"PackageIdentifier":"Git.Git","Version":"2.43.0"}]}]}"#;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the credential file,
/// the manifest and a stand-in winget that records its arguments.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Write a file relative to the temp directory and return its path.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap_or_else(|_| self.temp.path().to_path_buf())
  }

  /// File the fake winget appends each invocation to, one line per call.
  pub fn winget_log_path(&self) -> PathBuf {
    self.root().join("winget.log")
  }

  /// Invocations recorded by the fake winget.
  pub fn winget_calls(&self) -> Vec<String> {
    std::fs::read_to_string(self.winget_log_path())
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  /// Install a shell script standing in for winget.
  ///
  /// `export` writes `export_json` to the `--output` path, `pin list` fails so
  /// local pins are unknown, and every other command succeeds.
  #[cfg(unix)]
  pub fn fake_winget(&self, export_json: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
      r#"#!/bin/sh
echo "$@" >> "{log}"
if [ "$1" = "export" ]; then
  while [ $# -gt 0 ]; do
    if [ "$1" = "--output" ]; then out="$2"; fi
    shift
  done
  printf '%s' '{json}' > "$out"
  exit 0
fi
if [ "$1" = "pin" ] && [ "$2" = "list" ]; then
  exit 1
fi
exit 0
"#,
      log = self.winget_log_path().display(),
      json = export_json,
    );

    let path = self.write_file("winget.sh", &script);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  /// Get a pre-configured Command for the gistget binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `GISTGET_CREDENTIALS`: Isolated credential file
  /// - `GISTGET_API_URL`, `GISTGET_GITHUB_URL`: Unreachable endpoints
  /// - `XDG_CONFIG_HOME`, `APPDATA`: Isolated config dir
  pub fn gistget_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("gistget");
    cmd.env("GISTGET_CREDENTIALS", self.root().join("credentials.json"));
    cmd.env("GISTGET_API_URL", "http://127.0.0.1:9");
    cmd.env("GISTGET_GITHUB_URL", "http://127.0.0.1:9");
    cmd.env("XDG_CONFIG_HOME", self.root().join("config"));
    cmd.env("APPDATA", self.root().join("config")); // For Windows
    cmd
  }
}
