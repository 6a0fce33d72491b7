//! winget process driver.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::{DriverError, InstalledPackage, LocalPin, PackageManager, parse_export, parse_pin_list};
use crate::config::Config;

/// Drives the `winget` executable.
///
/// Mutating commands inherit the terminal so winget's own progress output is
/// visible; listing commands are captured and parsed.
#[derive(Debug, Clone)]
pub struct WingetCli {
  program: String,
}

impl WingetCli {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(config.winget.clone())
  }

  fn spawn_error(&self, source: std::io::Error) -> DriverError {
    DriverError::Spawn {
      program: self.program.clone(),
      source,
    }
  }

  /// Run with captured output, returning the exit code and stdout.
  async fn capture(&self, args: &[String]) -> Result<(i32, String), DriverError> {
    debug!(program = %self.program, args = ?args, "running captured");

    let output = Command::new(&self.program)
      .args(args)
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|e| self.spawn_error(e))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }

    Ok((
      output.status.code().unwrap_or(-1),
      String::from_utf8_lossy(&output.stdout).into_owned(),
    ))
  }
}

impl PackageManager for WingetCli {
  async fn list_installed(&self) -> Result<Vec<InstalledPackage>, DriverError> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("export.json");
    let args: Vec<String> = vec![
      "export".into(),
      "--output".into(),
      path.to_string_lossy().into_owned(),
      "--include-versions".into(),
      "--accept-source-agreements".into(),
      "--disable-interactivity".into(),
    ];

    let (code, _) = self.capture(&args).await?;

    // export exits non-zero when some packages have no source, but still writes the file
    if !path.exists() {
      return Err(DriverError::ListFailed {
        program: self.program.clone(),
        command: "export".to_string(),
        code,
      });
    }
    if code != 0 {
      debug!(code, "export reported partial failure");
    }

    let content = tokio::fs::read_to_string(&path).await?;
    let packages = parse_export(&content)?;
    debug!(count = packages.len(), "listed installed packages");
    Ok(packages)
  }

  async fn find_by_id(&self, id: &str) -> Result<Option<InstalledPackage>, DriverError> {
    let mut matches: Vec<InstalledPackage> = self
      .list_installed()
      .await?
      .into_iter()
      .filter(|p| p.id.eq_ignore_ascii_case(id))
      .collect();

    if matches.len() == 1 { Ok(matches.pop()) } else { Ok(None) }
  }

  async fn invoke(&self, args: &[String]) -> Result<i32, DriverError> {
    info!(program = %self.program, args = ?args, "running");

    let status = Command::new(&self.program)
      .args(args)
      .status()
      .await
      .map_err(|e| self.spawn_error(e))?;

    let code = status.code().unwrap_or(-1);
    debug!(code, "command finished");
    Ok(code)
  }

  async fn list_pins(&self) -> Result<Option<Vec<LocalPin>>, DriverError> {
    let args: Vec<String> = vec![
      "pin".into(),
      "list".into(),
      "--accept-source-agreements".into(),
      "--disable-interactivity".into(),
    ];

    let (code, stdout) = self.capture(&args).await?;
    if code != 0 {
      debug!(code, "pin list failed, local pins unknown");
      return Ok(None);
    }
    Ok(parse_pin_list(&stdout))
  }
}
