//! Native package manager access.
//!
//! The reconciliation core only ever asks the package manager for its
//! installed set and hands it argument lists to run; [`PackageManager`] is
//! that seam. [`WingetCli`] is the real implementation.

pub mod args;
mod cli;
mod listing;

use std::future::Future;
use std::io;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub use cli::WingetCli;
pub use listing::{parse_export, parse_pin_list};

/// A package the package manager reports as installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
  pub id: String,
  pub name: String,
  pub version: String,
  /// Best available upgrade target, if any.
  pub usable_version: Option<String>,
}

impl InstalledPackage {
  pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
    let id = id.into();
    Self {
      name: id.clone(),
      id,
      version: version.into(),
      usable_version: None,
    }
  }
}

/// A pin recorded in the package manager's local database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPin {
  pub id: String,
  pub version: Option<String>,
  pub blocking: bool,
}

/// Errors raised when the package manager cannot be run or understood.
///
/// A command that runs and exits non-zero is not an error at this level; the
/// exit code is returned to the caller.
#[derive(Debug, Error)]
pub enum DriverError {
  #[error("failed to run {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("io error: {0}")]
  Io(#[from] io::Error),

  #[error("{program} {command} exited with code {code}")]
  ListFailed { program: String, command: String, code: i32 },

  #[error("invalid package listing: {0}")]
  InvalidListing(String),
}

pub trait PackageManager {
  fn list_installed(&self) -> impl Future<Output = Result<Vec<InstalledPackage>, DriverError>> + Send;

  /// Look up one installed package; `None` if absent or ambiguous.
  fn find_by_id(&self, id: &str) -> impl Future<Output = Result<Option<InstalledPackage>, DriverError>> + Send;

  /// Run the package manager with `args` and return its exit code.
  fn invoke(&self, args: &[String]) -> impl Future<Output = Result<i32, DriverError>> + Send;

  /// Pins currently recorded locally, or `None` if they cannot be determined.
  fn list_pins(&self) -> impl Future<Output = Result<Option<Vec<LocalPin>>, DriverError>> + Send {
    async { Ok(None) }
  }
}

/// Run a secondary command whose failure must not abort the primary one.
///
/// Returns a warning describing the failure, if there was one.
pub async fn invoke_best_effort<D: PackageManager>(driver: &D, what: &str, id: &str, args: &[String]) -> Option<String> {
  match driver.invoke(args).await {
    Ok(0) => {
      debug!(id = %id, what = %what, "secondary command succeeded");
      None
    }
    Ok(code) => {
      warn!(id = %id, what = %what, code, "secondary command failed");
      Some(format!("{} for {} failed with exit code {}", what, id, code))
    }
    Err(e) => {
      warn!(id = %id, what = %what, error = %e, "secondary command failed");
      Some(format!("{} for {} failed: {}", what, id, e))
    }
  }
}

/// Remove a local pin that may legitimately not exist.
///
/// A non-zero exit only means there was nothing to remove. Returns a warning
/// if the command could not be run at all.
pub async fn clear_pin<D: PackageManager>(driver: &D, id: &str) -> Option<String> {
  match driver.invoke(&args::pin_remove_args(id)).await {
    Ok(0) => {
      debug!(id = %id, "local pin removed");
      None
    }
    Ok(code) => {
      debug!(id = %id, code, "no local pin removed");
      None
    }
    Err(e) => {
      warn!(id = %id, error = %e, "pin remove failed");
      Some(format!("pin remove for {} failed: {}", id, e))
    }
  }
}
