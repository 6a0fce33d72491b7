//! Package manifest: types, YAML codec and local file access.
//!
//! The manifest is the declared desired state. It lives remotely in a gist
//! (see [`crate::store`]) or locally as a YAML file, and is always read and
//! written as a whole document.

mod codec;
mod file;
mod types;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use file::{read_manifest_file, write_manifest_file};
pub use types::*;

/// Errors that can occur while decoding, encoding or reading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// Local manifest file does not exist.
  #[error("manifest file not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error("failed to read manifest: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write manifest: {0}")]
  Write(#[source] io::Error),

  #[error("failed to parse manifest: {0}")]
  Parse(#[source] serde_yaml::Error),

  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_yaml::Error),

  /// Document root is not a mapping of identifiers.
  #[error("manifest must be a mapping of package identifiers")]
  NotAMapping,

  #[error("package identifier must be a non-empty string")]
  EmptyIdentifier,

  /// Two keys differ only by case.
  #[error("duplicate package identifier: {0}")]
  DuplicateIdentifier(String),
}
