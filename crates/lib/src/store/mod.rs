//! Remote manifest storage.
//!
//! The authenticated user's manifest lives in one of their gists. A manifest
//! can also be fetched anonymously from any URL serving the raw YAML.

mod gist;

use std::future::Future;

use thiserror::Error;

use crate::auth::Credential;
use crate::manifest::{Manifest, ManifestError};

pub use gist::GistStore;

/// Errors that can occur while loading or saving a remote manifest.
#[derive(Debug, Error)]
pub enum StoreError {
  /// More than one gist could hold the manifest; refuse to guess.
  #[error("found {} gists containing {filename}: {}", ids.len(), ids.join(", "))]
  AmbiguousManifestLocation { filename: String, ids: Vec<String> },

  #[error("{method} {url} returned HTTP {status}")]
  Http { method: String, url: String, status: u16 },

  #[error("http request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error(transparent)]
  Manifest(#[from] ManifestError),
}

/// Whole-document access to the declared manifest.
pub trait ManifestStore {
  /// Load the manifest owned by `credential`'s user.
  fn load(&self, credential: &Credential) -> impl Future<Output = Result<Manifest, StoreError>> + Send;

  /// Overwrite the manifest owned by `credential`'s user.
  fn save(&self, credential: &Credential, manifest: &Manifest) -> impl Future<Output = Result<(), StoreError>> + Send;

  /// Fetch a manifest anonymously from a URL.
  fn load_from_url(&self, url: &str) -> impl Future<Output = Result<Manifest, StoreError>> + Send;
}
