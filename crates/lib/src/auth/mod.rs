//! Credentials and the gate that guarantees one exists.
//!
//! A single GitHub credential is stored locally. Operations that read or
//! write the user's gist go through [`CredentialGate::ensure_credential`],
//! which runs the interactive login at most once per operation.

mod device_flow;
mod file_store;

use std::fmt;
use std::future::Future;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub use device_flow::{DeviceCode, DeviceFlowLogin};
pub use file_store::FileCredentialStore;

/// A GitHub user and its access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
  pub username: String,
  pub token: String,
}

impl Credential {
  pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      token: token.into(),
    }
  }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credential")
      .field("username", &self.username)
      .field("token", &"<redacted>")
      .finish()
  }
}

/// Errors that can occur while obtaining or storing a credential.
#[derive(Debug, Error)]
pub enum AuthError {
  /// No credential exists even after running the login flow.
  #[error("no credential available, run `gistget login` first")]
  CredentialUnavailable,

  #[error("login failed: {0}")]
  Login(String),

  #[error("http request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("credential storage error: {0}")]
  Storage(#[from] io::Error),

  #[error("stored credential is corrupted: {0}")]
  Corrupted(#[from] serde_json::Error),
}

/// Local persistence of the single active credential.
pub trait CredentialStore {
  fn try_get(&self) -> Result<Option<Credential>, AuthError>;

  fn save(&self, credential: &Credential) -> Result<(), AuthError>;

  /// Remove the stored credential. Returns false if none was stored.
  fn delete(&self) -> Result<bool, AuthError>;
}

/// Interactive acquisition of a new credential.
pub trait LoginFlow {
  fn login(&self) -> impl Future<Output = Result<Credential, AuthError>> + Send;
}

/// Guarantees a credential before a manifest-mutating operation.
pub struct CredentialGate<C, L> {
  store: C,
  login: L,
}

impl<C: CredentialStore, L: LoginFlow> CredentialGate<C, L> {
  pub fn new(store: C, login: L) -> Self {
    Self { store, login }
  }

  /// Return the stored credential, logging in once if there is none.
  ///
  /// Fails with [`AuthError::CredentialUnavailable`] if the credential is
  /// still missing after the login, whether the login flow returned nothing
  /// usable or the store failed to keep it.
  pub async fn ensure_credential(&self) -> Result<Credential, AuthError> {
    if let Some(credential) = self.store.try_get()? {
      return Ok(credential);
    }

    info!("no stored credential, starting login");
    let credential = self.login.login().await?;

    if let Err(e) = self.store.save(&credential) {
      warn!(error = %e, "failed to store credential");
    }

    match self.store.try_get() {
      Ok(Some(credential)) => Ok(credential),
      Ok(None) => Err(AuthError::CredentialUnavailable),
      Err(e) => {
        warn!(error = %e, "failed to read back stored credential");
        Err(AuthError::CredentialUnavailable)
      }
    }
  }

  /// Run the login flow unconditionally and store the result.
  pub async fn login(&self) -> Result<Credential, AuthError> {
    let credential = self.login.login().await?;
    self.store.save(&credential)?;
    info!(user = %credential.username, "logged in");
    Ok(credential)
  }

  /// Remove the stored credential. Returns false if there was none.
  pub fn logout(&self) -> Result<bool, AuthError> {
    self.store.delete()
  }

  /// The stored credential, without triggering a login.
  pub fn current(&self) -> Result<Option<Credential>, AuthError> {
    self.store.try_get()
  }
}
