//! Test utilities for gistget-lib.
//!
//! Cross-platform shell helpers for tests that run real processes, and
//! in-memory fakes for every collaborator of the reconciliation core. Fakes
//! are `Clone` and share their state, so a test can hand one copy to the code
//! under test and inspect another.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

use crate::auth::{AuthError, Credential, CredentialStore, LoginFlow};
use crate::manifest::{Manifest, package_key};
use crate::store::{ManifestStore, StoreError};
use crate::winget::args::describe;
use crate::winget::{DriverError, InstalledPackage, LocalPin, PackageManager};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct CredentialState {
  credential: Option<Credential>,
  discard: bool,
  gets: usize,
  saves: usize,
}

/// Credential store kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
  state: Arc<Mutex<CredentialState>>,
}

impl MemoryCredentialStore {
  pub fn empty() -> Self {
    Self::default()
  }

  pub fn with(credential: Credential) -> Self {
    let store = Self::default();
    store.state.lock().unwrap().credential = Some(credential);
    store
  }

  /// A store that accepts saves but never keeps anything.
  pub fn discarding() -> Self {
    let store = Self::default();
    store.state.lock().unwrap().discard = true;
    store
  }

  pub fn gets(&self) -> usize {
    self.state.lock().unwrap().gets
  }

  pub fn saves(&self) -> usize {
    self.state.lock().unwrap().saves
  }
}

impl CredentialStore for MemoryCredentialStore {
  fn try_get(&self) -> Result<Option<Credential>, AuthError> {
    let mut state = self.state.lock().unwrap();
    state.gets += 1;
    Ok(state.credential.clone())
  }

  fn save(&self, credential: &Credential) -> Result<(), AuthError> {
    let mut state = self.state.lock().unwrap();
    state.saves += 1;
    if !state.discard {
      state.credential = Some(credential.clone());
    }
    Ok(())
  }

  fn delete(&self) -> Result<bool, AuthError> {
    Ok(self.state.lock().unwrap().credential.take().is_some())
  }
}

/// Login flow returning a fixed credential, or failing.
#[derive(Debug, Clone)]
pub struct FakeLogin {
  result: Option<Credential>,
  calls: Arc<Mutex<usize>>,
}

impl FakeLogin {
  pub fn returning(credential: Credential) -> Self {
    Self {
      result: Some(credential),
      calls: Arc::default(),
    }
  }

  pub fn failing() -> Self {
    Self {
      result: None,
      calls: Arc::default(),
    }
  }

  pub fn calls(&self) -> usize {
    *self.calls.lock().unwrap()
  }
}

impl LoginFlow for FakeLogin {
  async fn login(&self) -> Result<Credential, AuthError> {
    *self.calls.lock().unwrap() += 1;
    self
      .result
      .clone()
      .ok_or_else(|| AuthError::Login("login cancelled".to_string()))
  }
}

// ---------------------------------------------------------------------------
// Manifest store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StoreState {
  manifest: Manifest,
  url_manifest: Manifest,
  loads: usize,
  saves: usize,
  url_loads: usize,
}

/// Manifest store kept in memory, counting every access.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(manifest: Manifest) -> Self {
    let store = Self::default();
    store.state.lock().unwrap().manifest = manifest;
    store
  }

  /// Manifest served by `load_from_url` for any URL.
  pub fn serving_url(self, manifest: Manifest) -> Self {
    self.state.lock().unwrap().url_manifest = manifest;
    self
  }

  /// The manifest as last saved (or as seeded).
  pub fn manifest(&self) -> Manifest {
    self.state.lock().unwrap().manifest.clone()
  }

  pub fn loads(&self) -> usize {
    self.state.lock().unwrap().loads
  }

  pub fn saves(&self) -> usize {
    self.state.lock().unwrap().saves
  }

  pub fn url_loads(&self) -> usize {
    self.state.lock().unwrap().url_loads
  }
}

impl ManifestStore for MemoryStore {
  async fn load(&self, _credential: &Credential) -> Result<Manifest, StoreError> {
    let mut state = self.state.lock().unwrap();
    state.loads += 1;
    Ok(state.manifest.clone())
  }

  async fn save(&self, _credential: &Credential, manifest: &Manifest) -> Result<(), StoreError> {
    let mut state = self.state.lock().unwrap();
    state.saves += 1;
    state.manifest = manifest.clone();
    Ok(())
  }

  async fn load_from_url(&self, _url: &str) -> Result<Manifest, StoreError> {
    let mut state = self.state.lock().unwrap();
    state.url_loads += 1;
    Ok(state.url_manifest.clone())
  }
}

// ---------------------------------------------------------------------------
// Package manager
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct DriverState {
  installed: BTreeMap<String, InstalledPackage>,
  pins: BTreeMap<String, LocalPin>,
  pins_known: bool,
  calls: Vec<Vec<String>>,
  list_calls: usize,
  exit_codes: HashMap<(String, String), i32>,
  errors: HashSet<(String, String)>,
  upgrade_to: HashMap<String, String>,
}

/// Package manager fake that applies the commands it is given to its own
/// installed set and pin table, so consecutive runs observe earlier effects.
#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
  state: Arc<Mutex<DriverState>>,
}

fn value_after(args: &[String], flag: &str) -> Option<String> {
  let pos = args.iter().position(|a| a == flag)?;
  args.get(pos + 1).cloned()
}

impl FakeDriver {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed an installed package.
  pub fn installed(self, id: &str, version: &str) -> Self {
    self
      .state
      .lock()
      .unwrap()
      .installed
      .insert(package_key(id), InstalledPackage::new(id, version));
    self
  }

  /// Report local pins through `list_pins` instead of `None`.
  pub fn with_pin_listing(self) -> Self {
    self.state.lock().unwrap().pins_known = true;
    self
  }

  /// Seed a local pin.
  pub fn pinned(self, id: &str, version: &str) -> Self {
    self.state.lock().unwrap().pins.insert(
      package_key(id),
      LocalPin {
        id: id.to_string(),
        version: Some(version.to_string()),
        blocking: false,
      },
    );
    self
  }

  /// Make `verb` on `id` exit with `code`.
  pub fn fail(self, verb: &str, id: &str, code: i32) -> Self {
    self
      .state
      .lock()
      .unwrap()
      .exit_codes
      .insert((verb.to_string(), package_key(id)), code);
    self
  }

  /// Make `verb` on `id` fail to run at all.
  pub fn error(self, verb: &str, id: &str) -> Self {
    self
      .state
      .lock()
      .unwrap()
      .errors
      .insert((verb.to_string(), package_key(id)));
    self
  }

  /// Version an upgrade without an explicit version lands on.
  pub fn upgrades_to(self, id: &str, version: &str) -> Self {
    self
      .state
      .lock()
      .unwrap()
      .upgrade_to
      .insert(package_key(id), version.to_string());
    self
  }

  /// Every argument list passed to `invoke`, in order.
  pub fn calls(&self) -> Vec<Vec<String>> {
    self.state.lock().unwrap().calls.clone()
  }

  /// Identifiers `verb` was invoked for, in order.
  pub fn calls_for(&self, verb: &str) -> Vec<String> {
    self
      .calls()
      .iter()
      .filter_map(|args| describe(args))
      .filter(|(v, _)| v == verb)
      .map(|(_, id)| id)
      .collect()
  }

  pub fn list_calls(&self) -> usize {
    self.state.lock().unwrap().list_calls
  }

  pub fn installed_version(&self, id: &str) -> Option<String> {
    let state = self.state.lock().unwrap();
    state.installed.get(&package_key(id)).map(|p| p.version.clone())
  }

  pub fn local_pin(&self, id: &str) -> Option<String> {
    let state = self.state.lock().unwrap();
    state.pins.get(&package_key(id)).and_then(|p| p.version.clone())
  }
}

impl PackageManager for FakeDriver {
  async fn list_installed(&self) -> Result<Vec<InstalledPackage>, DriverError> {
    let mut state = self.state.lock().unwrap();
    state.list_calls += 1;
    Ok(state.installed.values().cloned().collect())
  }

  async fn find_by_id(&self, id: &str) -> Result<Option<InstalledPackage>, DriverError> {
    Ok(self.state.lock().unwrap().installed.get(&package_key(id)).cloned())
  }

  async fn invoke(&self, args: &[String]) -> Result<i32, DriverError> {
    let mut state = self.state.lock().unwrap();
    state.calls.push(args.to_vec());

    let Some((verb, id)) = describe(args) else {
      return Ok(2);
    };
    let key = (verb.clone(), package_key(&id));
    if state.errors.contains(&key) {
      return Err(DriverError::Io(io::Error::other(format!("simulated {} failure", verb))));
    }
    if let Some(code) = state.exit_codes.get(&key) {
      return Ok(*code);
    }

    let pkg_key = package_key(&id);
    match verb.as_str() {
      "install" => {
        let version = value_after(args, "--version").unwrap_or_else(|| "1.0.0".to_string());
        state.installed.insert(pkg_key, InstalledPackage::new(id, version));
      }
      "upgrade" => {
        let target = value_after(args, "--version").or_else(|| state.upgrade_to.get(&pkg_key).cloned());
        match (state.installed.get_mut(&pkg_key), target) {
          (Some(package), Some(version)) => package.version = version,
          (Some(_), None) => {}
          (None, _) => return Ok(1),
        }
      }
      "uninstall" => {
        if state.installed.remove(&pkg_key).is_none() {
          return Ok(1);
        }
      }
      "pin add" => {
        let pin = LocalPin {
          id,
          version: value_after(args, "--version"),
          blocking: args.iter().any(|a| a == "--blocking"),
        };
        state.pins.insert(pkg_key, pin);
      }
      // winget exits non-zero when there is no pin to remove
      "pin remove" => {
        if state.pins.remove(&pkg_key).is_none() {
          return Ok(1);
        }
      }
      _ => return Ok(2),
    }
    Ok(0)
  }

  async fn list_pins(&self) -> Result<Option<Vec<LocalPin>>, DriverError> {
    let state = self.state.lock().unwrap();
    Ok(state.pins_known.then(|| state.pins.values().cloned().collect()))
  }
}
