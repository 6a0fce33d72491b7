//! Manifest types for gistget.
//!
//! The manifest is the declared side of the reconciliation: a map from package
//! identifier to the attributes the user wants that package to have on every
//! machine that syncs from it.
//!
//! # Identifiers
//!
//! Package identifiers are case-insensitive. The map is keyed by the
//! lowercased identifier while each [`PackageSpec`] keeps the spelling it was
//! declared with, so `Git.Git` and `git.git` address the same entry.
//!
//! # Optional fields
//!
//! Every attribute is an `Option`. `None` means "not declared", which is
//! different from an explicit `false` or empty value and matters when
//! attributes from the command line are overlaid on a stored entry.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a pin restricts upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinType {
  /// The package cannot be upgraded at all until the pin is removed.
  Blocking,
  /// Upgrades are limited to versions matching the pin expression.
  Gating,
}

impl PinType {
  pub fn as_str(&self) -> &'static str {
    match self {
      PinType::Blocking => "blocking",
      PinType::Gating => "gating",
    }
  }
}

impl fmt::Display for PinType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Installer attributes passed through to the package manager untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallerAttrs {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scope: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub architecture: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub location: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub locale: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub installer_type: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub log: Option<String>,
  /// Replaces the installer's own arguments entirely.
  #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
  pub override_args: Option<String>,
  /// Appended to the installer's own arguments.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub custom: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub header: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub silent: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub interactive: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub force: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub skip_dependencies: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allow_hash_mismatch: Option<bool>,
}

impl InstallerAttrs {
  /// Returns true if no attribute is declared.
  pub fn is_empty(&self) -> bool {
    *self == InstallerAttrs::default()
  }

  /// Overlay `overrides` on top of `self`.
  ///
  /// An override only wins when it carries a non-default value: a non-empty
  /// string or `Some(true)`. Anything else keeps the value from `self`.
  pub fn overlay(&self, overrides: &InstallerAttrs) -> InstallerAttrs {
    InstallerAttrs {
      scope: pick_str(&overrides.scope, &self.scope),
      architecture: pick_str(&overrides.architecture, &self.architecture),
      location: pick_str(&overrides.location, &self.location),
      locale: pick_str(&overrides.locale, &self.locale),
      installer_type: pick_str(&overrides.installer_type, &self.installer_type),
      log: pick_str(&overrides.log, &self.log),
      override_args: pick_str(&overrides.override_args, &self.override_args),
      custom: pick_str(&overrides.custom, &self.custom),
      header: pick_str(&overrides.header, &self.header),
      silent: pick_flag(overrides.silent, self.silent),
      interactive: pick_flag(overrides.interactive, self.interactive),
      force: pick_flag(overrides.force, self.force),
      skip_dependencies: pick_flag(overrides.skip_dependencies, self.skip_dependencies),
      allow_hash_mismatch: pick_flag(overrides.allow_hash_mismatch, self.allow_hash_mismatch),
    }
  }
}

fn pick_str(over: &Option<String>, base: &Option<String>) -> Option<String> {
  match over {
    Some(v) if !v.is_empty() => Some(v.clone()),
    _ => base.clone(),
  }
}

fn pick_flag(over: Option<bool>, base: Option<bool>) -> Option<bool> {
  match over {
    Some(true) => Some(true),
    _ => base,
  }
}

/// One manifest entry: the desired state of a single package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
  pub id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pin: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub pin_type: Option<PinType>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub uninstall: Option<bool>,
  #[serde(flatten)]
  pub attrs: InstallerAttrs,
}

impl PackageSpec {
  /// An entry with only an identifier.
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      version: None,
      pin: None,
      pin_type: None,
      uninstall: None,
      attrs: InstallerAttrs::default(),
    }
  }

  /// True if the entry declares that the package must not be installed.
  pub fn is_uninstall(&self) -> bool {
    self.uninstall == Some(true)
  }

  /// The pin value, if one is set and non-empty.
  pub fn pin(&self) -> Option<&str> {
    self.pin.as_deref().filter(|p| !p.is_empty())
  }

  pub fn has_pin(&self) -> bool {
    self.pin().is_some()
  }

  /// The case-folded key this entry is stored under.
  pub fn key(&self) -> String {
    package_key(&self.id)
  }
}

/// Case-fold a package identifier into a manifest key.
pub fn package_key(id: &str) -> String {
  id.to_lowercase()
}

/// The full declared package set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Manifest {
  packages: BTreeMap<String, PackageSpec>,
}

impl Manifest {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.packages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.packages.is_empty()
  }

  /// Look up an entry by identifier, ignoring case.
  pub fn get(&self, id: &str) -> Option<&PackageSpec> {
    self.packages.get(&package_key(id))
  }

  pub fn contains(&self, id: &str) -> bool {
    self.packages.contains_key(&package_key(id))
  }

  /// Insert or replace the entry for `spec.id`, returning the previous entry.
  pub fn insert(&mut self, spec: PackageSpec) -> Option<PackageSpec> {
    self.packages.insert(spec.key(), spec)
  }

  pub fn remove(&mut self, id: &str) -> Option<PackageSpec> {
    self.packages.remove(&package_key(id))
  }

  /// Entries in case-folded identifier order.
  pub fn iter(&self) -> impl Iterator<Item = &PackageSpec> {
    self.packages.values()
  }
}

impl FromIterator<PackageSpec> for Manifest {
  fn from_iter<I: IntoIterator<Item = PackageSpec>>(iter: I) -> Self {
    let mut manifest = Manifest::new();
    for spec in iter {
      manifest.insert(spec);
    }
    manifest
  }
}
