//! Version and pin resolution for single-package mutations.
//!
//! Given what the caller asked for and what the manifest already records for
//! a package, decide which version to hand to the package manager and which
//! pin to persist afterwards. Everything here is pure; the one fact that must
//! come from the package manager (the version installed after an upgrade) is
//! passed in by the caller.

use crate::manifest::{PackageSpec, PinType};

/// The mutation being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Install,
  Upgrade,
}

/// Outcome of resolving one mutation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolution {
  /// Version passed to the package manager; `None` means latest.
  pub version_to_apply: Option<String>,
  /// Pin written to the manifest (and applied locally) on success.
  pub pin_to_persist: Option<String>,
  pub pin_type_to_persist: Option<PinType>,
}

fn explicit_version(explicit: Option<&str>) -> Option<&str> {
  explicit.filter(|v| !v.is_empty())
}

/// Whether resolving an upgrade needs the version installed afterwards.
///
/// Only a pinned entry upgraded without an explicit version re-pins to
/// whatever the upgrade produced.
pub fn needs_installed_version(explicit: Option<&str>, existing: Option<&PackageSpec>) -> bool {
  explicit_version(explicit).is_none() && existing.is_some_and(PackageSpec::has_pin)
}

/// Resolve an install.
///
/// - explicit version: install it; an existing pin moves to it, but no pin is
///   created where there was none
/// - no explicit version, existing pin: install the pinned version and keep
///   the pin
/// - otherwise: latest version, no pin
pub fn resolve_install(explicit: Option<&str>, existing: Option<&PackageSpec>) -> Resolution {
  let existing_pin = existing.and_then(PackageSpec::pin);

  let (version_to_apply, pin_to_persist) = match (explicit_version(explicit), existing_pin) {
    (Some(version), Some(_)) => (Some(version.to_string()), Some(version.to_string())),
    (Some(version), None) => (Some(version.to_string()), None),
    (None, Some(pin)) => (Some(pin.to_string()), Some(pin.to_string())),
    (None, None) => (None, None),
  };

  Resolution {
    version_to_apply,
    pin_type_to_persist: inherited_pin_type(&pin_to_persist, existing),
    pin_to_persist,
  }
}

/// Resolve an upgrade.
///
/// `installed_after` is the version the package manager reports once the
/// upgrade has run; it is consulted only when [`needs_installed_version`]
/// holds. If it is unknown the previous pin is kept.
pub fn resolve_upgrade(
  explicit: Option<&str>,
  existing: Option<&PackageSpec>,
  installed_after: Option<&str>,
) -> Resolution {
  let explicit = explicit_version(explicit);
  let existing_pin = existing.and_then(PackageSpec::pin);

  let pin_to_persist = match (explicit, existing_pin) {
    (_, None) => None,
    (Some(version), Some(_)) => Some(version.to_string()),
    (None, Some(pin)) => Some(
      installed_after
        .filter(|v| !v.is_empty())
        .unwrap_or(pin)
        .to_string(),
    ),
  };

  Resolution {
    version_to_apply: explicit.map(str::to_string),
    pin_type_to_persist: inherited_pin_type(&pin_to_persist, existing),
    pin_to_persist,
  }
}

/// Resolve either operation.
pub fn resolve(
  operation: Operation,
  explicit: Option<&str>,
  existing: Option<&PackageSpec>,
  installed_after: Option<&str>,
) -> Resolution {
  match operation {
    Operation::Install => resolve_install(explicit, existing),
    Operation::Upgrade => resolve_upgrade(explicit, existing, installed_after),
  }
}

/// A pin type only means something next to a pin.
fn inherited_pin_type(pin: &Option<String>, existing: Option<&PackageSpec>) -> Option<PinType> {
  pin.as_ref().and(existing.and_then(|e| e.pin_type))
}
