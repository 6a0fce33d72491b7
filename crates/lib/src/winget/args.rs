//! Argument lists for winget invocations.
//!
//! Every command targets a single package by exact identifier. Installer
//! attributes map one-to-one onto winget options; absent attributes produce no
//! arguments at all.

use crate::manifest::{InstallerAttrs, PinType};

fn target(verb: &[&str], id: &str) -> Vec<String> {
  let mut args: Vec<String> = verb.iter().map(|s| s.to_string()).collect();
  args.extend(["--id".to_string(), id.to_string(), "--exact".to_string()]);
  args
}

fn push_value(args: &mut Vec<String>, flag: &str, value: &Option<String>) {
  if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
    args.push(flag.to_string());
    args.push(value.to_string());
  }
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: Option<bool>) {
  if value == Some(true) {
    args.push(flag.to_string());
  }
}

fn push_interaction(args: &mut Vec<String>, attrs: &InstallerAttrs) {
  if attrs.interactive == Some(true) {
    args.push("--interactive".to_string());
  } else {
    push_flag(args, "--silent", attrs.silent);
    args.push("--disable-interactivity".to_string());
  }
}

fn install_like(verb: &str, id: &str, version: Option<&str>, attrs: &InstallerAttrs) -> Vec<String> {
  let mut args = target(&[verb], id);
  push_value(&mut args, "--version", &version.map(str::to_string));
  push_value(&mut args, "--scope", &attrs.scope);
  push_value(&mut args, "--architecture", &attrs.architecture);
  push_value(&mut args, "--location", &attrs.location);
  push_value(&mut args, "--locale", &attrs.locale);
  push_value(&mut args, "--installer-type", &attrs.installer_type);
  push_value(&mut args, "--log", &attrs.log);
  push_value(&mut args, "--override", &attrs.override_args);
  push_value(&mut args, "--custom", &attrs.custom);
  push_value(&mut args, "--header", &attrs.header);
  push_interaction(&mut args, attrs);
  push_flag(&mut args, "--force", attrs.force);
  push_flag(&mut args, "--skip-dependencies", attrs.skip_dependencies);
  push_flag(&mut args, "--ignore-security-hash", attrs.allow_hash_mismatch);
  args.push("--accept-package-agreements".to_string());
  args.push("--accept-source-agreements".to_string());
  args
}

/// `winget install` for one package, optionally at a specific version.
pub fn install_args(id: &str, version: Option<&str>, attrs: &InstallerAttrs) -> Vec<String> {
  install_like("install", id, version, attrs)
}

/// `winget upgrade` for one package, optionally to a specific version.
pub fn upgrade_args(id: &str, version: Option<&str>, attrs: &InstallerAttrs) -> Vec<String> {
  install_like("upgrade", id, version, attrs)
}

/// `winget uninstall` for one package.
pub fn uninstall_args(id: &str, attrs: &InstallerAttrs) -> Vec<String> {
  let mut args = target(&["uninstall"], id);
  push_value(&mut args, "--scope", &attrs.scope);
  push_value(&mut args, "--log", &attrs.log);
  push_interaction(&mut args, attrs);
  push_flag(&mut args, "--force", attrs.force);
  args.push("--accept-source-agreements".to_string());
  args
}

/// `winget pin add` pinning `id` to `version`.
///
/// A blocking pin also records the version so the manifest and the local pin
/// stay comparable.
pub fn pin_add_args(id: &str, version: &str, pin_type: Option<PinType>, force: bool) -> Vec<String> {
  let mut args = target(&["pin", "add"], id);
  args.push("--version".to_string());
  args.push(version.to_string());
  if pin_type == Some(PinType::Blocking) {
    args.push("--blocking".to_string());
  }
  if force {
    args.push("--force".to_string());
  }
  args.push("--accept-source-agreements".to_string());
  args
}

/// `winget pin remove` for one package.
pub fn pin_remove_args(id: &str) -> Vec<String> {
  let mut args = target(&["pin", "remove"], id);
  args.push("--accept-source-agreements".to_string());
  args
}

/// The `(verb, id)` an argument list produced here targets.
///
/// Verbs are `install`, `uninstall`, `upgrade`, `pin add` and `pin remove`.
pub fn describe(args: &[String]) -> Option<(String, String)> {
  let verb = match args.first()?.as_str() {
    "pin" => format!("pin {}", args.get(1)?),
    other => other.to_string(),
  };
  let id_pos = args.iter().position(|a| a == "--id")?;
  Some((verb, args.get(id_pos + 1)?.clone()))
}
