//! Terminal output helpers.
//!
//! Status lines go through these so colors and symbols stay consistent
//! between commands.

use anyhow::Context;
use owo_colors::{OwoColorize, Stream};

use gistget_lib::manifest::{PackageSpec, PinType};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const PLUS: &str = "+";
  pub const MINUS: &str = "-";
  pub const TILDE: &str = "~";
}

/// One-line description of a manifest entry, e.g. `Git.Git (pin 2.43.*, blocking)`.
pub fn describe_spec(spec: &PackageSpec) -> String {
  match (spec.pin(), spec.pin_type) {
    (Some(pin), Some(PinType::Blocking)) => format!("{} (pin {}, blocking)", spec.id, pin),
    (Some(pin), _) => format!("{} (pin {})", spec.id, pin),
    (None, _) => spec.id.clone(),
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
