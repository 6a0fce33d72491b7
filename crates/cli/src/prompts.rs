//! Confirmation before `gistget import` overwrites the manifest stored in the
//! user's gist.

use anyhow::{Result, bail};
use std::io::{self, IsTerminal, Write};

/// Ask `question` on stderr and read a yes/no answer from stdin.
///
/// `--force` answers yes. Scripts and CI have no terminal to answer on, so
/// without `--force` the command fails there rather than waiting for input
/// or replacing the stored manifest unasked.
pub fn confirm(question: &str, force: bool) -> Result<bool> {
  if force {
    return Ok(true);
  }
  if !interactive() {
    bail!("Cannot prompt for confirmation in non-interactive mode. Use --force to proceed.");
  }

  let mut stderr = io::stderr();
  write!(stderr, "{} [y/N] ", question)?;
  stderr.flush()?;

  let mut answer = String::new();
  io::stdin().read_line(&mut answer)?;
  Ok(is_yes(&answer))
}

fn interactive() -> bool {
  io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Anything but an explicit yes keeps the stored manifest.
fn is_yes(answer: &str) -> bool {
  matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
