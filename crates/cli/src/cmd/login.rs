//! Implementation of the `gistget login` command.

use anyhow::{Context, Result};

use super::{Services, runtime};
use crate::output::print_success;

pub fn cmd_login() -> Result<i32> {
  let services = Services::from_env()?;
  let credential = runtime()?.block_on(services.gate.login()).context("Login failed")?;

  print_success(&format!("Logged in as {}", credential.username));
  Ok(0)
}
