//! Implementation of the `gistget logout` command.

use anyhow::{Context, Result};

use super::Services;
use crate::output::{print_info, print_success};

pub fn cmd_logout() -> Result<i32> {
  let services = Services::from_env()?;
  if services.gate.logout().context("Failed to remove credential")? {
    print_success("Logged out");
  } else {
    print_info("Not logged in");
  }
  Ok(0)
}
