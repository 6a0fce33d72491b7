//! Implementation of the `gistget status` command.
//!
//! Shows who is logged in and where gistget looks for things. The token is
//! never printed.

use anyhow::{Context, Result};
use serde_json::json;

use super::Services;
use crate::output::{print_info, print_json, print_stat, print_success};

pub fn cmd_status(json: bool) -> Result<i32> {
  let services = Services::from_env()?;
  let credential = services.gate.current().context("Failed to read credential")?;
  let config = &services.config;

  if json {
    print_json(&json!({
      "user": credential.as_ref().map(|c| c.username.as_str()),
      "credentials": config.credentials_path,
      "apiUrl": config.api_url,
      "winget": config.winget,
    }))?;
    return Ok(0);
  }

  match &credential {
    Some(credential) => print_success(&format!("Logged in as {}", credential.username)),
    None => print_info("Not logged in. Run 'gistget login' to log in."),
  }
  println!();
  print_stat("Credentials", &config.credentials_path.display().to_string());
  print_stat("GitHub API", &config.api_url);
  print_stat("winget", &config.winget);

  Ok(0)
}
