//! Runtime configuration.
//!
//! Every setting has a compiled-in default and can be overridden through an
//! environment variable, which is also how the integration tests isolate the
//! binary from the real GitHub endpoints and credential file.

use std::path::PathBuf;

use crate::consts::{DEFAULT_API_URL, DEFAULT_CLIENT_ID, DEFAULT_GITHUB_URL, DEFAULT_WINGET};
use crate::platform::paths::credentials_path;

/// Environment variable overriding the GitHub REST API base URL.
pub const ENV_API_URL: &str = "GISTGET_API_URL";
/// Environment variable overriding the device-flow host.
pub const ENV_GITHUB_URL: &str = "GISTGET_GITHUB_URL";
/// Environment variable overriding the OAuth client ID.
pub const ENV_CLIENT_ID: &str = "GISTGET_CLIENT_ID";
/// Environment variable overriding the winget executable.
pub const ENV_WINGET: &str = "GISTGET_WINGET";
/// Environment variable overriding the credential file location.
pub const ENV_CREDENTIALS: &str = "GISTGET_CREDENTIALS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub api_url: String,
  pub github_url: String,
  pub client_id: String,
  pub winget: String,
  pub credentials_path: PathBuf,
}

impl Config {
  /// Resolve configuration from the process environment.
  pub fn from_env() -> Self {
    Self {
      api_url: env_or(ENV_API_URL, DEFAULT_API_URL),
      github_url: env_or(ENV_GITHUB_URL, DEFAULT_GITHUB_URL),
      client_id: env_or(ENV_CLIENT_ID, DEFAULT_CLIENT_ID),
      winget: env_or(ENV_WINGET, DEFAULT_WINGET),
      credentials_path: std::env::var(ENV_CREDENTIALS)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(credentials_path),
    }
  }
}

fn env_or(key: &str, default: &str) -> String {
  std::env::var(key)
    .ok()
    .filter(|v| !v.is_empty())
    .map(|v| v.trim_end_matches('/').to_string())
    .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn defaults_without_overrides() {
    temp_env::with_vars(
      [
        (ENV_API_URL, None::<&str>),
        (ENV_GITHUB_URL, None),
        (ENV_CLIENT_ID, None),
        (ENV_WINGET, None),
        (ENV_CREDENTIALS, Some("/tmp/creds.json")),
      ],
      || {
        let config = Config::from_env();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.github_url, DEFAULT_GITHUB_URL);
        assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(config.winget, DEFAULT_WINGET);
        assert_eq!(config.credentials_path, PathBuf::from("/tmp/creds.json"));
      },
    );
  }

  #[test]
  #[serial]
  fn overrides_strip_trailing_slash() {
    temp_env::with_vars(
      [
        (ENV_API_URL, Some("http://127.0.0.1:9000/")),
        (ENV_WINGET, Some("C:\\tools\\winget.exe")),
      ],
      || {
        let config = Config::from_env();
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.winget, "C:\\tools\\winget.exe");
      },
    );
  }

  #[test]
  #[serial]
  fn empty_values_fall_back_to_defaults() {
    temp_env::with_vars([(ENV_CLIENT_ID, Some(""))], || {
      assert_eq!(Config::from_env().client_id, DEFAULT_CLIENT_ID);
    });
  }
}
