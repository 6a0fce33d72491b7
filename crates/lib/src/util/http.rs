//! HTTP client setup for the GitHub API.

use reqwest::Client;

/// Media type for GitHub REST API requests.
pub const GITHUB_JSON: &str = "application/vnd.github+json";

const USER_AGENT: &str = concat!("gistget/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client; GitHub rejects requests without a user agent.
pub fn http_client() -> Result<Client, reqwest::Error> {
  Client::builder().user_agent(USER_AGENT).build()
}
