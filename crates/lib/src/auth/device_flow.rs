//! GitHub OAuth device flow.
//!
//! The user is shown a short code and a verification URL; meanwhile the flow
//! polls the token endpoint until the code is approved, denied or expires.

use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::debug;

use super::{AuthError, Credential, LoginFlow};
use crate::config::Config;
use crate::consts::OAUTH_SCOPE;
use crate::util::http::{GITHUB_JSON, http_client};

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Extra delay requested by a `slow_down` response when none is given.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

/// What the user needs to approve the login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCode {
  pub user_code: String,
  pub verification_uri: String,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
  device_code: String,
  user_code: String,
  verification_uri: String,
  expires_in: u64,
  interval: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: Option<String>,
  error: Option<String>,
  error_description: Option<String>,
  interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
  login: String,
}

type Prompt = Box<dyn Fn(&DeviceCode) + Send + Sync>;

pub struct DeviceFlowLogin {
  client: reqwest::Client,
  github_url: String,
  api_url: String,
  client_id: String,
  prompt: Prompt,
}

impl DeviceFlowLogin {
  /// Create a login flow; `prompt` is called once with the code to show.
  pub fn new(config: &Config, prompt: impl Fn(&DeviceCode) + Send + Sync + 'static) -> Result<Self, AuthError> {
    Ok(Self {
      client: http_client()?,
      github_url: config.github_url.clone(),
      api_url: config.api_url.clone(),
      client_id: config.client_id.clone(),
      prompt: Box::new(prompt),
    })
  }

  async fn request_code(&self) -> Result<DeviceCodeResponse, AuthError> {
    let response = self
      .client
      .post(format!("{}/login/device/code", self.github_url))
      .header(ACCEPT, "application/json")
      .form(&[("client_id", self.client_id.as_str()), ("scope", OAUTH_SCOPE)])
      .send()
      .await?
      .error_for_status()?;
    Ok(response.json().await?)
  }

  async fn poll_token(&self, code: &DeviceCodeResponse) -> Result<String, AuthError> {
    let deadline = Instant::now() + Duration::from_secs(code.expires_in);
    let mut interval = Duration::from_secs(code.interval);

    loop {
      tokio::time::sleep(interval).await;
      if Instant::now() > deadline {
        return Err(AuthError::Login("device code expired before it was approved".to_string()));
      }

      let response: TokenResponse = self
        .client
        .post(format!("{}/login/oauth/access_token", self.github_url))
        .header(ACCEPT, "application/json")
        .form(&[
          ("client_id", self.client_id.as_str()),
          ("device_code", code.device_code.as_str()),
          ("grant_type", GRANT_TYPE),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

      if let Some(token) = response.access_token.filter(|t| !t.is_empty()) {
        return Ok(token);
      }

      match response.error.as_deref() {
        Some("authorization_pending") => debug!("authorization pending"),
        Some("slow_down") => {
          interval = response
            .interval
            .map(Duration::from_secs)
            .unwrap_or(interval + SLOW_DOWN_STEP);
          debug!(interval = ?interval, "slowing down");
        }
        Some(error) => {
          return Err(AuthError::Login(
            response.error_description.unwrap_or_else(|| error.to_string()),
          ));
        }
        None => return Err(AuthError::Login("token response carried neither token nor error".to_string())),
      }
    }
  }

  async fn fetch_username(&self, token: &str) -> Result<String, AuthError> {
    let user: UserResponse = self
      .client
      .get(format!("{}/user", self.api_url))
      .header(ACCEPT, GITHUB_JSON)
      .bearer_auth(token)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;
    Ok(user.login)
  }
}

impl LoginFlow for DeviceFlowLogin {
  async fn login(&self) -> Result<Credential, AuthError> {
    let code = self.request_code().await?;
    (self.prompt)(&DeviceCode {
      user_code: code.user_code.clone(),
      verification_uri: code.verification_uri.clone(),
    });

    let token = self.poll_token(&code).await?;
    let username = self.fetch_username(&token).await?;
    Ok(Credential::new(username, token))
  }
}
