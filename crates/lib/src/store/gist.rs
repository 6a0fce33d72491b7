//! Manifest storage in a GitHub gist.
//!
//! The manifest gist is found by file name rather than by a stored ID, so any
//! machine logged in as the same user finds the same document:
//! - no gist has the file: loading yields an empty manifest and the first
//!   save creates a secret gist
//! - exactly one gist has it: that gist is read and updated
//! - several gists have it: [`StoreError::AmbiguousManifestLocation`]

use std::collections::HashMap;

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{ManifestStore, StoreError};
use crate::auth::Credential;
use crate::config::Config;
use crate::consts::{GIST_DESCRIPTION, MANIFEST_FILENAME};
use crate::manifest::Manifest;
use crate::util::http::{GITHUB_JSON, http_client};

const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct Gist {
  id: String,
  #[serde(default)]
  files: HashMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
  #[serde(default)]
  content: Option<String>,
  #[serde(default)]
  truncated: bool,
  #[serde(default)]
  raw_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GistStore {
  client: reqwest::Client,
  api_url: String,
  filename: String,
}

impl GistStore {
  pub fn new(config: &Config) -> Result<Self, StoreError> {
    Ok(Self {
      client: http_client()?,
      api_url: config.api_url.clone(),
      filename: MANIFEST_FILENAME.to_string(),
    })
  }

  fn request(&self, method: Method, url: &str, credential: &Credential) -> RequestBuilder {
    self
      .client
      .request(method, url)
      .header(ACCEPT, GITHUB_JSON)
      .bearer_auth(&credential.token)
  }

  /// Find the ID of the gist holding the manifest file.
  async fn find_gist(&self, credential: &Credential) -> Result<Option<String>, StoreError> {
    let mut ids = Vec::new();
    let mut page = 1;

    loop {
      let url = format!("{}/gists?per_page={}&page={}", self.api_url, PAGE_SIZE, page);
      let response = send(self.request(Method::GET, &url, credential), "GET", &url).await?;
      let gists: Vec<Gist> = response.json().await?;
      let count = gists.len();

      ids.extend(
        gists
          .into_iter()
          .filter(|g| g.files.contains_key(&self.filename))
          .map(|g| g.id),
      );

      if count < PAGE_SIZE {
        break;
      }
      page += 1;
    }

    match ids.len() {
      0 => Ok(None),
      1 => Ok(ids.pop()),
      _ => Err(StoreError::AmbiguousManifestLocation {
        filename: self.filename.clone(),
        ids,
      }),
    }
  }

  async fn read_gist_file(&self, credential: &Credential, gist_id: &str) -> Result<String, StoreError> {
    let url = format!("{}/gists/{}", self.api_url, gist_id);
    let response = send(self.request(Method::GET, &url, credential), "GET", &url).await?;
    let gist: Gist = response.json().await?;

    let Some(file) = gist.files.get(&self.filename) else {
      return Ok(String::new());
    };

    match (&file.content, &file.raw_url) {
      (Some(content), _) if !file.truncated => Ok(content.clone()),
      (_, Some(raw_url)) => {
        debug!(url = %raw_url, "gist file truncated, fetching raw content");
        let response = send(self.request(Method::GET, raw_url, credential), "GET", raw_url).await?;
        Ok(response.text().await?)
      }
      (content, None) => Ok(content.clone().unwrap_or_default()),
    }
  }
}

/// Send a request, turning non-success statuses into [`StoreError::Http`].
async fn send(request: RequestBuilder, method: &str, url: &str) -> Result<Response, StoreError> {
  let response = request.send().await?;
  let status = response.status();
  if !status.is_success() {
    return Err(StoreError::Http {
      method: method.to_string(),
      url: url.to_string(),
      status: status.as_u16(),
    });
  }
  Ok(response)
}

impl ManifestStore for GistStore {
  async fn load(&self, credential: &Credential) -> Result<Manifest, StoreError> {
    let Some(gist_id) = self.find_gist(credential).await? else {
      info!(user = %credential.username, "no manifest gist yet, starting empty");
      return Ok(Manifest::new());
    };

    let content = self.read_gist_file(credential, &gist_id).await?;
    let manifest = Manifest::from_yaml(&content)?;
    debug!(gist = %gist_id, packages = manifest.len(), "loaded manifest");
    Ok(manifest)
  }

  async fn save(&self, credential: &Credential, manifest: &Manifest) -> Result<(), StoreError> {
    let content = manifest.to_yaml()?;
    let mut files = serde_json::Map::new();
    files.insert(self.filename.clone(), json!({ "content": content }));

    match self.find_gist(credential).await? {
      Some(gist_id) => {
        let url = format!("{}/gists/{}", self.api_url, gist_id);
        let body = json!({ "files": files });
        send(self.request(Method::PATCH, &url, credential).json(&body), "PATCH", &url).await?;
        info!(gist = %gist_id, packages = manifest.len(), "saved manifest");
      }
      None => {
        let url = format!("{}/gists", self.api_url);
        let body = json!({ "description": GIST_DESCRIPTION, "public": false, "files": files });
        let response = send(self.request(Method::POST, &url, credential).json(&body), "POST", &url).await?;
        let created: Gist = response.json().await?;
        info!(gist = %created.id, packages = manifest.len(), "created manifest gist");
      }
    }

    Ok(())
  }

  async fn load_from_url(&self, url: &str) -> Result<Manifest, StoreError> {
    let response = send(self.client.get(url), "GET", url).await?;
    let content = response.text().await?;
    let manifest = Manifest::from_yaml(&content)?;
    debug!(url = %url, packages = manifest.len(), "loaded manifest from url");
    Ok(manifest)
  }
}
