//! HTTP gateway
//!
//! Talks to the dashboard backend:
//!
//! - `GET  {base}/api/dashboard-content` returns `{ content, history, ... }`
//! - `POST {base}/api/dashboard-content` stores a document and echoes it back
//! - `POST {base}/api/backgrounds/upload` accepts multipart `backgrounds` files
//!
//! Older backends have no backgrounds endpoint. When it answers 404 the
//! upload is retried against `{base}/api/news/upload` with field `images`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{GatewayError, GatewayResult, PersistenceGateway, BLOB_PREFIX, FILE_PREFIX};
use crate::config::Config;
use crate::document::Document;

const CONTENT_PATH: &str = "/api/dashboard-content";
const BACKGROUND_UPLOAD_PATH: &str = "/api/backgrounds/upload";
const BACKGROUND_FIELD: &str = "backgrounds";
const FALLBACK_UPLOAD_PATH: &str = "/api/news/upload";
const FALLBACK_FIELD: &str = "images";

/// Upload endpoint response
#[derive(Debug, Default, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    urls: Vec<String>,
}

/// A local file read into memory, ready for a multipart form
struct PendingFile {
    name: String,
    bytes: Vec<u8>,
}

/// Gateway for the dashboard backend
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpGateway {
    /// Create a gateway for `base_url`
    ///
    /// A trailing slash on the base URL is ignored.
    pub fn new(
        base_url: &str,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vellum/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            auth_token: auth_token.filter(|t| !t.is_empty()),
        })
    }

    /// Create a gateway from the application configuration
    pub fn from_config(config: &Config) -> GatewayResult<Self> {
        Self::new(
            &config.backend_url,
            config.auth_token.clone(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, if any
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Post files to one upload endpoint
    async fn post_files(
        &self,
        path: &str,
        field: &str,
        files: &[PendingFile],
    ) -> GatewayResult<reqwest::Response> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
            form = form.part(field.to_string(), part);
        }

        let url = self.url(path);
        debug!("Uploading {} file(s) to {}", files.len(), url);
        let response = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    fn location(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch_document(&self) -> GatewayResult<Value> {
        let url = self.url(CONTENT_PATH);
        debug!("Fetching document from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status.as_u16(), &url));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| GatewayError::InvalidFormat {
            details: format!("{}: {}", url, e),
        })
    }

    async fn save_document(&self, document: &Document) -> GatewayResult<Value> {
        let url = self.url(CONTENT_PATH);
        debug!(
            "Saving document to {} ({} history entries)",
            url,
            document.history.len()
        );

        let response = self
            .authorize(self.client.post(&url))
            .json(document)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status.as_u16(), &url));
        }

        // Some deployments answer with an empty body
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(document.to_value()?);
        }
        serde_json::from_str(&text).map_err(|e| GatewayError::InvalidFormat {
            details: format!("{}: {}", url, e),
        })
    }

    async fn upload_assets(&self, assets: &[String]) -> GatewayResult<Vec<String>> {
        if assets.is_empty() {
            return Ok(Vec::new());
        }

        let files = assets
            .iter()
            .map(|reference| read_pending_file(reference))
            .collect::<GatewayResult<Vec<_>>>()?;

        let mut response = self
            .post_files(BACKGROUND_UPLOAD_PATH, BACKGROUND_FIELD, &files)
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!(
                "{} is missing on this backend, falling back to {}",
                BACKGROUND_UPLOAD_PATH, FALLBACK_UPLOAD_PATH
            );
            response = self
                .post_files(FALLBACK_UPLOAD_PATH, FALLBACK_FIELD, &files)
                .await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(GatewayError::EndpointUnavailable {
                    url: self.url(FALLBACK_UPLOAD_PATH),
                });
            }
        }

        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            return Err(GatewayError::from_status(status.as_u16(), &url));
        }

        let body: UploadResponse = response.json().await?;
        let urls: Vec<String> = body
            .urls
            .iter()
            .map(|url| absolute_url(&self.base_url, url))
            .collect();

        if urls.len() != files.len() {
            return Err(GatewayError::InvalidFormat {
                details: format!(
                    "upload returned {} URL(s) for {} file(s)",
                    urls.len(),
                    files.len()
                ),
            });
        }

        info!("Uploaded {} background image(s)", urls.len());
        Ok(urls)
    }
}

/// Strip trailing slashes from a base URL
fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Prefix server-relative URLs with the base URL
fn absolute_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else if url.starts_with('/') {
        format!("{}{}", base_url, url)
    } else {
        format!("{}/{}", base_url, url)
    }
}

/// Read a `file://` reference for upload
fn read_pending_file(reference: &str) -> GatewayResult<PendingFile> {
    if reference.starts_with(BLOB_PREFIX) {
        return Err(GatewayError::UnreadableAsset {
            reference: reference.to_string(),
            reason: "browser object URLs cannot be read outside the page that created them"
                .to_string(),
        });
    }

    let path = reference
        .strip_prefix(FILE_PREFIX)
        .map(Path::new)
        .ok_or_else(|| GatewayError::UnreadableAsset {
            reference: reference.to_string(),
            reason: "not a local file reference".to_string(),
        })?;

    let bytes = std::fs::read(path).map_err(|e| GatewayError::UnreadableAsset {
        reference: reference.to_string(),
        reason: e.to_string(),
    })?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("background")
        .to_string();

    Ok(PendingFile { name, bytes })
}
