//! HTTP client for the booth backend's JSON endpoints.
//!
//! The backend keys its state on a session cookie, so one client (with a
//! cookie store) is shared by every collaborator that talks to it.

use crate::{BoothConfig, Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const APPROVED_PATH: &str = "/api/approved";
pub const APPROVED_LIST_PATH: &str = "/api/approved-list";
pub const START_NEW_PATH: &str = "/start-new";

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base: Url,
}

impl BackendClient {
    pub fn new(config: &BoothConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| Error::ConfigError(format!("Invalid base URL {}: {}", config.base_url, e)))?;

        let mut headers = HeaderMap::new();
        for (k, v) in &config.headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .map_err(|e| Error::ConfigError(format!("Invalid header name {}: {}", k, e)))?;
            let value = HeaderValue::from_str(v)
                .map_err(|e| Error::ConfigError(format!("Invalid header value for {}: {}", k, e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::ConfigError(format!("Invalid endpoint {}: {}", path, e)))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        log::debug!("GET {}", url);
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("GET {} failed: {}", url, e)))?;
        Self::read_json(url, resp).await
    }

    pub async fn post_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        log::debug!("POST {}", url);
        let resp = self
            .client
            .post(url.clone())
            .header("Content-Type", "application/json")
            .body("{}")
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("POST {} failed: {}", url, e)))?;
        Self::read_json(url, resp).await
    }

    // The backend answers errors with the same `{ok: false, ...}` envelope
    // (e.g. 404 for missing approvals), so the body is parsed whatever the status.
    async fn read_json<T: DeserializeOwned>(url: Url, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::NetworkError(format!("Failed to read response body from {}: {}", url, e)))?;
        serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                Error::NetworkError(format!("Malformed response from {}: {}", url, e))
            } else {
                Error::NetworkError(format!("{} returned HTTP {}", url, status))
            }
        })
    }
}
