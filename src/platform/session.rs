//! Session reset collaborators (`POST /start-new`)

use crate::platform::SessionService;
use crate::{Error, Result};
use serde::Deserialize;

/// Outcome of a successful reset: where the booth navigates next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReset {
    pub redirect: String,
}

/// `POST /start-new` response body
#[derive(Debug, Deserialize)]
pub struct StartNewResponse {
    pub ok: bool,
    #[serde(default)]
    pub redirect: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StartNewResponse {
    pub fn into_reset(self, fallback: &str) -> Result<SessionReset> {
        if !self.ok {
            return Err(Error::SessionError(
                self.error.unwrap_or_else(|| "backend refused session reset".into()),
            ));
        }
        Ok(SessionReset {
            redirect: self.redirect.unwrap_or_else(|| fallback.to_string()),
        })
    }
}

/// Resets the session on the booth backend.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSessionService {
    backend: crate::backend::BackendClient,
}

#[cfg(feature = "http")]
impl HttpSessionService {
    pub fn new(backend: crate::backend::BackendClient) -> Self {
        Self { backend }
    }
}

#[cfg(feature = "http")]
impl SessionService for HttpSessionService {
    async fn start_new(&self) -> Result<SessionReset> {
        let resp: StartNewResponse = self.backend.post_json(crate::backend::START_NEW_PATH).await?;
        let reset = resp.into_reset("/")?;
        log::info!("backend session reset, redirect to {}", reset.redirect);
        Ok(reset)
    }
}

/// Local-only reset for offline use; always sends the booth home.
#[derive(Debug, Clone)]
pub struct NoopSessionService {
    home: String,
}

impl NoopSessionService {
    pub fn new() -> Self {
        Self { home: "/".to_string() }
    }
}

impl Default for NoopSessionService {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionService for NoopSessionService {
    async fn start_new(&self) -> Result<SessionReset> {
        Ok(SessionReset { redirect: self.home.clone() })
    }
}
