//! HTTP session helpers — cookie warm-up and typed error mapping.
//!
//! NSE's JSON endpoints reject requests that arrive without the session
//! cookies set by the public site, so adapters warm the session with a
//! homepage GET before the API call. The session is created fresh per
//! adapter invocation and dropped afterwards — nothing persists.

use super::adapter::SourceError;
use std::time::Duration;

/// Browser User-Agent; the exchanges refuse the default reqwest UA.
pub const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// One ephemeral HTTP session with a cookie jar.
pub struct Session {
    client: reqwest::blocking::Client,
}

impl Session {
    /// Build a session with a bounded timeout and an enabled cookie store.
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_UA)
            .cookie_store(true)
            .build()
            .map_err(|e| SourceError::Network(format!("client build: {e}")))?;
        Ok(Self { client })
    }

    /// Hit a landing page so the provider sets its session cookies.
    pub fn warm_up(&self, url: &str) -> Result<(), SourceError> {
        let resp = self.client.get(url).send().map_err(map_transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// GET a JSON document, with an optional Referer header.
    pub fn get_json(&self, url: &str, referer: Option<&str>) -> Result<serde_json::Value, SourceError> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }
        let resp = request.send().map_err(map_transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
            });
        }
        resp.json()
            .map_err(|e| SourceError::Schema(format!("JSON body: {e}")))
    }

    /// GET a plain-text document (CSV archives), with an optional Referer.
    pub fn get_text(&self, url: &str, referer: Option<&str>) -> Result<String, SourceError> {
        let mut request = self.client.get(url);
        if let Some(referer) = referer {
            request = request.header("Referer", referer);
        }
        let resp = request.send().map_err(map_transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                status: status.as_u16(),
            });
        }
        resp.text()
            .map_err(|e| SourceError::Schema(format!("text body: {e}")))
    }
}

/// Transport-level reqwest failures are all network errors to us.
fn map_transport(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Network(format!("timeout: {e}"))
    } else {
        SourceError::Network(e.to_string())
    }
}
