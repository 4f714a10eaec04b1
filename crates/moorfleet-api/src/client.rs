// Backend HTTP client
//
// Wraps `reqwest::Client` with URL construction under the `/api` prefix,
// status-code mapping, and JSON decoding. Endpoint groups (units, kpis,
// alarms) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{Confirmation, ErrorBody};
use crate::transport::TransportConfig;

/// Raw HTTP client for the MoorFleet backend.
///
/// All methods return decoded wire records; status handling is uniform:
/// 404 becomes [`Error::NotFound`], other failures [`Error::Http`].
#[derive(Debug, Clone)]
pub struct FleetClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl FleetClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the deployment root, e.g. `http://127.0.0.1:5000`.
    /// Endpoint paths are appended under `{base_url}/api/`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: TransportConfig::default().timeout,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    /// Build an API URL carrying a `range` query parameter.
    pub(crate) fn api_url_with_range(&self, path: &str, range: &str) -> Result<Url, Error> {
        let mut url = self.api_url(path)?;
        url.query_pairs_mut().append_pair("range", range);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(|e| self.send_error(e))?;
        let body = Self::checked_body(resp).await?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Send a lifecycle POST and interpret the confirmation.
    ///
    /// An empty 2xx body counts as confirmed; a JSON body with
    /// `success: false` (or `ok: false`) is a rejection.
    pub(crate) async fn post_confirm(&self, url: Url) -> Result<(), Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).send().await.map_err(|e| self.send_error(e))?;
        let body = Self::checked_body(resp).await?;

        if body.trim().is_empty() {
            return Ok(());
        }

        match serde_json::from_str::<Confirmation>(&body) {
            Ok(confirmation) if !confirmation.is_confirmed() => Err(Error::Rejected {
                message: confirmation
                    .message
                    .or(confirmation.error)
                    .unwrap_or_else(|| "transition declined".into()),
            }),
            // Non-JSON or confirming bodies are both fine on a 2xx.
            _ => Ok(()),
        }
    }

    fn send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Map the status line to an error, returning the body text on success.
    async fn checked_body(resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let path = resp.url().path().to_owned();
        let body = resp.text().await.map_err(Error::Transport)?;

        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(&body, status);
        match status.as_u16() {
            404 => Err(Error::NotFound { path }),
            409 | 422 => Err(Error::Rejected { message }),
            code => Err(Error::Http {
                status: code,
                message,
            }),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers failures with `{"error": "..."}`; anything else
/// falls back to the raw body, then to the canonical status reason.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(msg) = parsed.error.or(parsed.message) {
            return msg;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned()
    } else {
        trimmed.to_owned()
    }
}
