// Gateway HTTP client
//
// Wraps `reqwest::Client` with gateway URL construction and response
// checking. Every method is a single request; retries and state live in
// `debot-core`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ConfigDocument, CronStatus, Status};
use crate::transport::TransportConfig;

/// Longest body excerpt kept in deserialization error messages.
const BODY_PREVIEW_LEN: usize = 200;

/// HTTP client for the debot gateway's `/api` surface.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GatewayClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the gateway root (e.g. `http://127.0.0.1:8000`). A path
    /// prefix is kept, so a gateway behind `https://host/debot/` works too.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The gateway base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /api/status`
    pub async fn get_status(&self) -> Result<Status, Error> {
        self.get(self.api_url(&["status"])?).await
    }

    /// `GET /api/status/cron`
    pub async fn get_cron(&self) -> Result<CronStatus, Error> {
        self.get(self.api_url(&["status", "cron"])?).await
    }

    /// `GET /api/config`
    pub async fn get_config(&self) -> Result<ConfigDocument, Error> {
        self.get(self.api_url(&["config"])?).await
    }

    /// `GET /api/config/{section}`
    pub async fn get_section(&self, section: &str) -> Result<Value, Error> {
        self.get(self.api_url(&["config", section])?).await
    }

    /// `PUT /api/config/{section}`, returning the gateway's canonical copy.
    pub async fn put_section(&self, section: &str, body: &Value) -> Result<Value, Error> {
        self.put(self.api_url(&["config", section])?, body).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{segments...}`. Each segment is percent-encoded,
    /// so a section name can never escape its path position.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(format!("{} cannot be a base", self.base_url)))?;
            path.pop_if_empty().push("api");
            path.extend(segments);
        }
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        parse_json(resp).await
    }

    async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_json(resp).await
    }
}

/// Check the status, then decode the body as JSON.
///
/// Non-success bodies are returned verbatim in `Error::Api` so callers can
/// show the gateway's own wording.
async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();

    if !status.is_success() {
        let message = match resp.text().await {
            Ok(body) if !body.trim().is_empty() => body,
            Ok(_) => fallback_message(status, None),
            Err(e) => fallback_message(status, Some(&e)),
        };
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;

    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(BODY_PREVIEW_LEN).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Message for a rejection whose body is empty or unreadable.
fn fallback_message(status: reqwest::StatusCode, read_error: Option<&reqwest::Error>) -> String {
    let reason = status.canonical_reason().unwrap_or("request failed");
    match read_error {
        Some(e) => format!("HTTP {} {reason} ({e})", status.as_u16()),
        None => format!("HTTP {} {reason}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client(base: &str) -> GatewayClient {
        GatewayClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn api_url_from_root() {
        let c = client("http://127.0.0.1:8000");
        assert_eq!(
            c.api_url(&["status", "cron"]).unwrap().as_str(),
            "http://127.0.0.1:8000/api/status/cron"
        );
    }

    #[test]
    fn api_url_keeps_path_prefix() {
        let c = client("https://example.com/debot/");
        assert_eq!(
            c.api_url(&["config"]).unwrap().as_str(),
            "https://example.com/debot/api/config"
        );
    }

    #[test]
    fn api_url_encodes_section_names() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.api_url(&["config", "../status"]).unwrap().as_str(),
            "http://localhost:8000/api/config/..%2Fstatus"
        );
    }

    #[test]
    fn fallback_message_uses_canonical_reason() {
        assert_eq!(
            fallback_message(reqwest::StatusCode::BAD_GATEWAY, None),
            "HTTP 502 Bad Gateway"
        );
        assert_eq!(
            fallback_message(reqwest::StatusCode::from_u16(599).unwrap(), None),
            "HTTP 599 request failed"
        );
    }
}
