// Async HTTP client for the workload management REST API.
//
// Base path: /api/v1/ (plus /health at the root)
// Auth: none

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::models::HealthResponse;
use crate::transport::TransportConfig;

/// How a non-2xx response is turned into an [`Error`].
#[derive(Debug, Clone, Copy)]
pub(crate) enum ErrorPolicy {
    /// Fixed message; the server's body is only logged.
    Generic(&'static str),
    /// The server's body text is the message.
    ServerText,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the workload management API.
///
/// One HTTP request per call. No retry, no caching, no request timeout.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the API at `base_url` (e.g. `http://localhost:8081`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(Url::parse(base_url)?);
        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: Self::normalize_base_url(base_url),
        }
    }

    /// The base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn normalize_base_url(mut url: Url) -> Url {
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments onto the base URL, percent-encoding each one.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `api/v1/<segments...>`
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut all = vec!["api", "v1"];
        all.extend_from_slice(segments);
        self.url(&all)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        policy: ErrorPolicy,
    ) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::decode(Self::check_status(resp, policy).await?).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
        policy: ErrorPolicy,
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        Self::decode(Self::check_status(resp, policy).await?).await
    }

    /// POST `body`. Any 2xx counts as accepted; a reply that does not
    /// decode as `T` yields `None` rather than an error.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
        policy: ErrorPolicy,
    ) -> Result<Option<T>, Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        let resp = Self::check_status(resp, policy).await?;
        match Self::decode(resp).await {
            Ok(value) => Ok(Some(value)),
            Err(Error::Deserialization { message, .. }) => {
                debug!(%message, "accepted with an unreadable reply");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// DELETE. Only the status matters; the body is never read.
    pub(crate) async fn delete(&self, url: Url, policy: ErrorPolicy) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        Self::check_status(resp, policy).await?;
        Ok(())
    }

    // ── Response handling ────────────────────────────────────────────

    async fn check_status(
        resp: reqwest::Response,
        policy: ErrorPolicy,
    ) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            Err(Self::parse_error(status, resp, policy).await)
        }
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn parse_error(
        status: reqwest::StatusCode,
        resp: reqwest::Response,
        policy: ErrorPolicy,
    ) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let raw = raw.trim();
        debug!(status = status.as_u16(), body = raw, "request failed");

        match policy {
            ErrorPolicy::Generic(message) => Error::Status {
                status: status.as_u16(),
                message: message.to_owned(),
            },
            ErrorPolicy::ServerText => Error::Rejected {
                status: status.as_u16(),
                body: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw.to_owned()
                },
            },
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Health ───────────────────────────────────────────────────────

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthResponse, Error> {
        let url = self.url(&["health"])?;
        self.get(url, ErrorPolicy::Generic("Health check failed"))
            .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), Url::parse(base).unwrap())
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        assert_eq!(client("http://localhost:8081").base_url().as_str(), "http://localhost:8081/");
        assert_eq!(client("http://host/prefix//").base_url().as_str(), "http://host/prefix/");
    }

    #[test]
    fn api_url_keeps_prefix_and_encodes_ids() {
        let c = client("http://host/prefix");
        let url = c.api_url(&["entries", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://host/prefix/api/v1/entries/a%20b%2Fc");
    }
}
