//! Reqwest-backed resource fetcher.
//!
//! This adapter owns transport details only: URL resolution below the API
//! base, bearer headers, timeout, status classification, and JSON decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{FetchError, FetchRequest, HttpMethod, Payload, ResourceFetcher};

const DEFAULT_USER_AGENT: &str = concat!("bloodbank-console/", env!("CARGO_PKG_VERSION"));

/// Outbound identity sent with every request.
pub struct HttpIdentity {
    /// HTTP user-agent header.
    pub user_agent: String,
}

impl Default for HttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Fetcher that issues bearer-authenticated JSON requests below one base URL.
pub struct ReqwestResourceFetcher {
    client: Client,
    base: Url,
    user_agent: String,
}

impl ReqwestResourceFetcher {
    /// Build a fetcher with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(base, timeout, HttpIdentity::default())
    }

    /// Build a fetcher with an explicit outbound identity.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        base: Url,
        timeout: Duration,
        identity: HttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            user_agent: identity.user_agent,
        })
    }

    /// API base all request paths are resolved against.
    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl ResourceFetcher for ReqwestResourceFetcher {
    async fn request(&self, request: FetchRequest) -> Result<Payload, FetchError> {
        let url = resolve(&self.base, &request.path)?;
        debug!(method = %request.method, %url, "backend request");

        let mut builder = self
            .client
            .request(to_method(request.method), url)
            .bearer_auth(request.credential.expose())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode_payload(body.as_ref())
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn resolve(base: &Url, path: &str) -> Result<Url, FetchError> {
    if !path.starts_with('/') || path.starts_with("//") {
        return Err(FetchError::invalid_request(format!(
            "request path must start with a single '/': {path}"
        )));
    }
    let joined = format!("{}{path}", base.as_str().trim_end_matches('/'));
    Url::parse(&joined)
        .map_err(|error| FetchError::invalid_request(format!("invalid request URL {joined}: {error}")))
}

fn map_transport_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::network(format!("request timed out: {error}"))
    } else {
        FetchError::network(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> FetchError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FetchError::auth(status.as_u16()),
        _ => {
            let message = backend_message(body).unwrap_or_else(|| {
                let preview = body_preview(body);
                if preview.is_empty() {
                    format!("status {}", status.as_u16())
                } else {
                    preview
                }
            });
            FetchError::server(status.as_u16(), message)
        }
    }
}

fn backend_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

fn decode_payload(body: &[u8]) -> Result<Payload, FetchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|error| FetchError::decode(format!("invalid JSON payload: {error}")))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    fn base() -> Url {
        Url::parse("http://localhost:5000/api").expect("base url")
    }

    #[rstest]
    #[case("/auth/profile", "http://localhost:5000/api/auth/profile")]
    #[case("/admin/facility/approve/f1", "http://localhost:5000/api/admin/facility/approve/f1")]
    fn resolves_below_base(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(resolve(&base(), path).expect("resolve").as_str(), expected);
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let base = Url::parse("http://localhost:5000/api/").expect("base url");
        assert_eq!(
            resolve(&base, "/admin/donors").expect("resolve").as_str(),
            "http://localhost:5000/api/admin/donors"
        );
    }

    #[rstest]
    #[case("auth/profile")]
    #[case("")]
    #[case("//evil.example/steal")]
    fn rejects_paths_without_leading_slash(#[case] path: &str) {
        assert!(matches!(
            resolve(&base(), path),
            Err(FetchError::InvalidRequest { .. })
        ));
    }

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED)]
    #[case::forbidden(StatusCode::FORBIDDEN)]
    fn auth_statuses_map_to_auth(#[case] status: StatusCode) {
        let error = map_status_error(status, b"{\"message\":\"Invalid token\"}");
        assert_eq!(error, FetchError::auth(status.as_u16()));
    }

    #[rstest]
    #[case::bad_request(StatusCode::BAD_REQUEST)]
    #[case::not_found(StatusCode::NOT_FOUND)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR)]
    #[case::bad_gateway(StatusCode::BAD_GATEWAY)]
    fn other_statuses_map_to_server(#[case] status: StatusCode) {
        let error = map_status_error(status, b"{\"message\":\"Facility not found\"}");
        assert_eq!(
            error,
            FetchError::server(status.as_u16(), "Facility not found")
        );
    }

    #[test]
    fn server_message_falls_back_to_body_preview() {
        let error = map_status_error(StatusCode::BAD_GATEWAY, b"<html>\n  upstream down </html>");
        assert_eq!(
            error,
            FetchError::server(502_u16, "<html> upstream down </html>")
        );
    }

    #[test]
    fn empty_error_body_reports_status() {
        let error = map_status_error(StatusCode::SERVICE_UNAVAILABLE, b"");
        assert_eq!(error, FetchError::server(503_u16, "status 503"));
    }

    #[test]
    fn long_previews_are_truncated() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[rstest]
    #[case(b"" as &[u8], Value::Null)]
    #[case(b"  \n" as &[u8], Value::Null)]
    #[case(b"{\"donors\":[]}" as &[u8], serde_json::json!({ "donors": [] }))]
    fn decodes_success_bodies(#[case] body: &[u8], #[case] expected: Value) {
        assert_eq!(decode_payload(body).expect("decode"), expected);
    }

    #[test]
    fn non_json_success_body_is_decode_error() {
        assert!(matches!(
            decode_payload(b"<html>ok</html>"),
            Err(FetchError::Decode { .. })
        ));
    }
}
