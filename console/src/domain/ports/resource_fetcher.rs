//! Driven port for authorized calls against the blood-bank backend.
//!
//! The domain owns the request descriptor and the failure taxonomy so the
//! bootstrapper and admin services stay transport-agnostic. Adapters own
//! URL resolution, headers, timeouts, and status classification.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;
use crate::domain::Credential;

/// Decoded JSON body of a successful response.
pub type Payload = Value;

/// HTTP verbs issued by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Read a resource.
    Get,
    /// Create a resource.
    Post,
    /// Update or transition a resource.
    Put,
    /// Remove a resource.
    Delete,
}

impl HttpMethod {
    /// Upper-case verb as it appears on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authorized request descriptor.
///
/// `path` is relative to the configured API base (for example
/// `/auth/profile`). The credential is a validated [`Credential`], so an
/// authorized call can never be issued with an empty token.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path below the API base, starting with `/`.
    pub path: String,
    /// Bearer credential attached to the call.
    pub credential: Credential,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl FetchRequest {
    /// Describe a `GET` request.
    ///
    /// # Examples
    /// ```
    /// use bloodbank_console::domain::Credential;
    /// use bloodbank_console::domain::ports::{FetchRequest, HttpMethod};
    ///
    /// let credential = Credential::new("abc.def").expect("token");
    /// let request = FetchRequest::get("/auth/profile", credential);
    /// assert_eq!(request.method, HttpMethod::Get);
    /// assert!(request.body.is_none());
    /// ```
    pub fn get(path: impl Into<String>, credential: Credential) -> Self {
        Self::new(HttpMethod::Get, path, credential)
    }

    /// Describe a `PUT` request.
    pub fn put(path: impl Into<String>, credential: Credential) -> Self {
        Self::new(HttpMethod::Put, path, credential)
    }

    /// Describe a request with an arbitrary verb.
    pub fn new(method: HttpMethod, path: impl Into<String>, credential: Credential) -> Self {
        Self {
            method,
            path: path.into(),
            credential,
            body: None,
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

define_port_error! {
    /// Classified failures of one backend call.
    pub enum FetchError {
        /// No response arrived: transport failure, refused connection, or timeout.
        Network { message: String } =>
            "network error: {message}",
        /// Backend rejected the credential (401 or 403).
        Auth { status: u16 } =>
            "authorization rejected with status {status}",
        /// Backend answered with another non-success status.
        Server { status: u16, message: String } =>
            "server error {status}: {message}",
        /// Success response carried a body that is not JSON.
        Decode { message: String } =>
            "response decode failed: {message}",
        /// Request descriptor was rejected before any network call.
        InvalidRequest { message: String } =>
            "invalid request: {message}",
    }
}

impl FetchError {
    /// Whether repeating the same call may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether the backend refused the credential.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

/// Port for issuing authorized backend calls.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Issue one request and classify the outcome.
    ///
    /// Implementations never touch shared session state; callers decide what
    /// a failure means for the stored credential.
    async fn request(&self, request: FetchRequest) -> Result<Payload, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FetchError::network("reset"), true, false)]
    #[case(FetchError::auth(401_u16), false, true)]
    #[case(FetchError::auth(403_u16), false, true)]
    #[case(FetchError::server(500_u16, "boom"), false, false)]
    #[case(FetchError::decode("not json"), false, false)]
    #[case(FetchError::invalid_request("bad path"), false, false)]
    fn classification_helpers(
        #[case] error: FetchError,
        #[case] retryable: bool,
        #[case] auth: bool,
    ) {
        assert_eq!(error.is_retryable(), retryable);
        assert_eq!(error.is_auth(), auth);
    }

    #[test]
    fn put_request_carries_body() {
        let credential = Credential::new("token-1").expect("valid token");
        let request = FetchRequest::put("/admin/facility/reject/1", credential)
            .with_body(serde_json::json!({ "rejectionReason": "expired licence" }));
        assert_eq!(request.method.to_string(), "PUT");
        assert!(request.body.is_some());
    }
}
