//! Request, response and error types shared by transport implementations.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// HTTP method of a transport request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// One logical call against the remote API.
///
/// `path` is relative to the configured base URL and always starts with `/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    /// JSON body for `POST` requests.
    pub body: Option<Bytes>,
}

impl TransportRequest {
    /// A `GET` request without a body.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    /// A `POST` request carrying a JSON body.
    pub fn post_json(path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body.into()),
        }
    }
}

/// A fully read HTTP response.
///
/// Any status code is a valid response; only network-level problems are
/// [`TransportError`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response from a status and body.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Network-layer failure of a transport attempt.
///
/// These are the only failures the retrying transport retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The attempt did not complete within the per-attempt timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request failed after the connection was established.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Build(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
    }

    #[test]
    fn test_request_constructors() {
        let get = TransportRequest::get("/api/v1/blob/abc");
        assert_eq!(get.method, Method::Get);
        assert!(get.body.is_none());

        let post = TransportRequest::post_json("/api/v1/batch", b"[]".to_vec());
        assert_eq!(post.method, Method::Post);
        assert_eq!(post.body.as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn test_response_success_range() {
        assert!(TransportResponse::new(200, Vec::new()).is_success());
        assert!(TransportResponse::new(204, Vec::new()).is_success());
        assert!(!TransportResponse::new(404, Vec::new()).is_success());
        assert!(!TransportResponse::new(503, Vec::new()).is_success());
    }

    #[test]
    fn test_response_json() {
        let response = TransportResponse::new(200, br#"{"ok":true}"#.to_vec());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["ok"], true);

        let broken = TransportResponse::new(200, b"not json".to_vec());
        assert!(broken.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "request timed out after 250ms");

        let err = TransportError::Connect("refused".to_string());
        assert!(err.to_string().contains("refused"));
    }
}
