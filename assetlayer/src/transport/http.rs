//! HTTP transport abstraction for testability

use std::future::Future;
use std::pin::Pin;

use reqwest::header::CONTENT_TYPE;

use super::types::{Method, TransportError, TransportRequest, TransportResponse};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for issuing a single HTTP attempt.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock transports in tests. Implementations perform exactly one
/// attempt; timeouts and retries belong to
/// [`RetryingTransport`](super::RetryingTransport).
pub trait HttpTransport: Send + Sync {
    /// Sends `request` to `url` and reads the full response body.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL (base address joined with `request.path`)
    /// * `request` - Method, path and optional body
    ///
    /// # Returns
    ///
    /// The response for any HTTP status, or a [`TransportError`] if no
    /// response could be obtained.
    fn send<'a>(
        &'a self,
        url: &'a str,
        request: &'a TransportRequest,
    ) -> BoxFuture<'a, Result<TransportResponse, TransportError>>;
}

/// Real HTTP transport implementation using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a new ReqwestTransport with default configuration.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps an already configured reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        url: &'a str,
        request: &'a TransportRequest,
    ) -> BoxFuture<'a, Result<TransportResponse, TransportError>> {
        Box::pin(async move {
            let builder = match request.method {
                Method::Get => self.client.get(url),
                Method::Post => {
                    let builder = self
                        .client
                        .post(url)
                        .header(CONTENT_TYPE, "application/json");
                    match &request.body {
                        Some(body) => builder.body(body.clone()),
                        None => builder,
                    }
                }
            };

            let response = builder.send().await.map_err(classify_error)?;
            let status = response.status().as_u16();

            // The body is read inside the attempt so the timeout covers it
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;

            Ok(TransportResponse { status, body })
        })
    }
}

fn classify_error(error: reqwest::Error) -> TransportError {
    if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
