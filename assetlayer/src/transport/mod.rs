//! Network transport for the remote asset API.
//!
//! The transport is split in two layers:
//!
//! - [`HttpTransport`]: performs a single attempt (implemented by
//!   [`ReqwestTransport`], or a mock in tests)
//! - [`RetryingTransport`]: turns one logical call into a bounded sequence of
//!   attempts with per-attempt timeout and exponential backoff
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use assetlayer::transport::{ReqwestTransport, RetryPolicy, RetryingTransport, TransportRequest};
//!
//! let transport = RetryingTransport::new(
//!     "http://localhost:5200",
//!     Arc::new(ReqwestTransport::new()?),
//!     RetryPolicy::exponential(2),
//!     Duration::from_secs(10),
//! );
//! let response = transport.execute(&TransportRequest::get("/api/v1/blob/abc")).await?;
//! ```

mod http;
mod retry;
mod types;

pub use http::{BoxFuture, HttpTransport, ReqwestTransport};
pub use retry::{
    RetryPolicy, RetryingTransport, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_DELAY_MS,
};
pub use types::{Method, TransportError, TransportRequest, TransportResponse};

#[cfg(test)]
pub use http::tests::{MockReply, MockTransport};
