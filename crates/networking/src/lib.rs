//! Networking utilities for Streetwise
//!
//! This crate provides the request-dispatch pipeline: plain request/response
//! values, the [`Sender`] capability, and the decorators that compose around
//! it (credential signing, retry with an explicit policy) on top of a
//! reqwest-backed transport.
//!
//! A typical chain is built inside out:
//!
//! ```no_run
//! use std::sync::Arc;
//! use networking::{
//!     HttpSender, RetryConfig, RetrySender, SigningSender, StaticCredentials, TransportConfig,
//! };
//!
//! # fn build() -> networking::Result<()> {
//! let transport = HttpSender::new(TransportConfig::default())?;
//! let retry = RetrySender::new(RetryConfig::new(5), transport);
//! let sender = SigningSender::new(Arc::new(StaticCredentials::new("id", "token")), retry);
//! # let _ = sender;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::time::Duration;

pub mod blocking;
pub mod request;
pub mod response;
pub mod retry;
pub mod sender;
pub mod signing;
pub mod transport;

pub use blocking::BlockingSender;
pub use request::{HttpMethod, Request};
pub use response::Response;
pub use retry::{DefaultRetryPolicy, RetryConfig, RetryDecision, RetryPolicy, RetrySender};
pub use sender::Sender;
pub use signing::{SharedCredentials, Signer, SigningSender, StaticCredentials};
pub use transport::{HttpSender, ProxyConfig, TransportConfig};

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of a single request/response exchange
///
/// None of these carry an HTTP status: a response with a 4xx or 5xx status
/// is still a successful exchange at this layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP exchange could not be completed (connect, timeout, body stream)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O failure below or around the HTTP exchange
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single attempt exceeded its time limit
    #[error("Attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be turned into a valid HTTP request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A blocking entry point was created from inside an async runtime
    #[error("Blocking client used from within an async runtime; use the async API instead")]
    NestedRuntime,
}

impl Error {
    /// Check if no response was obtained because of the network or the clock
    ///
    /// These failures are transient by nature; an invalid request will fail
    /// the same way on every attempt.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Io(_) | Error::Timeout(_))
    }
}
