//! Request signing
//!
//! A [`Signer`] attaches authentication material to a request. The
//! [`SigningSender`] decorator signs every request before delegating it.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::{Request, Response, Result, Sender};

/// Attach authentication material to a request
///
/// Implementations must be deterministic: the same request and the same
/// credentials always produce the same signed request.
pub trait Signer: Send + Sync {
    /// Return an authenticated copy of the request
    fn sign(&self, request: Request) -> Request;
}

// =============================================================================
// Credentials
// =============================================================================

/// Secret-key credentials sent as `auth-id` / `auth-token` query parameters
///
/// # Examples
/// ```
/// use networking::{Request, Signer, StaticCredentials};
///
/// let signer = StaticCredentials::new("id", "secret");
/// let signed = signer.sign(Request::get("http://localhost/"));
/// assert_eq!(signed.url(), "http://localhost/?auth-id=id&auth-token=secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    auth_id: String,
    auth_token: String,
}

impl StaticCredentials {
    /// Create credentials from an auth id and auth token
    ///
    /// Empty parts are never sent, so incomplete credentials leave requests
    /// unsigned. This is logged as a warning.
    pub fn new(auth_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        let credentials = Self {
            auth_id: auth_id.into(),
            auth_token: auth_token.into(),
        };
        if !credentials.is_complete() {
            tracing::warn!("auth id or auth token is empty, requests will not be authenticated");
        }
        credentials
    }

    /// Check that both the auth id and the auth token are non-empty
    pub fn is_complete(&self) -> bool {
        !self.auth_id.is_empty() && !self.auth_token.is_empty()
    }

    /// Read credentials from two environment variables
    ///
    /// Returns `None` if either variable is unset or empty.
    pub fn from_env(id_var: &str, token_var: &str) -> Option<Self> {
        let auth_id = std::env::var(id_var).ok().filter(|v| !v.is_empty())?;
        let auth_token = std::env::var(token_var).ok().filter(|v| !v.is_empty())?;
        Some(Self::new(auth_id, auth_token))
    }

    /// Get the auth id
    pub fn auth_id(&self) -> &str {
        &self.auth_id
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("auth_id", &self.auth_id)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl Signer for StaticCredentials {
    fn sign(&self, request: Request) -> Request {
        if !self.is_complete() {
            tracing::warn!(url = %request.url_prefix(), "sending request with incomplete credentials");
        }
        request
            .param("auth-id", self.auth_id.as_str())
            .param("auth-token", self.auth_token.as_str())
    }
}

/// Embedded-key credentials for browser-style access
///
/// Sends the key as a `key` query parameter and identifies the calling site
/// through the `Referer` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedCredentials {
    key: String,
    host: String,
}

impl SharedCredentials {
    /// Create credentials from an embedded key and the host it is registered to
    pub fn new(key: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            host: host.into(),
        }
    }
}

impl Signer for SharedCredentials {
    fn sign(&self, request: Request) -> Request {
        request
            .param("key", self.key.as_str())
            .header("Referer", format!("https://{}", self.host))
    }
}

// =============================================================================
// Signing Sender
// =============================================================================

/// Sender that signs each request, then delegates to the inner sender
///
/// Failures from the inner sender are returned untouched.
#[derive(Clone)]
pub struct SigningSender<S> {
    signer: Arc<dyn Signer>,
    inner: S,
}

impl<S: Sender> SigningSender<S> {
    /// Wrap a sender with a signer
    pub fn new(signer: Arc<dyn Signer>, inner: S) -> Self {
        Self { signer, inner }
    }

    /// Get the wrapped sender
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S> fmt::Debug for SigningSender<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSender").finish_non_exhaustive()
    }
}

#[async_trait]
impl<S: Sender> Sender for SigningSender<S> {
    async fn send(&self, request: Request) -> Result<Response> {
        let signed = self.signer.sign(request);
        tracing::trace!(url = %signed.url_prefix(), "request signed");
        self.inner.send(signed).await
    }
}
