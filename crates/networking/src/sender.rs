//! The sender capability
//!
//! Every stage of the pipeline (signing, retry, transport) implements the
//! same one-method trait, and stages are composed by constructing one around
//! another.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Send a request, obtain a response
///
/// An implementation returns `Ok` for every completed exchange, whatever the
/// status code. `Err` means no response was obtained at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sender: Send + Sync {
    /// Perform one request/response exchange
    async fn send(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<S: Sender + ?Sized> Sender for Box<S> {
    async fn send(&self, request: Request) -> Result<Response> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<S: Sender + ?Sized> Sender for Arc<S> {
    async fn send(&self, request: Request) -> Result<Response> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<S: Sender + ?Sized> Sender for &S {
    async fn send(&self, request: Request) -> Result<Response> {
        (**self).send(request).await
    }
}
