//! Blocking entry point
//!
//! [`BlockingSender`] drives the very same `send` future as the async path on
//! a private current-thread runtime, so both modes share one algorithm.
//! Creating one from inside an async runtime fails with
//! [`Error::NestedRuntime`](crate::Error::NestedRuntime).

use tokio::runtime::{Builder, Handle, Runtime};

use crate::{Error, Request, Response, Result, Sender};

/// Blocking adapter over any [`Sender`]
#[derive(Debug)]
pub struct BlockingSender<S> {
    inner: S,
    runtime: Runtime,
}

impl<S: Sender> BlockingSender<S> {
    /// Wrap a sender
    pub fn new(inner: S) -> Result<Self> {
        if Handle::try_current().is_ok() {
            return Err(Error::NestedRuntime);
        }
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { inner, runtime })
    }

    /// Send a request, blocking the calling thread until it completes
    pub fn send(&self, request: Request) -> Result<Response> {
        self.runtime.block_on(self.inner.send(request))
    }

    /// Get the wrapped sender
    pub fn inner(&self) -> &S {
        &self.inner
    }
}
