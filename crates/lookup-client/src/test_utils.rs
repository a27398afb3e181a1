//! Test doubles for client and pipeline testing
//!
//! This module provides senders and serialization collaborators that record
//! what they were given and answer with canned data, so client behavior can
//! be checked without a network.

#![allow(dead_code)] // Test utilities may not all be used yet

use async_trait::async_trait;
use networking::{Request, Response, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Deserializer, Lookup, Result, Serializer};

// =============================================================================
// Senders
// =============================================================================

/// Sender that records every request and answers 200 with an empty body
#[derive(Debug, Default)]
pub struct RequestCapturingSender {
    requests: Mutex<Vec<Request>>,
}

impl RequestCapturingSender {
    /// Create a capturing sender
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the most recent request, if any was sent
    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().last().cloned()
    }

    /// Get the number of requests sent
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Sender for RequestCapturingSender {
    async fn send(&self, request: Request) -> networking::Result<Response> {
        self.requests.lock().push(request);
        Ok(Response::new(200, Vec::new()))
    }
}

/// Sender that answers every request with the same response
#[derive(Debug)]
pub struct MockSender {
    response: Response,
    requests: Mutex<Vec<Request>>,
}

impl MockSender {
    /// Create a sender answering with `response`
    pub fn new(response: Response) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Get the most recent request, if any was sent
    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Sender for MockSender {
    async fn send(&self, request: Request) -> networking::Result<Response> {
        self.requests.lock().push(request);
        Ok(self.response.clone())
    }
}

/// Sender that fails with an I/O error a fixed number of times, then answers 200
#[derive(Debug)]
pub struct FailingSender {
    failures: usize,
    calls: AtomicUsize,
}

impl FailingSender {
    /// Fail the first `failures` calls
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every call
    pub fn always() -> Self {
        Self::new(usize::MAX)
    }

    /// Get the number of calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Sender for FailingSender {
    async fn send(&self, _request: Request) -> networking::Result<Response> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(networking::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        } else {
            Ok(Response::new(200, Vec::new()))
        }
    }
}

// =============================================================================
// Serialization Collaborators
// =============================================================================

/// Serializer returning a fixed payload
#[derive(Debug, Clone, Default)]
pub struct FakeSerializer {
    payload: Vec<u8>,
}

impl FakeSerializer {
    /// Create a serializer producing `payload`
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }
}

impl Serializer for FakeSerializer {
    fn serialize<R>(&self, _lookups: &[Lookup<R>]) -> Result<Vec<u8>> {
        Ok(self.payload.clone())
    }
}

/// Deserializer returning fixed results and recording the payloads it saw
#[derive(Debug)]
pub struct FakeDeserializer<R> {
    results: Vec<R>,
    payloads: Mutex<Vec<Vec<u8>>>,
}

impl<R> FakeDeserializer<R> {
    /// Create a deserializer producing `results`
    pub fn new(results: Vec<R>) -> Self {
        Self {
            results,
            payloads: Mutex::new(Vec::new()),
        }
    }

    /// Get every payload passed to `deserialize`
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.payloads.lock().clone()
    }
}

impl<R: Clone + Send + Sync> Deserializer for FakeDeserializer<R> {
    type Output = R;

    fn deserialize(&self, payload: &[u8]) -> Result<Vec<R>> {
        self.payloads.lock().push(payload.to_vec());
        Ok(self.results.clone())
    }
}
