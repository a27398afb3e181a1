//! Address lookup client library
//!
//! This crate turns address lookups into HTTP exchanges and back: a single
//! [`Lookup`] goes out as one GET, a [`Batch`] of lookups as one POST, and the
//! deserialized results are written back onto the lookups in order.
//!
//! The sender chain underneath comes from the `networking` crate and is
//! assembled by [`ClientBuilder`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod blocking;
pub mod builder;
pub mod client;
pub mod lookup;
pub mod serialize;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use batch::{Batch, MAX_BATCH_SIZE};
pub use blocking::BlockingClient;
pub use builder::ClientBuilder;
pub use client::Client;
pub use lookup::Lookup;
pub use serialize::{Deserializer, JsonDeserializer, JsonSerializer, Serializer};

/// Boxed error from a serialization collaborator
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for lookup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for lookup operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No response was obtained from the service
    #[error(transparent)]
    Transport(#[from] networking::Error),

    /// A lookup was added to a batch that is already full
    #[error("Batch is full: capacity of {capacity} lookups reached")]
    BatchFull {
        /// Capacity of the batch
        capacity: usize,
    },

    /// Lookups could not be serialized into a request payload
    #[error("Serialization error: {0}")]
    Serialization(#[source] BoxError),

    /// The response payload could not be deserialized
    #[error("Deserialization error: {0}")]
    Deserialization(#[source] BoxError),

    /// The service answered with a different number of results than lookups sent
    #[error("Result count mismatch: sent {expected} lookups, received {actual} results")]
    ResultCountMismatch {
        /// Number of lookups sent
        expected: usize,
        /// Number of results received
        actual: usize,
    },

    /// The service answered with an error status
    #[error("Service error ({status}): {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        message: String,
    },
}

impl Error {
    /// Check if the request never produced a response
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Error::Transport(err) if err.is_transport_failure())
    }
}
