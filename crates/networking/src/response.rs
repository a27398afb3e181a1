//! Response values

use std::collections::HashMap;

/// An HTTP response described as plain data
///
/// Any status code can appear here; deciding what a 4xx or 5xx means is left
/// to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    payload: Vec<u8>,
}

impl Response {
    /// Create a new response
    pub fn new(status: u16, payload: Vec<u8>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            payload,
        }
    }

    /// Attach response headers
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the response body
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take ownership of the response body
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Get a header value (names are lower-case)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Check if the response is successful (2xx status)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
