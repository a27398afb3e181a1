//! Request values
//!
//! A [`Request`] is plain data describing one HTTP exchange. Senders receive
//! it by value, so a decorator that changes it (a signer adding credentials)
//! hands a new value down the chain instead of editing the caller's copy.

use std::collections::HashMap;

/// HTTP method for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// GET request (single lookups, parameters in the query string)
    #[default]
    Get,
    /// POST request (batches, lookups in the payload)
    Post,
}

impl HttpMethod {
    /// Get the method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data
///
/// The final URL is resolved by [`Request::url`] from the URL prefix and the
/// ordered query parameters.
///
/// # Examples
/// ```
/// use networking::Request;
///
/// let request = Request::get("http://localhost/")
///     .param("city", "Provo")
///     .param("state", "UT");
/// assert_eq!(request.url(), "http://localhost/?city=Provo&state=UT");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    method: HttpMethod,
    url_prefix: String,
    parameters: Vec<(String, String)>,
    headers: HashMap<String, String>,
    payload: Option<Vec<u8>>,
}

impl Request {
    /// Create a GET request for a URL prefix
    pub fn get(url_prefix: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url_prefix: url_prefix.into(),
            ..Default::default()
        }
    }

    /// Create a POST request carrying a payload
    pub fn post(url_prefix: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::Post,
            url_prefix: url_prefix.into(),
            payload: Some(payload),
            ..Default::default()
        }
    }

    /// Append a query parameter
    ///
    /// Parameters with an empty name or value are skipped, so optional
    /// fields never show up as `name=` in the URL.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if !name.is_empty() && !value.is_empty() {
            self.parameters.push((name, value));
        }
        self
    }

    /// Set a header, replacing any previous value under the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the payload
    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Get the HTTP method
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Get the URL without query parameters
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Get the query parameters in the order they were added
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Get the request headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Get the payload, if any
    pub fn payload_bytes(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Resolve the final URL
    ///
    /// Parameters are percent-encoded and joined with `&`. The first
    /// separator is `?`, or `&` when the prefix already carries a query.
    pub fn url(&self) -> String {
        let mut url = self.url_prefix.clone();
        let mut separator = if url.contains('?') { "&" } else { "?" };
        if url.ends_with('?') || url.ends_with('&') {
            separator = "";
        }

        for (name, value) in &self.parameters {
            url.push_str(separator);
            url.push_str(&urlencoding::encode(name));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            separator = "&";
        }

        url
    }
}
