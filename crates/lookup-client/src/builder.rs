//! Client construction
//!
//! [`ClientBuilder`] gathers the construction-time options and composes the
//! sender chain: signing around retry around the transport.
//!
//! # Examples
//! ```no_run
//! use lookup_client::{ClientBuilder, Lookup};
//! use networking::StaticCredentials;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! struct Candidate {
//!     delivery_line_1: String,
//! }
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new("https://us-street.api.example.com/street-address")
//!         .with_credentials(StaticCredentials::new("auth-id", "auth-token"))
//!         .retry_at_most(3)
//!         .build_json::<Vec<Candidate>>()?;
//!
//!     let mut lookup = Lookup::new()
//!         .field("street", "1600 Amphitheatre Pkwy")
//!         .field("city", "Mountain View")
//!         .field("state", "CA");
//!     client.send_lookup(&mut lookup).await?;
//!
//!     match lookup.result() {
//!         Some(candidates) if !candidates.is_empty() => {
//!             println!("valid: {}", candidates[0].delivery_line_1)
//!         }
//!         _ => println!("no candidates, the address is not valid"),
//!     }
//!     Ok(())
//! }
//! ```

use networking::{
    HttpSender, ProxyConfig, RetryConfig, RetryPolicy, RetrySender, Sender, Signer,
    SigningSender, StaticCredentials, TransportConfig,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    Client, Deserializer, JsonDeserializer, JsonSerializer, Result, Serializer, MAX_BATCH_SIZE,
};

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: usize = 5;

/// Builder for [`Client`]
pub struct ClientBuilder {
    base_url: String,
    signer: Option<Arc<dyn Signer>>,
    retry: RetryConfig,
    retry_policy: Option<Arc<dyn RetryPolicy>>,
    transport: TransportConfig,
    sender: Option<Box<dyn Sender>>,
    max_candidates: Option<u32>,
    batch_capacity: usize,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("signed", &self.signer.is_some())
            .field("retry", &self.retry)
            .field("retry_policy", &self.retry_policy)
            .field("transport", &self.transport)
            .field("custom_sender", &self.sender.is_some())
            .field("max_candidates", &self.max_candidates)
            .field("batch_capacity", &self.batch_capacity)
            .finish()
    }
}

impl ClientBuilder {
    /// Create a builder sending to `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            signer: None,
            retry: RetryConfig::new(DEFAULT_MAX_RETRIES),
            retry_policy: None,
            transport: TransportConfig::default(),
            sender: None,
            max_candidates: None,
            batch_capacity: MAX_BATCH_SIZE,
        }
    }

    /// Sign requests with an auth id and auth token
    pub fn with_credentials(self, credentials: StaticCredentials) -> Self {
        self.with_signer(Arc::new(credentials))
    }

    /// Sign requests with any signer
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Set the maximum number of retries after the first attempt
    pub fn retry_at_most(mut self, max_retries: usize) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Replace the whole retry configuration (backoff, attempt timeout)
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Set the time limit for one exchange
    pub fn with_max_timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout = timeout;
        self
    }

    /// Route requests through a proxy
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.transport.proxy = Some(proxy);
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.transport.user_agent = user_agent.into();
        self
    }

    /// Use a custom sender instead of the HTTP transport
    ///
    /// Signing and retry still wrap it.
    pub fn with_sender(mut self, sender: impl Sender + 'static) -> Self {
        self.sender = Some(Box::new(sender));
        self
    }

    /// Limit the candidates returned for lookups that set no limit themselves
    pub fn with_max_candidates(mut self, max: u32) -> Self {
        self.max_candidates = Some(max);
        self
    }

    /// Set the capacity of batches created by [`Client::new_batch`]
    pub fn with_batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity;
        self
    }

    /// Get the retry configuration
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Get the transport configuration
    pub fn transport_config(&self) -> &TransportConfig {
        &self.transport
    }

    /// Compose the sender chain
    pub fn build_sender(&mut self) -> Result<Box<dyn Sender>> {
        let transport: Box<dyn Sender> = match self.sender.take() {
            Some(sender) => sender,
            None => Box::new(HttpSender::new(self.transport.clone())?),
        };

        let mut retry = RetrySender::new(self.retry.clone(), transport);
        if let Some(policy) = &self.retry_policy {
            retry = retry.with_policy(Arc::clone(policy));
        }

        Ok(match &self.signer {
            Some(signer) => Box::new(SigningSender::new(Arc::clone(signer), retry)),
            None => Box::new(retry),
        })
    }

    /// Build a client with the given serialization collaborators
    pub fn build<Ser: Serializer, De: Deserializer>(
        mut self,
        serializer: Ser,
        deserializer: De,
    ) -> Result<Client<Ser, De>> {
        let sender = self.build_sender()?;
        tracing::debug!(base_url = %self.base_url, "client built");

        let client = Client::new(self.base_url, sender, serializer, deserializer)
            .with_batch_capacity(self.batch_capacity);
        Ok(match self.max_candidates {
            Some(max) => client.with_max_candidates(max),
            None => client,
        })
    }

    /// Build a client speaking JSON, with `R` as the per-lookup result
    pub fn build_json<R: DeserializeOwned>(self) -> Result<Client<JsonSerializer, JsonDeserializer<R>>> {
        self.build(JsonSerializer, JsonDeserializer::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailingSender, FakeDeserializer, RequestCapturingSender};
    use crate::Lookup;
    use networking::{DefaultRetryPolicy, Request};

    #[test]
    fn test_builder_defaults() {
        let builder = ClientBuilder::new("https://example.com/street-address");

        assert_eq!(builder.retry_config().max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(builder.transport_config().timeout, Duration::from_secs(10));
        assert!(builder.transport_config().proxy.is_none());
    }

    #[test]
    fn test_builder_options() {
        let builder = ClientBuilder::new("https://example.com/")
            .retry_at_most(2)
            .with_max_timeout(Duration::from_secs(30))
            .with_user_agent("CustomAgent/1.0")
            .with_proxy(ProxyConfig::new("http://proxy.local:8080"));

        assert_eq!(builder.retry_config().max_retries, 2);
        assert_eq!(builder.transport_config().timeout, Duration::from_secs(30));
        assert_eq!(builder.transport_config().user_agent, "CustomAgent/1.0");
        assert!(builder.transport_config().proxy.is_some());
    }

    #[tokio::test]
    async fn test_chain_signs_requests() {
        let capture = Arc::new(RequestCapturingSender::new());
        let mut builder = ClientBuilder::new("http://localhost/")
            .with_credentials(StaticCredentials::new("id", "secret"))
            .with_sender(Arc::clone(&capture));

        let sender = builder.build_sender().unwrap();
        sender.send(Request::get("http://localhost/")).await.unwrap();

        assert_eq!(
            capture.last_request().unwrap().url(),
            "http://localhost/?auth-id=id&auth-token=secret"
        );
    }

    #[tokio::test]
    async fn test_chain_retries_below_signing() {
        let failing = Arc::new(FailingSender::new(2));
        let client = ClientBuilder::new("http://localhost/")
            .with_credentials(StaticCredentials::new("id", "secret"))
            .retry_at_most(2)
            .with_sender(Arc::clone(&failing))
            .build(JsonSerializer, FakeDeserializer::new(vec!["ok".to_string()]))
            .unwrap();

        let mut lookup = Lookup::new().field("zipcode", "84604");
        client.send_lookup(&mut lookup).await.unwrap();

        assert_eq!(failing.calls(), 3);
        assert_eq!(lookup.result(), Some(&"ok".to_string()));
    }

    #[tokio::test]
    async fn test_chain_retry_exhaustion_reaches_client() {
        let failing = Arc::new(FailingSender::always());
        let client = ClientBuilder::new("http://localhost/")
            .retry_at_most(1)
            .with_retry_policy(Arc::new(DefaultRetryPolicy::transient_statuses()))
            .with_sender(Arc::clone(&failing))
            .build(JsonSerializer, FakeDeserializer::new(vec!["ok".to_string()]))
            .unwrap();

        let err = client.send_lookup(&mut Lookup::new()).await.unwrap_err();

        assert!(err.is_transport_failure());
        assert_eq!(failing.calls(), 2);
    }

    #[tokio::test]
    async fn test_lookup_defaults_reach_client() {
        let capture = Arc::new(RequestCapturingSender::new());
        let client = ClientBuilder::new("http://localhost/")
            .with_max_candidates(5)
            .with_batch_capacity(10)
            .with_sender(Arc::clone(&capture))
            .build(JsonSerializer, FakeDeserializer::new(vec!["ok".to_string()]))
            .unwrap();

        client.send_lookup(&mut Lookup::new().field("zipcode", "84604")).await.unwrap();

        assert_eq!(client.max_candidates(), Some(5));
        assert_eq!(client.new_batch().capacity(), 10);
        assert_eq!(
            capture.last_request().unwrap().url(),
            "http://localhost/?candidates=5&zipcode=84604"
        );
    }

    #[test]
    fn test_build_json_with_http_transport() {
        let client = ClientBuilder::new("https://example.com/street-address")
            .build_json::<Vec<serde_json::Value>>()
            .unwrap();

        assert_eq!(client.url_prefix(), "https://example.com/street-address");
    }
}
