//! reqwest-backed transport
//!
//! [`HttpSender`] is the bottom of every sender chain and the only piece
//! that performs network I/O.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, REFERER};
use reqwest::{Client as ReqwestClient, Method, Proxy};
use std::collections::HashMap;
use std::time::Duration;

use crate::{Error, HttpMethod, Request, Response, Result, Sender};

/// Default time limit for one exchange
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Identifying user agent sent with every request
pub fn default_user_agent() -> String {
    format!("streetwise (sdk:rust@{})", env!("CARGO_PKG_VERSION"))
}

// =============================================================================
// Transport Configuration
// =============================================================================

/// Proxy settings passed through to the HTTP client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy URL (e.g., "http://proxy.local:8080")
    pub url: String,
    /// Basic-auth user name
    pub username: Option<String>,
    /// Basic-auth password
    pub password: Option<String>,
}

impl ProxyConfig {
    /// Create an unauthenticated proxy configuration
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Authenticate against the proxy with basic auth
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Configuration for the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Time limit for one exchange, connect through body
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Optional proxy
    pub proxy: Option<ProxyConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

impl TransportConfig {
    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Route requests through a proxy
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

// =============================================================================
// HTTP Sender
// =============================================================================

/// Sender performing the actual HTTP exchange
///
/// Every completed exchange becomes a [`Response`], including 4xx and 5xx
/// answers. Only exchanges that produced no response at all fail.
#[derive(Debug, Clone)]
pub struct HttpSender {
    client: ReqwestClient,
    config: TransportConfig,
}

impl HttpSender {
    /// Create a transport from its configuration
    pub fn new(config: TransportConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent);

        if let Some(proxy) = &config.proxy {
            let mut reqwest_proxy = Proxy::all(&proxy.url)
                .map_err(|e| Error::InvalidRequest(format!("Invalid proxy: {}", e)))?;
            if let Some(username) = &proxy.username {
                reqwest_proxy =
                    reqwest_proxy.basic_auth(username, proxy.password.as_deref().unwrap_or_default());
            }
            builder = builder.proxy(reqwest_proxy);
        }

        let client = builder.build()?;
        Ok(Self { client, config })
    }

    /// Get the transport configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn build_request(&self, request: &Request) -> Result<reqwest::RequestBuilder> {
        let method = match request.method() {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };
        let url = reqwest::Url::parse(&request.url())
            .map_err(|e| Error::InvalidRequest(format!("Invalid URL {}: {}", request.url_prefix(), e)))?;

        let mut builder = self.client.request(method, url);

        for (name, value) in request.headers() {
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::InvalidRequest(format!("Invalid header {}: {}", name, e)))?;
            if name == "Referer" {
                builder = builder.header(REFERER, value);
            } else {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| Error::InvalidRequest(format!("Invalid header {}: {}", name, e)))?;
                builder = builder.header(name, value);
            }
        }

        if request.method() == HttpMethod::Post {
            if let Some(payload) = request.payload_bytes().filter(|p| !p.is_empty()) {
                builder = builder.body(payload.to_vec());
            }
        }

        Ok(builder)
    }
}

#[async_trait]
impl Sender for HttpSender {
    async fn send(&self, request: Request) -> Result<Response> {
        let builder = self.build_request(&request)?;

        tracing::debug!(
            method = request.method().as_str(),
            url = %request.url_prefix(),
            "sending request"
        );

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(key.to_string(), value_str.to_string());
            }
        }

        let payload = response.bytes().await?.to_vec();
        tracing::debug!(status, bytes = payload.len(), "response received");

        Ok(Response::new(status, payload).with_headers(headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_default() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("streetwise (sdk:rust@"));
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_transport_config_builder() {
        let config = TransportConfig::default()
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("CustomAgent/1.0")
            .with_proxy(ProxyConfig::new("http://proxy.local:8080").with_credentials("user", "pass"));

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "CustomAgent/1.0");
        let proxy = config.proxy.unwrap();
        assert_eq!(proxy.username.as_deref(), Some("user"));
        assert_eq!(proxy.password.as_deref(), Some("pass"));
    }

    #[test]
    fn test_http_sender_with_proxy() {
        let config = TransportConfig::default().with_proxy(ProxyConfig::new("http://proxy.local:8080"));
        let sender = HttpSender::new(config).unwrap();
        assert!(sender.config().proxy.is_some());
    }

    #[tokio::test]
    async fn test_invalid_url_is_invalid_request() {
        let sender = HttpSender::new(TransportConfig::default()).unwrap();

        let err = sender.send(Request::get("not a url")).await.unwrap_err();

        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(!err.is_transport_failure());
    }

    #[tokio::test]
    async fn test_invalid_header_is_invalid_request() {
        let sender = HttpSender::new(TransportConfig::default()).unwrap();
        let request = Request::get("http://localhost/").header("Bad Header", "value");

        let err = sender.send(request).await.unwrap_err();

        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        // Bind then drop to get a port with nothing listening
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let sender = HttpSender::new(TransportConfig::default()).unwrap();

        let err = sender
            .send(Request::get(format!("http://127.0.0.1:{}/", port)))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
        assert!(err.is_transport_failure());
    }
}
