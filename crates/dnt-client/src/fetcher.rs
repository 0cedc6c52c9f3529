//! reqwest-backed policy fetcher.

use crate::config::FetchConfig;
use async_trait::async_trait;
use dnt_core::{DntError, PolicyFetcher, PolicyResponse, Result};
use reqwest::Client as HttpClient;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fetches well-known DNT policy resources over HTTP(S)
#[derive(Clone)]
pub struct HttpPolicyFetcher {
    inner: Arc<FetcherInner>,
}

struct FetcherInner {
    http: HttpClient,
    timeout: Duration,
    max_body_bytes: u64,
}

impl HttpPolicyFetcher {
    /// Create a fetcher with default settings
    pub fn new() -> Result<Self> {
        HttpPolicyFetcherBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> HttpPolicyFetcherBuilder {
        HttpPolicyFetcherBuilder::new()
    }

    /// Read the body in chunks, stopping as soon as it exceeds the limit
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>> {
        let limit = self.inner.max_body_bytes;

        if let Some(len) = response.content_length() {
            if len > limit {
                return Err(DntError::BodyTooLarge { size: len, limit });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(&e))?
        {
            let size = (body.len() + chunk.len()) as u64;
            if size > limit {
                return Err(DntError::BodyTooLarge { size, limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    /// Convert a reqwest failure to a DntError
    fn transport_error(&self, err: &reqwest::Error) -> DntError {
        if err.is_timeout() {
            DntError::Timeout(self.inner.timeout)
        } else if err.is_connect() {
            DntError::Connection(err.to_string())
        } else {
            DntError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl PolicyFetcher for HttpPolicyFetcher {
    async fn fetch(&self, url: &str) -> Result<PolicyResponse> {
        debug!(url = %url, "GET policy");

        let response = self
            .inner
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status().as_u16();
        if status != 200 {
            debug!(url = %url, status, "policy request unsuccessful");
            return Ok(PolicyResponse::new(status, Vec::new()));
        }

        let body = self.read_body(response).await?;
        Ok(PolicyResponse::new(status, body))
    }
}

/// Builder for configuring an [`HttpPolicyFetcher`]
pub struct HttpPolicyFetcherBuilder {
    config: FetchConfig,
    overrides: Vec<(String, SocketAddr)>,
}

impl Default for HttpPolicyFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpPolicyFetcherBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
            overrides: Vec::new(),
        }
    }

    /// Replace the whole transport configuration
    #[must_use]
    pub fn config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the body size limit in bytes
    #[must_use]
    pub const fn max_body_bytes(mut self, limit: u64) -> Self {
        self.config.max_body_bytes = limit;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Resolve `host` to `addr` instead of asking DNS (useful for testing).
    ///
    /// The port of `addr` is ignored; the URL's port is used.
    #[must_use]
    pub fn resolve(mut self, host: impl Into<String>, addr: SocketAddr) -> Self {
        self.overrides.push((host.into(), addr));
        self
    }

    /// Build the fetcher
    pub fn build(self) -> Result<HttpPolicyFetcher> {
        let mut builder = HttpClient::builder()
            .timeout(self.config.timeout)
            .user_agent(&self.config.user_agent)
            .gzip(true);

        for (host, addr) in &self.overrides {
            builder = builder.resolve(host, *addr);
        }

        let http = builder
            .build()
            .map_err(|e| DntError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpPolicyFetcher {
            inner: Arc::new(FetcherInner {
                http,
                timeout: self.config.timeout,
                max_body_bytes: self.config.max_body_bytes,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnt_core::WELL_KNOWN_PATH;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POLICY: &str = "Do Not Track Compliance Policy\n\nVersion 1.0\n";

    fn policy_url(server: &MockServer) -> String {
        format!("{}{WELL_KNOWN_PATH}", server.uri())
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(POLICY))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpPolicyFetcher::new().unwrap();
        let response = fetcher.fetch(&policy_url(&server)).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, POLICY.as_bytes());
    }

    #[tokio::test]
    async fn test_non_200_has_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(POLICY))
            .mount(&server)
            .await;

        let fetcher = HttpPolicyFetcher::new().unwrap();
        let response = fetcher.fetch(&policy_url(&server)).await.unwrap();

        assert_eq!(response.status, 404);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_body_bytes_are_not_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, b'\n']))
            .mount(&server)
            .await;

        let fetcher = HttpPolicyFetcher::new().unwrap();
        let response = fetcher.fetch(&policy_url(&server)).await.unwrap();

        assert_eq!(response.body, [0xff, 0xfe, b'\n']);
    }

    #[tokio::test]
    async fn test_body_over_limit_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(100)))
            .mount(&server)
            .await;

        let fetcher = HttpPolicyFetcher::builder()
            .max_body_bytes(16)
            .build()
            .unwrap();
        let err = fetcher.fetch(&policy_url(&server)).await.unwrap_err();

        assert!(matches!(err, DntError::BodyTooLarge { limit: 16, .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(POLICY)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpPolicyFetcher::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let err = fetcher.fetch(&policy_url(&server)).await.unwrap_err();

        assert!(matches!(err, DntError::Timeout(t) if t == Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpPolicyFetcher::new().unwrap();
        let err = fetcher
            .fetch(&format!("http://{addr}{WELL_KNOWN_PATH}"))
            .await
            .unwrap_err();

        assert!(matches!(err, DntError::Connection(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_user_agent_and_resolve_override() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN_PATH))
            .and(header("user-agent", "dnt-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(POLICY))
            .expect(1)
            .mount(&server)
            .await;

        let addr = *server.address();
        let fetcher = HttpPolicyFetcher::builder()
            .user_agent("dnt-test/1.0")
            .resolve("eff.example", addr)
            .build()
            .unwrap();

        let url = format!("http://eff.example:{}{WELL_KNOWN_PATH}", addr.port());
        let response = fetcher.fetch(&url).await.unwrap();

        assert!(response.is_ok());
        assert_eq!(response.body, POLICY.as_bytes());
    }
}
