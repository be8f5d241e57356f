//! Reqwest-backed fetch client with retry

use super::FetchClient;
use crate::error::{is_retryable_status, Error, Result};
use crate::request::ScrollRequest;
use crate::types::BackoffType;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP fetch client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL of the search service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Create a config with defaults for the given service URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            default_headers: HashMap::new(),
            user_agent: format!("scrollstream/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Create a new config builder
    pub fn builder(base_url: impl Into<String>) -> HttpClientConfigBuilder {
        HttpClientConfigBuilder {
            config: Self::new(base_url),
        }
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }
}

/// Builder for HTTP fetch client config
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP fetch client with retry
pub struct HttpFetchClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpFetchClient {
    /// Create a client for the given service URL with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(HttpClientConfig::new(base_url))
    }

    /// Create a client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Build full URL from a request path
    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

#[async_trait]
impl FetchClient for HttpFetchClient {
    async fn dispatch(&self, request: ScrollRequest) -> Result<Bytes> {
        let full_url = self.build_url(&request.path);
        let max_retries = self.config.max_retries;

        let mut last_error = None;
        let mut attempt = 0;

        while attempt <= max_retries {
            let mut req = self.client.request(request.method.clone(), &full_url);

            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }
            for (key, value) in &request.headers {
                req = req.header(key.as_str(), value.as_str());
            }
            if !request.query.is_empty() {
                req = req.query(&request.query);
            }
            req = req.json(&request.body);

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        debug!("Request succeeded: {} {}", request.method, full_url);
                        return response.bytes().await.map_err(Error::Http);
                    }

                    // Throttled: honor Retry-After over computed backoff
                    if status == StatusCode::TOO_MANY_REQUESTS && attempt < max_retries {
                        let retry_after = extract_retry_after(&response);
                        warn!(
                            "Rate limited (429), attempt {}/{}, waiting {}s",
                            attempt + 1,
                            max_retries + 1,
                            retry_after
                        );
                        tokio::time::sleep(Duration::from_secs(retry_after)).await;
                        attempt += 1;
                        last_error = Some(Error::http_status(status.as_u16(), String::new()));
                        continue;
                    }

                    if is_retryable_status(status.as_u16()) && attempt < max_retries {
                        let delay = self.config.calculate_backoff(attempt);
                        warn!(
                            "Request failed with {}, attempt {}/{}, retrying in {:?}",
                            status.as_u16(),
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::http_status(status.as_u16(), String::new()));
                        continue;
                    }

                    // Non-retryable status, or retries exhausted
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::http_status(status.as_u16(), body));
                }
                Err(e) => {
                    if (e.is_timeout() || e.is_connect()) && attempt < max_retries {
                        let delay = self.config.calculate_backoff(attempt);
                        warn!(
                            "Transport error ({e}), attempt {}/{}, retrying in {:?}",
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::Http(e));
                        continue;
                    }

                    return Err(Error::Http(e));
                }
            }
        }

        // Exhausted all retries
        Err(last_error.unwrap_or_else(|| Error::MaxRetriesExceeded { max_retries }))
    }
}

impl std::fmt::Debug for HttpFetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetchClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(60)
}
