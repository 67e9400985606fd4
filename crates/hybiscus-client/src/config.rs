//! Client configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Default API root of the hosted service.
pub const DEFAULT_BASE_URL: &str = "https://api.hybiscus.dev/api/v1";

/// Default per-call timeout, also used as the overall polling deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Delay between two status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(750);

/// Value of the `X-HYB-CLIENT` header sent with every request.
pub const CLIENT_IDENTIFIER: &str = concat!("rust:hybiscus-client-v", env!("CARGO_PKG_VERSION"));

/// Immutable configuration handed to [`HybiscusClient`](crate::HybiscusClient).
///
/// ```
/// use std::time::Duration;
/// use hybiscus_client::ClientConfig;
///
/// let config = ClientConfig::new("P09U8Y7G")
///     .with_timeout(Duration::from_secs(30));
/// assert_eq!(config.base_url(), "https://api.hybiscus.dev/api/v1");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl ClientConfig {
    /// Create a configuration with default endpoint and timings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Use a different API root. A trailing slash is ignored.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-call timeout and polling deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the delay between status checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Check the configuration before any request is made.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if url.query().is_some() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "query strings are not allowed".to_string(),
            });
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::InvalidPollInterval);
        }

        Ok(())
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}
