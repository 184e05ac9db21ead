//! Configuration for talking to the inference service.
//!
//! All submission behaviour is controlled through [`ClientConfig`], built via
//! its [`ClientConfigBuilder`]. The decorative progress sequence has its own
//! type, [`crate::progress::ProgressScript`], because it never influences what
//! is sent or how the answer is interpreted.

use crate::error::FieldSenseError;
use serde::{Deserialize, Serialize};

/// Base URL used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Path appended to the base URL for the extraction call.
pub const ANALYZE_PATH: &str = "/analyze";

/// Configuration for [`crate::pipeline::submit::InferenceClient`].
///
/// # Example
/// ```rust
/// use fieldsense::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .endpoint("http://10.0.0.7:8000")
///     .request_timeout_secs(45)
///     .build()
///     .unwrap();
/// assert_eq!(config.analyze_url(), "http://10.0.0.7:8000/analyze");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the inference service. `/analyze` is appended. Default:
    /// `http://localhost:8000`.
    pub endpoint: String,

    /// Whole-request timeout in seconds, covering upload, inference and the
    /// response body. Default: 30.
    pub request_timeout_secs: u64,

    /// TCP/TLS connect timeout in seconds. Default: 10.
    pub connect_timeout_secs: u64,

    /// Retries on a transient network failure. Clamped to 0–1. Default: 1.
    ///
    /// Only connection failures and timeouts are retried. An HTTP error status
    /// is an answer from the service and is reported as-is.
    pub max_retries: u32,

    /// Delay before the retry, in milliseconds. Default: 500.
    pub retry_backoff_ms: u64,

    /// `User-Agent` header sent with each request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            max_retries: 1,
            retry_backoff_ms: 500,
            user_agent: concat!("fieldsense/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the extraction call.
    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), ANALYZE_PATH)
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.min(1);
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, FieldSenseError> {
        let c = &self.config;
        let url = reqwest::Url::parse(&c.endpoint).map_err(|e| {
            FieldSenseError::InvalidConfig(format!("Endpoint '{}' is not a URL: {}", c.endpoint, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FieldSenseError::InvalidConfig(format!(
                "Endpoint must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.request_timeout_secs == 0 {
            return Err(FieldSenseError::InvalidConfig(
                "Request timeout must be ≥ 1s".into(),
            ));
        }
        if c.connect_timeout_secs == 0 {
            return Err(FieldSenseError::InvalidConfig(
                "Connect timeout must be ≥ 1s".into(),
            ));
        }
        Ok(self.config)
    }
}
