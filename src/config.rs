//! Client configuration
//!
//! Connection parameters for an H2O cluster plus the polling and preview
//! knobs used by frame import. Can be loaded from a TOML file; every key
//! is optional and falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for connecting to an H2O cluster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Host name or IP of any cluster node
    pub host: String,

    /// REST port of that node
    pub port: u16,

    /// Use https instead of http
    pub https: bool,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Interval between job status polls in milliseconds
    pub job_poll_interval_ms: u64,

    /// Maximum time to wait for a job in seconds
    pub job_timeout_secs: u64,

    /// Number of rows fetched for frame previews
    pub preview_rows: usize,

    /// Optional bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 54321,
            https: false,
            request_timeout_secs: 60,
            job_poll_interval_ms: 250,
            job_timeout_secs: 600,
            preview_rows: 10,
            auth_token: None,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> ClientResult<Self> {
        let config: ClientConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    pub fn with_job_poll_interval(mut self, millis: u64) -> Self {
        self.job_poll_interval_ms = millis;
        self
    }

    pub fn with_job_timeout(mut self, seconds: u64) -> Self {
        self.job_timeout_secs = seconds;
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Base URL of the REST API, without trailing slash
    ///
    /// IPv6 literals are bracketed.
    pub fn base_url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("{}://[{}]:{}", scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}", scheme, self.host, self.port)
        }
    }

    /// Check the config for values that can never work
    pub fn validate(&self) -> ClientResult<()> {
        if self.host.trim().is_empty() {
            return Err(ClientError::Config("host cannot be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ClientError::Config("port cannot be 0".to_string()));
        }
        if self.job_poll_interval_ms == 0 {
            return Err(ClientError::Config(
                "job_poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 || self.job_timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeouts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
