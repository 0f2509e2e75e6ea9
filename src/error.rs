//! Error types for H2O client operations
//!
//! Covers the connection handshake, REST calls, asynchronous jobs and
//! the frames they produce.

use thiserror::Error;

/// Errors that can occur while talking to an H2O cluster
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failed to reach the cluster at all
    #[error("Failed to connect to H2O cluster: {0}")]
    Connection(String),

    /// The cluster answered with a non-success status
    #[error("H2O request failed with HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Failed to parse H2O response: {0}")]
    Parse(String),

    /// ImportFiles reported failures or produced no frames
    #[error("Import failed: {0}")]
    ImportFailed(String),

    /// A server-side job ended in FAILED or CANCELLED
    #[error("Job {job} failed: {message}")]
    JobFailed { job: String, message: String },

    /// A server-side job did not finish in time
    #[error("Job {job} did not finish within {secs} seconds")]
    JobTimeout { job: String, secs: u64 },

    /// The cluster reported itself unhealthy or empty
    #[error("H2O cluster is not healthy: {0}")]
    CloudUnhealthy(String),

    /// A parsed frame has no rows or no columns
    #[error("Frame {0} is empty")]
    EmptyFrame(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::Config(err.to_string())
    }
}

/// Result type for H2O client operations
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Connection(msg) => {
                format!(
                    "Failed to connect to H2O cluster: {msg}\n\n\
                    Hints:\n\
                    - Check that the cluster is running (java -jar h2o.jar)\n\
                    - Verify the address passed with --usecloud or --ip/--port\n\
                    - Use --https if the cluster terminates TLS"
                )
            }
            ClientError::CloudUnhealthy(msg) => {
                format!(
                    "H2O cluster is not healthy: {msg}\n\n\
                    Hint: Wait for all nodes to join the cloud and try again."
                )
            }
            ClientError::ImportFailed(msg) => {
                format!(
                    "Import failed: {msg}\n\n\
                    Hints:\n\
                    - Check that the cluster has network access to the source URL\n\
                    - Verify the URL points at an existing file"
                )
            }
            ClientError::JobTimeout { job, secs } => {
                format!(
                    "Job {job} did not finish within {secs} seconds.\n\n\
                    Hint: Increase job_timeout_secs in the config file."
                )
            }
            _ => self.to_string(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Connection(_) | ClientError::JobTimeout { .. } => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
