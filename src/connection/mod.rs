//! Session with a running H2O cluster
//!
//! `Connection::init` performs the handshake (`GET /3/Cloud`) and keeps the
//! HTTP client around for the frame and job calls. All REST helpers share
//! one error mapping: transport failures become `Connection`, non-2xx
//! responses become `Http` with the message from the H2O error body.

pub mod cloud;

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

pub use cloud::{CloudStatus, NodeStatus};

/// Error body returned by the REST API on failure
#[derive(Debug, Deserialize, Default)]
struct H2oErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    exception_msg: Option<String>,
}

/// An established session with an H2O cluster
#[derive(Debug, Clone)]
pub struct Connection {
    config: ClientConfig,
    base_url: String,
    client: reqwest::Client,
    cloud: CloudStatus,
}

impl Connection {
    /// Connect to the cluster described by `config`
    ///
    /// Fails with `CloudUnhealthy` when the cloud has no nodes or reports
    /// unhealthy members.
    pub async fn init(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url();
        let cloud = fetch_cloud(&client, &base_url, config.auth_token.as_deref()).await?;

        if let Some(reason) = cloud.unhealthy_reason() {
            return Err(ClientError::CloudUnhealthy(reason));
        }

        if !cloud.consensus {
            warn!(
                "Cloud '{}' has not reached consensus on membership",
                cloud.cloud_name
            );
        }

        info!(
            "Connected to H2O {} cloud '{}' at {} ({} nodes, {} cpus)",
            cloud.version,
            cloud.cloud_name,
            base_url,
            cloud.cloud_size,
            cloud.total_cpus()
        );

        Ok(Self {
            config,
            base_url,
            client,
            cloud,
        })
    }

    /// Cloud status captured during the last handshake
    pub fn cloud(&self) -> &CloudStatus {
        &self.cloud
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query the cloud status again
    pub async fn refresh_cloud(&mut self) -> ClientResult<&CloudStatus> {
        self.cloud = fetch_cloud(
            &self.client,
            &self.base_url,
            self.config.auth_token.as_deref(),
        )
        .await?;
        Ok(&self.cloud)
    }

    fn build_request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        request(
            &self.client,
            &self.base_url,
            self.config.auth_token.as_deref(),
            method,
            path,
        )
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        debug!("GET {}", path);
        let response = self
            .build_request(reqwest::Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(|e| ClientError::Connection(format!("GET {} failed: {}", path, e)))?;

        decode(path, response).await
    }

    pub(crate) async fn post_form_json<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> ClientResult<T> {
        debug!("POST {}", path);
        let response = self
            .build_request(reqwest::Method::POST, path)
            .form(form)
            .send()
            .await
            .map_err(|e| ClientError::Connection(format!("POST {} failed: {}", path, e)))?;

        decode(path, response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> ClientResult<()> {
        debug!("DELETE {}", path);
        let response = self
            .build_request(reqwest::Method::DELETE, path)
            .send()
            .await
            .map_err(|e| ClientError::Connection(format!("DELETE {} failed: {}", path, e)))?;

        check_status(response).await.map(|_| ())
    }
}

/// Request against the REST API, with the bearer token when one is set
fn request(
    client: &reqwest::Client,
    base_url: &str,
    auth_token: Option<&str>,
    method: reqwest::Method,
    path: &str,
) -> reqwest::RequestBuilder {
    let url = format!("{}{}", base_url, path);
    let mut request = client.request(method, &url);

    if let Some(token) = auth_token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }

    request
}

async fn fetch_cloud(
    client: &reqwest::Client,
    base_url: &str,
    auth_token: Option<&str>,
) -> ClientResult<CloudStatus> {
    let response = request(
        client,
        base_url,
        auth_token,
        reqwest::Method::GET,
        "/3/Cloud",
    )
    .send()
    .await
    .map_err(|e| {
        ClientError::Connection(format!("No H2O cluster reachable at {}: {}", base_url, e))
    })?;

    decode("/3/Cloud", response).await
}

async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    Err(ClientError::Http {
        status: status.as_u16(),
        message: error_message(&text, status),
    })
}

async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> ClientResult<T> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Parse(format!("Failed to parse response from {}: {}", path, e)))
}

/// Pull the most useful message out of an H2O error body
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    let parsed: H2oErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .msg
        .filter(|m| !m.is_empty())
        .or(parsed.exception_msg.filter(|m| !m.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_msg() {
        let body = r#"{"__meta":{"schema_type":"H2OError"},"msg":"Object 'x' not found","exception_msg":"water.exceptions.H2OKeyNotFoundArgumentException"}"#;
        assert_eq!(
            error_message(body, reqwest::StatusCode::NOT_FOUND),
            "Object 'x' not found"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_exception() {
        let body = r#"{"exception_msg":"boom"}"#;
        assert_eq!(
            error_message(body, reqwest::StatusCode::INTERNAL_SERVER_ERROR),
            "boom"
        );
    }

    #[test]
    fn test_error_message_non_json() {
        assert_eq!(
            error_message("<html>", reqwest::StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
    }
}
