//! Outbound health check against the configured AIOps target.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::ConnectionTestResponse;

/// Maximum number of characters of a non-JSON body echoed back.
const BODY_PREVIEW_CHARS: usize = 200;

/// Shared HTTP client used for connection tests.
#[derive(Clone)]
pub struct ConnectionProber {
    client: reqwest::Client,
    timeout: Duration,
}

impl ConnectionProber {
    /// Build a prober whose requests give up after `timeout`.
    ///
    /// The same bound applies to connecting and to the whole request.
    pub fn new(timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    /// Client-side bound on a single probe.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `{url}/health` and describe the outcome.
    ///
    /// Any HTTP answer is a success of the probe itself (`success` reflects 2xx).
    /// Transport failures map to 503 (connect), 504 (timeout) or 500.
    pub async fn probe(
        &self,
        url: &str,
        token: Option<SecretString>,
    ) -> AppResult<ConnectionTestResponse> {
        if url.trim().is_empty() {
            return Err(AppError::InvalidInput("URL is required".to_string()));
        }

        let target = health_url(url);
        let mut request = self.client.get(&target);
        if let Some(ref token) = token {
            if !token.expose_secret().is_empty() {
                request = request.header(
                    AUTHORIZATION,
                    format!("Bearer {}", token.expose_secret()),
                );
            }
        }

        debug!(target = %target, timeout_secs = self.timeout().as_secs(), "Probing target");
        let response = request.send().await.map_err(|e| classify_error(&target, e))?;
        let status = response.status();

        if !status.is_success() {
            info!(target = %target, status = status.as_u16(), "Connection test got non-success status");
            return Ok(ConnectionTestResponse {
                success: false,
                message: format!("Connection failed with status {}", status.as_u16()),
                status_code: status.as_u16(),
                response: None,
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(&target, e))?;

        info!(target = %target, status = status.as_u16(), "Connection test succeeded");
        Ok(ConnectionTestResponse {
            success: true,
            message: "Connection successful".to_string(),
            status_code: status.as_u16(),
            response: Some(body_preview(&body, is_json)),
        })
    }
}

/// Health endpoint for a base URL, without doubling the slash.
fn health_url(base: &str) -> String {
    format!("{}/health", base.trim().trim_end_matches('/'))
}

/// Parsed JSON when the target declared JSON, else the leading characters of the text.
fn body_preview(body: &str, is_json: bool) -> JsonValue {
    if is_json {
        if let Ok(value) = serde_json::from_str::<JsonValue>(body) {
            return value;
        }
    }
    JsonValue::String(body.chars().take(BODY_PREVIEW_CHARS).collect())
}

fn classify_error(target: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        warn!(target = %target, "Connection test timed out");
        AppError::UpstreamTimeout(
            "Connection timeout. The target system is not responding.".to_string(),
        )
    } else if err.is_connect() {
        warn!(target = %target, "Connection test could not connect: {}", err);
        AppError::UpstreamUnavailable(
            "Cannot connect to the target system. Please check the URL and network connectivity."
                .to_string(),
        )
    } else {
        warn!(target = %target, "Connection test failed: {}", err);
        AppError::Upstream(format!("Connection test failed: {}", err))
    }
}
