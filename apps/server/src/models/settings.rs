//! Target system and execution settings.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::entity::settings;

pub const DEFAULT_SSH_PORT: i32 = 22;
pub const DEFAULT_TIMEOUT: i32 = 30;
pub const DEFAULT_MAX_PARALLEL: i32 = 5;
pub const DEFAULT_RETRY_COUNT: i32 = 3;

/// Settings as returned to clients, with defaults substituted for unset values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub aiops_url: String,
    pub api_token: String,
    pub ssh_host: String,
    pub ssh_port: i32,
    pub test_path: String,
    pub timeout: i32,
    pub parallel_execution: bool,
    pub max_parallel: i32,
    pub retry_failed: bool,
    pub retry_count: i32,
}

impl Default for SettingsResponse {
    fn default() -> Self {
        Self {
            aiops_url: String::new(),
            api_token: String::new(),
            ssh_host: String::new(),
            ssh_port: DEFAULT_SSH_PORT,
            test_path: String::new(),
            timeout: DEFAULT_TIMEOUT,
            parallel_execution: false,
            max_parallel: DEFAULT_MAX_PARALLEL,
            retry_failed: false,
            retry_count: DEFAULT_RETRY_COUNT,
        }
    }
}

impl From<settings::Model> for SettingsResponse {
    fn from(m: settings::Model) -> Self {
        Self {
            aiops_url: m.aiops_url.unwrap_or_default(),
            api_token: m.api_token.unwrap_or_default(),
            ssh_host: m.ssh_host.unwrap_or_default(),
            ssh_port: m.ssh_port.unwrap_or(DEFAULT_SSH_PORT),
            test_path: m.test_path.unwrap_or_default(),
            timeout: m.timeout.unwrap_or(DEFAULT_TIMEOUT),
            parallel_execution: m.parallel_execution,
            max_parallel: m.max_parallel,
            retry_failed: m.retry_failed,
            retry_count: m.retry_count,
        }
    }
}

fn default_ssh_port() -> Option<i32> {
    Some(DEFAULT_SSH_PORT)
}

fn default_timeout() -> Option<i32> {
    Some(DEFAULT_TIMEOUT)
}

fn default_max_parallel() -> i32 {
    DEFAULT_MAX_PARALLEL
}

fn default_retry_count() -> i32 {
    DEFAULT_RETRY_COUNT
}

/// Settings payload. Every field overwrites the stored value, explicit nulls included.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub aiops_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub ssh_host: Option<String>,
    #[serde(default = "default_ssh_port")]
    pub ssh_port: Option<i32>,
    #[serde(default)]
    pub test_path: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout: Option<i32>,
    #[serde(default)]
    pub parallel_execution: bool,
    #[serde(default = "default_max_parallel")]
    pub max_parallel: i32,
    #[serde(default)]
    pub retry_failed: bool,
    #[serde(default = "default_retry_count")]
    pub retry_count: i32,
}

/// Connection test request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConnectionTestRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Connection test result for a target that answered.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConnectionTestResponse {
    pub success: bool,
    pub message: String,
    pub status_code: u16,
    /// Health endpoint body: parsed JSON, or the leading text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<JsonValue>,
}
