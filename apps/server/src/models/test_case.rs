//! Test case models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::test_case;

/// Test case as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestCaseResponse {
    pub id: i32,
    pub test_id: String,
    pub suite_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub file_path: String,
    pub function_name: String,
    pub priority: String,
    pub timeout: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<test_case::Model> for TestCaseResponse {
    fn from(m: test_case::Model) -> Self {
        Self {
            id: m.id,
            test_id: m.test_id,
            suite_id: m.suite_id,
            name: m.name,
            description: m.description,
            file_path: m.file_path,
            function_name: m.function_name,
            priority: m.priority,
            timeout: m.timeout,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_timeout() -> i32 {
    300
}

fn default_status() -> String {
    "active".to_string()
}

/// Request to create a test case.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTestCaseRequest {
    pub test_id: String,
    pub suite_id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub file_path: String,
    pub function_name: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_timeout")]
    pub timeout: i32,
    #[serde(default = "default_status")]
    pub status: String,
}

/// Partial update of a test case; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateTestCaseRequest {
    pub test_id: Option<String>,
    pub suite_id: Option<i32>,
    pub name: Option<String>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub file_path: Option<String>,
    pub function_name: Option<String>,
    pub priority: Option<String>,
    pub timeout: Option<i32>,
    pub status: Option<String>,
}

/// Equality filters for listing test cases.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TestCaseFilter {
    pub suite_id: Option<i32>,
    pub status: Option<String>,
    pub priority: Option<String>,
}
