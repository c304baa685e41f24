//! Test suite models: a named group of test cases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::test_suite;

/// Test suite with its case count computed at request time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestSuiteResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub enabled: bool,
    pub test_count: u64,
    pub created_at: DateTime<Utc>,
}

impl TestSuiteResponse {
    pub fn from_model(m: test_suite::Model, test_count: u64) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            category: m.category,
            enabled: m.enabled,
            test_count,
            created_at: m.created_at,
        }
    }
}

fn default_category() -> String {
    "general".to_string()
}

fn default_enabled() -> bool {
    true
}

/// Request to create a test suite.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTestSuiteRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// Partial update of a test suite; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateTestSuiteRequest {
    pub name: Option<String>,
    /// `null` clears the description.
    #[serde(default, deserialize_with = "super::nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub enabled: Option<bool>,
}
