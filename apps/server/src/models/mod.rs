//! Domain models and request/response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod settings;
pub mod test_case;
pub mod test_run;
pub mod test_suite;
pub mod user;

// Re-export commonly used types
pub use settings::{
    ConnectionTestRequest, ConnectionTestResponse, SettingsResponse, SettingsUpdate,
};
pub use test_case::{
    CreateTestCaseRequest, TestCaseFilter, TestCaseResponse, UpdateTestCaseRequest,
};
pub use test_run::{
    CreateTestRunRequest, QueryRunsParams, RecordResultRequest, ResultStatus, RunStatus,
    RunTally, SuiteRunRequest, TestResultResponse, TestRunResponse,
};
pub use test_suite::{CreateTestSuiteRequest, TestSuiteResponse, UpdateTestSuiteRequest};
pub use user::{
    LoginForm, RegisterRequest, RegisterResponse, TokenResponse, User, UserListItem,
    UserResponse,
};

/// Deserialize a field where an explicit `null` differs from an absent key.
///
/// Used with `#[serde(default)]`: absent yields `None`, `null` yields `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
