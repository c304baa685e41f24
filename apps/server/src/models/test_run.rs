//! Test run and per-case result models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{test_result, test_run};

/// Lifecycle of a test run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the run can still change (cancel, record results).
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single test case within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
    Error,
    Cancelled,
}

impl ResultStatus {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "passed" => Some(Self::Passed),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            "error" => Some(Self::Error),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the case has not produced an outcome yet.
    pub fn is_unfinished(&self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Whether a client may report this status for a result.
    ///
    /// `pending` is the initial state and `cancelled` is only set by cancelling the run.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::Pending | Self::Cancelled)
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate counters of a run, derived from its result rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub total: i32,
    pub passed: i32,
    pub failed: i32,
    pub skipped: i32,
    pub error: i32,
    pub unfinished: i32,
    pub started: i32,
}

impl RunTally {
    /// Count result statuses. Unknown strings count as errors.
    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tally = RunTally::default();
        for raw in statuses {
            tally.total += 1;
            match ResultStatus::parse(raw).unwrap_or(ResultStatus::Error) {
                ResultStatus::Pending => tally.unfinished += 1,
                ResultStatus::Running => {
                    tally.unfinished += 1;
                    tally.started += 1;
                }
                ResultStatus::Passed => tally.passed += 1,
                ResultStatus::Failed => tally.failed += 1,
                ResultStatus::Skipped => tally.skipped += 1,
                ResultStatus::Error => tally.error += 1,
                ResultStatus::Cancelled => {}
            }
        }
        tally
    }

    /// Status of an active run after its results changed.
    pub fn derived_status(&self) -> RunStatus {
        let finished = self.passed + self.failed + self.skipped + self.error;
        if self.unfinished == 0 {
            if self.failed > 0 || self.error > 0 {
                RunStatus::Failed
            } else {
                RunStatus::Completed
            }
        } else if finished > 0 || self.started > 0 {
            RunStatus::Running
        } else {
            RunStatus::Pending
        }
    }
}

/// Test run as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestRunResponse {
    pub id: i32,
    pub name: String,
    pub trigger: String,
    pub status: String,
    pub total_tests: i32,
    pub passed_tests: i32,
    pub failed_tests: i32,
    pub skipped_tests: i32,
    pub error_tests: i32,
    pub suite_id: Option<i32>,
    pub triggered_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<test_run::Model> for TestRunResponse {
    fn from(m: test_run::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            trigger: m.trigger,
            status: m.status,
            total_tests: m.total_tests,
            passed_tests: m.passed_tests,
            failed_tests: m.failed_tests,
            skipped_tests: m.skipped_tests,
            error_tests: m.error_tests,
            suite_id: m.suite_id,
            triggered_by: m.triggered_by,
            created_at: m.created_at,
            started_at: m.started_at,
            completed_at: m.completed_at,
        }
    }
}

/// Per-case result as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestResultResponse {
    pub id: i32,
    pub test_run_id: i32,
    pub test_case_id: i32,
    pub status: String,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
    pub output: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<test_result::Model> for TestResultResponse {
    fn from(m: test_result::Model) -> Self {
        Self {
            id: m.id,
            test_run_id: m.test_run_id,
            test_case_id: m.test_case_id,
            status: m.status,
            duration_ms: m.duration_ms,
            error_message: m.error_message,
            output: m.output,
            created_at: m.created_at,
            started_at: m.started_at,
            completed_at: m.completed_at,
        }
    }
}

fn default_trigger() -> String {
    "manual".to_string()
}

/// Request to start a run over explicit test case ids.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTestRunRequest {
    #[serde(default)]
    pub test_case_ids: Vec<i32>,
    #[serde(default = "default_trigger")]
    pub trigger: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Optional body for run-by-suite.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SuiteRunRequest {
    pub trigger: Option<String>,
    pub name: Option<String>,
}

/// Outcome reported for one result row.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecordResultRequest {
    pub status: ResultStatus,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

/// Query parameters for listing runs.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QueryRunsParams {
    pub status: Option<String>,
    pub trigger: Option<String>,
    pub limit: Option<u64>,
}

const DEFAULT_RUN_LIMIT: u64 = 100;
const MAX_RUN_LIMIT: u64 = 500;

impl QueryRunsParams {
    /// Clamp limit to maximum allowed value.
    pub fn clamped_limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_RUN_LIMIT).clamp(1, MAX_RUN_LIMIT)
    }
}
