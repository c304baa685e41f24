//! Database queries for test runs and their per-case results.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::entity::test_result::{self, Entity as TestResult};
use crate::entity::test_run::{self as run, ActiveModel, Entity as TestRun};
use crate::error::{AppError, AppResult};
use crate::models::{QueryRunsParams, RecordResultRequest, ResultStatus, RunStatus, RunTally};

use super::DbPool;

/// Values for a new run. `case_ids` must be distinct and already validated.
pub struct NewTestRun<'a> {
    pub name: String,
    pub trigger: String,
    pub suite_id: Option<i32>,
    pub triggered_by: Option<&'a str>,
    pub case_ids: &'a [i32],
}

impl DbPool {
    /// List runs matching the filter, newest first.
    pub async fn list_runs(&self, params: &QueryRunsParams) -> AppResult<Vec<run::Model>> {
        let mut query = TestRun::find();

        if let Some(ref status) = params.status {
            query = query.filter(run::Column::Status.eq(status.as_str()));
        }
        if let Some(ref trigger) = params.trigger {
            query = query.filter(run::Column::Trigger.eq(trigger.as_str()));
        }

        let result = query
            .order_by_desc(run::Column::CreatedAt)
            .order_by_desc(run::Column::Id)
            .limit(params.clamped_limit())
            .all(self.connection())
            .await?;

        Ok(result)
    }

    /// Get a run by ID.
    pub async fn get_run(&self, id: i32) -> AppResult<Option<run::Model>> {
        let result = TestRun::find_by_id(id).one(self.connection()).await?;
        Ok(result)
    }

    /// Create a pending run with one pending result per case, atomically.
    pub async fn insert_run(&self, new_run: NewTestRun<'_>) -> AppResult<run::Model> {
        let now = Utc::now();
        let txn = self.connection().begin().await?;

        let model = ActiveModel {
            name: Set(new_run.name),
            trigger: Set(new_run.trigger),
            status: Set(RunStatus::Pending.as_str().to_string()),
            total_tests: Set(new_run.case_ids.len() as i32),
            passed_tests: Set(0),
            failed_tests: Set(0),
            skipped_tests: Set(0),
            error_tests: Set(0),
            suite_id: Set(new_run.suite_id),
            triggered_by: Set(new_run.triggered_by.map(|s| s.to_string())),
            created_at: Set(now),
            started_at: Set(None),
            completed_at: Set(None),
            ..Default::default()
        };
        let inserted = model.insert(&txn).await?;

        let results: Vec<test_result::ActiveModel> = new_run
            .case_ids
            .iter()
            .map(|case_id| test_result::ActiveModel {
                test_run_id: Set(inserted.id),
                test_case_id: Set(*case_id),
                status: Set(ResultStatus::Pending.as_str().to_string()),
                duration_ms: Set(None),
                error_message: Set(None),
                output: Set(None),
                created_at: Set(now),
                started_at: Set(None),
                completed_at: Set(None),
                ..Default::default()
            })
            .collect();

        if !results.is_empty() {
            TestResult::insert_many(results).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(inserted)
    }

    /// Delete a run (its results cascade). Returns false when no row matched.
    pub async fn delete_run(&self, id: i32) -> AppResult<bool> {
        let result = TestRun::delete_by_id(id).exec(self.connection()).await?;
        Ok(result.rows_affected > 0)
    }

    /// All results of a run, in creation order.
    pub async fn list_results(&self, run_id: i32) -> AppResult<Vec<test_result::Model>> {
        let result = TestResult::find()
            .filter(test_result::Column::TestRunId.eq(run_id))
            .order_by_asc(test_result::Column::Id)
            .all(self.connection())
            .await?;

        Ok(result)
    }

    /// Record the outcome of one result and recompute the run's counters and status.
    pub async fn record_result(
        &self,
        run_id: i32,
        result_id: i32,
        req: RecordResultRequest,
    ) -> AppResult<(run::Model, test_result::Model)> {
        let existing_run = self
            .get_run(run_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test run".to_string()))?;

        let run_status = RunStatus::parse(&existing_run.status).unwrap_or(RunStatus::Failed);
        if !run_status.is_active() {
            return Err(AppError::InvalidInput(format!(
                "Test run is already {}",
                run_status
            )));
        }

        if !req.status.is_reportable() {
            return Err(AppError::InvalidInput(format!(
                "Result status '{}' cannot be recorded",
                req.status
            )));
        }

        let existing_result = TestResult::find_by_id(result_id)
            .filter(test_result::Column::TestRunId.eq(run_id))
            .one(self.connection())
            .await?
            .ok_or_else(|| AppError::NotFound("Test result".to_string()))?;

        let now = Utc::now();
        let txn = self.connection().begin().await?;

        let mut result: test_result::ActiveModel = existing_result.clone().into();
        result.status = Set(req.status.as_str().to_string());
        result.duration_ms = Set(req.duration_ms);
        result.error_message = Set(req.error_message);
        result.output = Set(req.output);
        if existing_result.started_at.is_none() {
            result.started_at = Set(Some(now));
        }
        result.completed_at = Set(if req.status.is_unfinished() {
            None
        } else {
            Some(now)
        });
        let updated_result = result.update(&txn).await?;

        let updated_run = refresh_run_counters(&txn, existing_run).await?;

        txn.commit().await?;
        Ok((updated_run, updated_result))
    }

    /// Cancel a pending or running run and every unfinished result in it.
    pub async fn cancel_run(&self, id: i32) -> AppResult<run::Model> {
        let existing = self
            .get_run(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test run".to_string()))?;

        let status = RunStatus::parse(&existing.status).unwrap_or(RunStatus::Failed);
        if !status.is_active() {
            return Err(AppError::InvalidInput(format!(
                "Cannot cancel a test run that is {}",
                status
            )));
        }

        let now = Utc::now();
        let txn = self.connection().begin().await?;

        TestResult::update_many()
            .col_expr(
                test_result::Column::Status,
                Expr::value(ResultStatus::Cancelled.as_str()),
            )
            .col_expr(test_result::Column::CompletedAt, Expr::value(now))
            .filter(test_result::Column::TestRunId.eq(id))
            .filter(test_result::Column::Status.is_in([
                ResultStatus::Pending.as_str(),
                ResultStatus::Running.as_str(),
            ]))
            .exec(&txn)
            .await?;

        let mut active: ActiveModel = existing.into();
        active.status = Set(RunStatus::Cancelled.as_str().to_string());
        active.completed_at = Set(Some(now));
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }
}

/// Rewrite a run's counters and status from its result rows.
///
/// A cancelled run keeps its status and timestamps; only the counters follow.
pub(super) async fn refresh_run_counters(
    txn: &DatabaseTransaction,
    existing: run::Model,
) -> AppResult<run::Model> {
    let statuses: Vec<String> = TestResult::find()
        .select_only()
        .column(test_result::Column::Status)
        .filter(test_result::Column::TestRunId.eq(existing.id))
        .into_tuple()
        .all(txn)
        .await?;

    let tally = RunTally::from_statuses(statuses.iter().map(String::as_str));
    let current = RunStatus::parse(&existing.status).unwrap_or(RunStatus::Failed);
    let now = Utc::now();

    let (status, started_at, completed_at) = if current == RunStatus::Cancelled {
        (current, existing.started_at, existing.completed_at)
    } else {
        let status = tally.derived_status();
        let started_at = match (existing.started_at, status) {
            (Some(t), _) => Some(t),
            (None, RunStatus::Pending) => None,
            (None, _) => Some(now),
        };
        let completed_at = match status {
            RunStatus::Completed | RunStatus::Failed => existing.completed_at.or(Some(now)),
            _ => None,
        };
        (status, started_at, completed_at)
    };

    let mut active: ActiveModel = existing.into();
    active.status = Set(status.as_str().to_string());
    active.total_tests = Set(tally.total);
    active.passed_tests = Set(tally.passed);
    active.failed_tests = Set(tally.failed);
    active.skipped_tests = Set(tally.skipped);
    active.error_tests = Set(tally.error);
    active.started_at = Set(started_at);
    active.completed_at = Set(completed_at);

    let updated = active.update(txn).await?;
    Ok(updated)
}
