//! Database queries for test cases.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use crate::entity::test_case::{self, ActiveModel, Entity as TestCase};
use crate::entity::test_result::{self, Entity as TestResult};
use crate::entity::test_run::{self, Entity as TestRun};
use crate::error::{AppError, AppResult};
use crate::models::{CreateTestCaseRequest, TestCaseFilter, UpdateTestCaseRequest};

use super::DbPool;
use super::test_runs::refresh_run_counters;

impl DbPool {
    /// List test cases matching the filter, ordered by `test_id`.
    pub async fn list_cases(&self, filter: &TestCaseFilter) -> AppResult<Vec<test_case::Model>> {
        let mut query = TestCase::find();

        if let Some(suite_id) = filter.suite_id {
            query = query.filter(test_case::Column::SuiteId.eq(suite_id));
        }
        if let Some(ref status) = filter.status {
            query = query.filter(test_case::Column::Status.eq(status.as_str()));
        }
        if let Some(ref priority) = filter.priority {
            query = query.filter(test_case::Column::Priority.eq(priority.as_str()));
        }

        let result = query
            .order_by_asc(test_case::Column::TestId)
            .all(self.connection())
            .await?;

        Ok(result)
    }

    /// Get a test case by ID.
    pub async fn get_case(&self, id: i32) -> AppResult<Option<test_case::Model>> {
        let result = TestCase::find_by_id(id).one(self.connection()).await?;
        Ok(result)
    }

    /// Get test cases by a set of IDs.
    pub async fn get_cases_by_ids(&self, ids: &[i32]) -> AppResult<Vec<test_case::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = TestCase::find()
            .filter(test_case::Column::Id.is_in(ids.iter().copied()))
            .all(self.connection())
            .await?;

        Ok(result)
    }

    async fn test_id_taken(&self, test_id: &str) -> AppResult<bool> {
        let found = TestCase::find()
            .filter(test_case::Column::TestId.eq(test_id))
            .one(self.connection())
            .await?;

        Ok(found.is_some())
    }

    async fn ensure_suite_exists(&self, suite_id: i32) -> AppResult<()> {
        if self.get_suite(suite_id).await?.is_none() {
            return Err(AppError::NotFound("Test suite".to_string()));
        }
        Ok(())
    }

    /// Insert a new test case. Unknown suite → `NotFound`; duplicate `test_id` → `Conflict`.
    pub async fn insert_case(&self, req: CreateTestCaseRequest) -> AppResult<test_case::Model> {
        self.ensure_suite_exists(req.suite_id).await?;

        if self.test_id_taken(&req.test_id).await? {
            return Err(AppError::Conflict(format!(
                "Test case '{}' already exists",
                req.test_id
            )));
        }

        let now = Utc::now();
        let model = ActiveModel {
            test_id: Set(req.test_id),
            suite_id: Set(req.suite_id),
            name: Set(req.name),
            description: Set(req.description),
            file_path: Set(req.file_path),
            function_name: Set(req.function_name),
            priority: Set(req.priority),
            timeout: Set(req.timeout),
            status: Set(req.status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(self.connection()).await?;
        Ok(result)
    }

    /// Apply a partial update and bump `updated_at`.
    pub async fn update_case(
        &self,
        id: i32,
        req: UpdateTestCaseRequest,
    ) -> AppResult<test_case::Model> {
        let existing = self
            .get_case(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test case".to_string()))?;

        if let Some(ref test_id) = req.test_id {
            if test_id != &existing.test_id && self.test_id_taken(test_id).await? {
                return Err(AppError::Conflict(format!(
                    "Test case '{}' already exists",
                    test_id
                )));
            }
        }
        if let Some(suite_id) = req.suite_id {
            self.ensure_suite_exists(suite_id).await?;
        }

        let mut active: ActiveModel = existing.into();
        if let Some(v) = req.test_id {
            active.test_id = Set(v);
        }
        if let Some(v) = req.suite_id {
            active.suite_id = Set(v);
        }
        if let Some(v) = req.name {
            active.name = Set(v);
        }
        if let Some(v) = req.description {
            active.description = Set(v);
        }
        if let Some(v) = req.file_path {
            active.file_path = Set(v);
        }
        if let Some(v) = req.function_name {
            active.function_name = Set(v);
        }
        if let Some(v) = req.priority {
            active.priority = Set(v);
        }
        if let Some(v) = req.timeout {
            active.timeout = Set(v);
        }
        if let Some(v) = req.status {
            active.status = Set(v);
        }
        active.updated_at = Set(Utc::now());

        let result = active.update(self.connection()).await?;
        Ok(result)
    }

    /// Delete a test case. Its results cascade and every run that held one
    /// has its counters and status recomputed. Returns false when no row matched.
    pub async fn delete_case(&self, id: i32) -> AppResult<bool> {
        let txn = self.connection().begin().await?;

        let run_ids: Vec<i32> = TestResult::find()
            .select_only()
            .column(test_result::Column::TestRunId)
            .distinct()
            .filter(test_result::Column::TestCaseId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        let result = TestCase::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        let runs = TestRun::find()
            .filter(test_run::Column::Id.is_in(run_ids))
            .all(&txn)
            .await?;
        for run in runs {
            refresh_run_counters(&txn, run).await?;
        }

        txn.commit().await?;
        Ok(true)
    }
}
