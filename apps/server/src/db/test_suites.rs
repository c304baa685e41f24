//! Database queries for test suites.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::test_case::{self, Entity as TestCase};
use crate::entity::test_suite::{self as suite, ActiveModel, Entity as TestSuite};
use crate::error::{AppError, AppResult};
use crate::models::{CreateTestSuiteRequest, UpdateTestSuiteRequest};

use super::DbPool;

impl DbPool {
    /// List all suites ordered by name.
    pub async fn list_suites(&self) -> AppResult<Vec<suite::Model>> {
        let result = TestSuite::find()
            .order_by_asc(suite::Column::Name)
            .all(self.connection())
            .await?;

        Ok(result)
    }

    /// Get a suite by ID.
    pub async fn get_suite(&self, id: i32) -> AppResult<Option<suite::Model>> {
        let result = TestSuite::find_by_id(id).one(self.connection()).await?;
        Ok(result)
    }

    /// Get a suite by its unique name.
    pub async fn get_suite_by_name(&self, name: &str) -> AppResult<Option<suite::Model>> {
        let result = TestSuite::find()
            .filter(suite::Column::Name.eq(name))
            .one(self.connection())
            .await?;

        Ok(result)
    }

    /// Number of test cases belonging to a suite.
    pub async fn count_cases_in_suite(&self, suite_id: i32) -> AppResult<u64> {
        let count = TestCase::find()
            .filter(test_case::Column::SuiteId.eq(suite_id))
            .count(self.connection())
            .await?;

        Ok(count)
    }

    /// IDs of the test cases belonging to a suite, ascending.
    pub async fn case_ids_in_suite(&self, suite_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = TestCase::find()
            .select_only()
            .column(test_case::Column::Id)
            .filter(test_case::Column::SuiteId.eq(suite_id))
            .order_by_asc(test_case::Column::Id)
            .into_tuple()
            .all(self.connection())
            .await?;

        Ok(ids)
    }

    /// Insert a new suite. Fails with `Conflict` when the name is taken.
    pub async fn insert_suite(&self, req: CreateTestSuiteRequest) -> AppResult<suite::Model> {
        if self.get_suite_by_name(&req.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Test suite '{}' already exists",
                req.name
            )));
        }

        let model = ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            category: Set(req.category),
            enabled: Set(req.enabled),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = model.insert(self.connection()).await?;
        Ok(result)
    }

    /// Apply a partial update. Fails with `NotFound` or `Conflict`.
    pub async fn update_suite(
        &self,
        id: i32,
        req: UpdateTestSuiteRequest,
    ) -> AppResult<suite::Model> {
        let existing = self
            .get_suite(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Test suite".to_string()))?;

        if let Some(ref name) = req.name {
            if name != &existing.name && self.get_suite_by_name(name).await?.is_some() {
                return Err(AppError::Conflict(format!(
                    "Test suite '{}' already exists",
                    name
                )));
            }
        }

        let mut active: ActiveModel = existing.into();
        if let Some(name) = req.name {
            active.name = Set(name);
        }
        if let Some(description) = req.description {
            active.description = Set(description);
        }
        if let Some(category) = req.category {
            active.category = Set(category);
        }
        if let Some(enabled) = req.enabled {
            active.enabled = Set(enabled);
        }

        let result = active.update(self.connection()).await?;
        Ok(result)
    }
}
