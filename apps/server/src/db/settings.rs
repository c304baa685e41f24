//! Database queries for the singleton settings row.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};

use crate::entity::settings::{self, ActiveModel, Entity as Settings};
use crate::error::AppResult;
use crate::models::SettingsUpdate;

use super::DbPool;

impl DbPool {
    /// Get the settings row, if one was ever saved.
    pub async fn get_settings(&self) -> AppResult<Option<settings::Model>> {
        let result = Settings::find()
            .order_by_asc(settings::Column::Id)
            .one(self.connection())
            .await?;

        Ok(result)
    }

    /// Create or overwrite the settings row. Every field of `update` is written.
    pub async fn save_settings(
        &self,
        update: SettingsUpdate,
        updated_by: &str,
    ) -> AppResult<settings::Model> {
        let existing = self.get_settings().await?;
        let is_new = existing.is_none();
        let mut active: ActiveModel = match existing {
            Some(existing) => existing.into(),
            None => ActiveModel {
                ..Default::default()
            },
        };

        active.aiops_url = Set(update.aiops_url);
        active.api_token = Set(update.api_token);
        active.ssh_host = Set(update.ssh_host);
        active.ssh_port = Set(update.ssh_port);
        active.test_path = Set(update.test_path);
        active.timeout = Set(update.timeout);
        active.parallel_execution = Set(update.parallel_execution);
        active.max_parallel = Set(update.max_parallel);
        active.retry_failed = Set(update.retry_failed);
        active.retry_count = Set(update.retry_count);
        active.updated_at = Set(Utc::now());
        active.updated_by = Set(Some(updated_by.to_string()));

        let model = if is_new {
            active.insert(self.connection()).await?
        } else {
            active.update(self.connection()).await?
        };

        Ok(model)
    }
}
