//! Create test_results table.

use sea_orm_migration::prelude::*;

use super::m20261019_000004_create_test_cases::TestCases;
use super::m20261019_000005_create_test_runs::TestRuns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestResults::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestResults::TestRunId).integer().not_null())
                    .col(ColumnDef::new(TestResults::TestCaseId).integer().not_null())
                    .col(
                        ColumnDef::new(TestResults::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(TestResults::DurationMs).big_integer())
                    .col(ColumnDef::new(TestResults::ErrorMessage).text())
                    .col(ColumnDef::new(TestResults::Output).text())
                    .col(
                        ColumnDef::new(TestResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(TestResults::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(TestResults::CompletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestResults::Table, TestResults::TestRunId)
                            .to(TestRuns::Table, TestRuns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestResults::Table, TestResults::TestCaseId)
                            .to(TestCases::Table, TestCases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_results_run_id")
                    .table(TestResults::Table)
                    .col(TestResults::TestRunId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestResults::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestResults {
    Table,
    Id,
    TestRunId,
    TestCaseId,
    Status,
    DurationMs,
    ErrorMessage,
    Output,
    CreatedAt,
    StartedAt,
    CompletedAt,
}
