//! Create test_runs table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestRuns::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestRuns::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(TestRuns::Trigger)
                            .string_len(20)
                            .not_null()
                            .default("manual"),
                    )
                    .col(
                        ColumnDef::new(TestRuns::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(TestRuns::TotalTests)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TestRuns::PassedTests)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TestRuns::FailedTests)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TestRuns::SkippedTests)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TestRuns::ErrorTests)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TestRuns::SuiteId).integer())
                    .col(ColumnDef::new(TestRuns::TriggeredBy).string_len(50))
                    .col(
                        ColumnDef::new(TestRuns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(TestRuns::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(TestRuns::CompletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_runs_status")
                    .table(TestRuns::Table)
                    .col(TestRuns::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestRuns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestRuns {
    Table,
    Id,
    Name,
    Trigger,
    Status,
    TotalTests,
    PassedTests,
    FailedTests,
    SkippedTests,
    ErrorTests,
    SuiteId,
    TriggeredBy,
    CreatedAt,
    StartedAt,
    CompletedAt,
}
