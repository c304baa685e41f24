//! Create test_cases table.

use sea_orm_migration::prelude::*;

use super::m20261019_000003_create_test_suites::TestSuites;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestCases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TestCases::TestId)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TestCases::SuiteId).integer().not_null())
                    .col(ColumnDef::new(TestCases::Name).string_len(255).not_null())
                    .col(ColumnDef::new(TestCases::Description).text())
                    .col(
                        ColumnDef::new(TestCases::FilePath)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCases::FunctionName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCases::Priority)
                            .string_len(20)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(TestCases::Timeout)
                            .integer()
                            .not_null()
                            .default(300),
                    )
                    .col(
                        ColumnDef::new(TestCases::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(TestCases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TestCases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCases::Table, TestCases::SuiteId)
                            .to(TestSuites::Table, TestSuites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_cases_suite_id")
                    .table(TestCases::Table)
                    .col(TestCases::SuiteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_cases_status")
                    .table(TestCases::Table)
                    .col(TestCases::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestCases {
    Table,
    Id,
    TestId,
    SuiteId,
    Name,
    Description,
    FilePath,
    FunctionName,
    Priority,
    Timeout,
    Status,
    CreatedAt,
    UpdatedAt,
}
