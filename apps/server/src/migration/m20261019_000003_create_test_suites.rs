//! Create test_suites table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestSuites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestSuites::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TestSuites::Name)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TestSuites::Description).text())
                    .col(
                        ColumnDef::new(TestSuites::Category)
                            .string_len(50)
                            .not_null()
                            .default("general"),
                    )
                    .col(
                        ColumnDef::new(TestSuites::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TestSuites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestSuites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestSuites {
    Table,
    Id,
    Name,
    Description,
    Category,
    Enabled,
    CreatedAt,
}
