//! Create settings table (single-row configuration).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Settings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Settings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Settings::AiopsUrl).string_len(255))
                    .col(ColumnDef::new(Settings::ApiToken).string_len(500))
                    .col(ColumnDef::new(Settings::SshHost).string_len(255))
                    .col(ColumnDef::new(Settings::SshPort).integer())
                    .col(ColumnDef::new(Settings::TestPath).string_len(500))
                    .col(ColumnDef::new(Settings::Timeout).integer())
                    .col(
                        ColumnDef::new(Settings::ParallelExecution)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Settings::MaxParallel)
                            .integer()
                            .not_null()
                            .default(5),
                    )
                    .col(
                        ColumnDef::new(Settings::RetryFailed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Settings::RetryCount)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .col(
                        ColumnDef::new(Settings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Settings::UpdatedBy).string_len(50))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Settings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Settings {
    Table,
    Id,
    AiopsUrl,
    ApiToken,
    SshHost,
    SshPort,
    TestPath,
    Timeout,
    ParallelExecution,
    MaxParallel,
    RetryFailed,
    RetryCount,
    UpdatedAt,
    UpdatedBy,
}
