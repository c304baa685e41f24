//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261019_000001_create_users;
mod m20261019_000002_create_settings;
mod m20261019_000003_create_test_suites;
mod m20261019_000004_create_test_cases;
mod m20261019_000005_create_test_runs;
mod m20261019_000006_create_test_results;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261019_000001_create_users::Migration),
            Box::new(m20261019_000002_create_settings::Migration),
            Box::new(m20261019_000003_create_test_suites::Migration),
            Box::new(m20261019_000004_create_test_cases::Migration),
            Box::new(m20261019_000005_create_test_runs::Migration),
            Box::new(m20261019_000006_create_test_results::Migration),
        ]
    }
}
