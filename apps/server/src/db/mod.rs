//! Database module providing connection management, migrations, and queries.

pub mod settings;
pub mod test_cases;
pub mod test_runs;
pub mod test_suites;
pub mod users;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Pool connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Database connection pool wrapper.
/// `DatabaseConnection` is internally pooled and cheap to clone.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect_timeout(CONNECT_TIMEOUT)
            .sqlx_logging(false);

        Self::connect(options).await
    }

    /// Connect with explicit options (used by tests for in-memory SQLite).
    pub async fn connect(options: ConnectOptions) -> AppResult<Self> {
        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply all pending schema migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Round-trip a trivial statement; used by the readiness probe.
    pub async fn ping(&self) -> AppResult<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::Database(format!("Database ping failed: {}", e)))?;
        Ok(())
    }
}
