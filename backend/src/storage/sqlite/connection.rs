use anyhow::Result;
use log::{info, warn};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

use super::{FeedbackRepository, UserRepository, VisitRepository};
use crate::storage::traits::Connection;

/// Tables the service reads and writes, in creation order
pub const TABLES: [&str; 4] = ["users", "visits", "feedback", "facility_usage"];

/// Result of probing one table
#[derive(Debug, Clone, PartialEq)]
pub struct TableCheck {
    pub table: &'static str,
    pub error: Option<String>,
}

/// DbConnection manages the SQLite pool shared by all repositories
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (creating if needed) the database at `url` and set up the schema
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database at {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::from_pool(pool).await
    }

    /// Initialize a private in-memory database for a single test
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        // One long-lived connection keeps the in-memory database alive
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        Self::setup_schema(&pool).await?;
        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Probe every table with a trivial query
    pub async fn check_tables(&self) -> Vec<TableCheck> {
        let mut checks = Vec::with_capacity(TABLES.len());
        for table in TABLES {
            let query = format!("SELECT 1 FROM {} LIMIT 1", table);
            let error = match sqlx::query(&query).fetch_optional(self.pool()).await {
                Ok(_) => None,
                Err(e) => {
                    warn!("Table '{}' is not accessible: {}", table, e);
                    Some(e.to_string())
                }
            };
            checks.push(TableCheck { table, error });
        }
        checks
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                birthdate TEXT NOT NULL,
                guardian_name TEXT NOT NULL,
                guardian_contact TEXT NOT NULL,
                emergency_contact TEXT,
                photo_url TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_users_name
            ON users(name);
            "#,
        )
        .execute(pool)
        .await?;

        // No foreign key on user_id: visits outlive deleted users
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                check_in_time TEXT NOT NULL,
                check_out_time TEXT,
                duration REAL,
                created_at TEXT NOT NULL,
                CHECK ((check_out_time IS NULL) = (duration IS NULL))
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_visits_check_in_time
            ON visits(check_in_time);
            "#,
        )
        .execute(pool)
        .await?;

        // At most one open visit per user
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_visits_open_per_user
            ON visits(user_id) WHERE check_out_time IS NULL;
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feedback (
                id TEXT PRIMARY KEY,
                visit_id TEXT NOT NULL UNIQUE,
                rating INTEGER NOT NULL CHECK (rating >= 1 AND rating <= 5),
                comments TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                FOREIGN KEY (visit_id) REFERENCES visits (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS facility_usage (
                id TEXT PRIMARY KEY,
                visit_id TEXT NOT NULL,
                facility_name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (visit_id) REFERENCES visits (id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_facility_usage_visit_id
            ON facility_usage(visit_id);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type UserRepository = UserRepository;
    type VisitRepository = VisitRepository;
    type FeedbackRepository = FeedbackRepository;

    fn create_user_repository(&self) -> UserRepository {
        UserRepository::new(self.clone())
    }

    fn create_visit_repository(&self) -> VisitRepository {
        VisitRepository::new(self.clone())
    }

    fn create_feedback_repository(&self) -> FeedbackRepository {
        FeedbackRepository::new(self.clone())
    }
}
