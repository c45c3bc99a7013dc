use async_trait::async_trait;
use sqlx::{Connection, Executor};
use tracing::{Instrument, Span};

use crate::config::validate_identifier;
use crate::db::{self, Database};
use crate::error::AppError;

const CREATE_EMPLOYER: &str = "CREATE TABLE IF NOT EXISTS employer (
    id SERIAL PRIMARY KEY,
    employer_id INT NOT NULL UNIQUE,
    employer_name VARCHAR(255),
    employer_url VARCHAR(255)
)";

const CREATE_VACANCIES: &str = "CREATE TABLE IF NOT EXISTS vacancies (
    id SERIAL PRIMARY KEY,
    vacancy_name VARCHAR(255),
    vacancy_url VARCHAR(255),
    city VARCHAR(100),
    salary INT,
    employer_id INT NOT NULL REFERENCES employer (id)
)";

/// Owns the lifecycle of the vacancy database and its tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaManager: Send + Sync {
    /// Drop `name` if it exists and create it empty.
    async fn ensure_database(&self, name: &str) -> Result<(), AppError>;

    /// Create `employer` and `vacancies` unless they already exist.
    async fn ensure_tables(&self) -> Result<(), AppError>;
}

pub struct PgSchema {
    db: Database,
    span: Span,
}

impl PgSchema {
    pub fn new(db: Database, span: Span) -> Self {
        Self { db, span }
    }
}

#[async_trait]
impl SchemaManager for PgSchema {
    async fn ensure_database(&self, name: &str) -> Result<(), AppError> {
        async {
            validate_identifier(name)?;
            tracing::info!("Recreating database {name}");

            // DROP/CREATE DATABASE refuse to run in a transaction block, so
            // these go out as plain autocommit statements.
            let mut conn = db::connect(self.db.maintenance_options()).await?;
            let drop_sql = format!("DROP DATABASE IF EXISTS \"{name}\"");
            let create_sql = format!("CREATE DATABASE \"{name}\"");
            conn.execute(drop_sql.as_str())
                .await
                .map_err(AppError::Schema)?;
            conn.execute(create_sql.as_str())
                .await
                .map_err(AppError::Schema)?;
            conn.close().await.map_err(AppError::Connection)?;

            tracing::info!("Database {name} created");
            Ok::<(), AppError>(())
        }
        .instrument(self.span.clone())
        .await
    }

    async fn ensure_tables(&self) -> Result<(), AppError> {
        async {
            tracing::info!("Creating tables in {}", self.db.name());

            let mut conn = db::connect(&self.db.options()).await?;
            for ddl in [CREATE_EMPLOYER, CREATE_VACANCIES] {
                conn.execute(ddl)
                    .await
                    .map_err(AppError::Schema)?;
            }
            conn.close().await.map_err(AppError::Connection)?;

            tracing::info!("Tables ready");
            Ok::<(), AppError>(())
        }
        .instrument(self.span.clone())
        .await
    }
}
