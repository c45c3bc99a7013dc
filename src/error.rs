use reqwest::StatusCode;

/// Fatal errors. Any of these ends the run.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Listing API returned {status}")]
    Transport { status: StatusCode },

    #[error("Listing request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode listing page {page}: {source}")]
    Decode {
        page: u32,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// Errors confined to a single vacancy during ingestion. The writer logs
/// these and moves on to the next record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("vacancy has no employer")]
    MissingEmployer,

    #[error("employer has no id")]
    MissingEmployerId,

    #[error("employer id '{0}' is not an integer")]
    InvalidEmployerId(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RecordError {
    /// Data problems are expected in a best-effort load; database rejections
    /// are worth a louder log line.
    pub fn is_data_problem(&self) -> bool {
        !matches!(self, RecordError::Database(_))
    }
}
