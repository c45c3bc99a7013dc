use crate::collectors::VacancySource;
use crate::db::schema::SchemaManager;
use crate::db::writer::{IngestSummary, IngestionWriter};
use crate::error::AppError;

/// One ingestion run: fetch everything, recreate the database, write.
/// All pages are fetched before the database is dropped.
pub async fn ingest(
    source: &dyn VacancySource,
    schema: &dyn SchemaManager,
    writer: &dyn IngestionWriter,
    database: &str,
) -> Result<IngestSummary, AppError> {
    tracing::info!("Fetching vacancies from '{}'", source.name());
    let vacancies = source.fetch().await?;

    schema.ensure_database(database).await?;
    schema.ensure_tables().await?;

    let summary = writer.write(&vacancies).await?;
    tracing::info!(
        "Run completed: {} valid vacancies, {} stored, {} skipped",
        vacancies.len(),
        summary.inserted,
        summary.skipped
    );
    Ok(summary)
}
