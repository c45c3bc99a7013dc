use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use tracing::{Instrument, Span};

use crate::db;
use crate::error::{AppError, RecordError};
use crate::models::employer::{CreateEmployer, Employer};
use crate::models::vacancy::{CreateVacancy, RawVacancy, Vacancy};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub new_employers: usize,
}

/// Persists validated vacancies. Bad records are skipped, never fatal;
/// only connection and commit failures are returned as errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngestionWriter: Send + Sync {
    async fn write(&self, records: &[RawVacancy]) -> Result<IngestSummary, AppError>;
}

pub struct PgWriter {
    options: PgConnectOptions,
    span: Span,
}

impl PgWriter {
    pub fn new(options: PgConnectOptions, span: Span) -> Self {
        Self { options, span }
    }
}

#[async_trait]
impl IngestionWriter for PgWriter {
    async fn write(&self, records: &[RawVacancy]) -> Result<IngestSummary, AppError> {
        async {
            tracing::info!("Writing {} vacancies", records.len());

            let mut conn = db::connect(&self.options).await?;
            let mut tx = conn.begin().await.map_err(AppError::Connection)?;
            let mut summary = IngestSummary::default();

            for record in records {
                // One savepoint per record; a rejected row rolls back only itself.
                let mut savepoint = Connection::begin(&mut *tx)
                    .await
                    .map_err(AppError::Connection)?;

                match write_record(&mut savepoint, record).await {
                    Ok(new_employer) => {
                        savepoint.commit().await.map_err(AppError::Connection)?;
                        summary.inserted += 1;
                        if new_employer {
                            summary.new_employers += 1;
                        }
                        tracing::debug!("Vacancy {} inserted", record.id);
                    }
                    Err(e) => {
                        savepoint.rollback().await.map_err(AppError::Connection)?;
                        summary.skipped += 1;
                        if e.is_data_problem() {
                            tracing::warn!("Skipping vacancy {}: {e}", record.id);
                        } else {
                            tracing::error!("Failed to insert vacancy {}: {e}", record.id);
                        }
                    }
                }
            }

            tx.commit().await.map_err(AppError::Connection)?;
            conn.close().await.map_err(AppError::Connection)?;

            tracing::info!(
                "Ingest complete: {} inserted, {} skipped, {} new employers",
                summary.inserted,
                summary.skipped,
                summary.new_employers
            );
            Ok::<_, AppError>(summary)
        }
        .instrument(self.span.clone())
        .await
    }
}

/// Store one vacancy and its employer. Returns true when the employer row
/// was created by this call.
async fn write_record(conn: &mut PgConnection, record: &RawVacancy) -> Result<bool, RecordError> {
    let raw_employer = record
        .employer
        .as_ref()
        .ok_or(RecordError::MissingEmployer)?;
    let employer = CreateEmployer::from_raw(raw_employer)?;

    let (employer_id, created) = Employer::insert_or_ignore(conn, &employer).await?;
    if !created {
        tracing::warn!("Employer {} already exists, reusing it", employer.employer_id);
    }

    Vacancy::create(conn, &CreateVacancy::from_raw(record, employer_id)).await?;
    Ok(created)
}
