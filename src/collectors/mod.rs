// Vacancy sources. The pipeline only sees the VacancySource trait, so the
// listing API can be swapped without touching ingestion.

pub mod headhunter;
pub mod runner;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::vacancy::RawVacancy;

/// Trait that every vacancy source implements.
/// `fetch` returns only records that passed the validity filter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VacancySource: Send + Sync {
    /// Human-readable source name for logs.
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<RawVacancy>, AppError>;
}

/// One page of a paginated listing endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageClient: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Vec<RawVacancy>, AppError>;
}

/// Drop every record lacking a salary or an address.
pub fn filter_valid(records: Vec<RawVacancy>) -> Vec<RawVacancy> {
    records.into_iter().filter(RawVacancy::is_valid).collect()
}
