use sqlx::postgres::{PgArguments, PgConnectOptions, PgRow};
use sqlx::query::QueryAs;
use sqlx::{Connection, FromRow, Postgres};
use tracing::{Instrument, Span};

use crate::db;
use crate::error::AppError;
use crate::models::vacancy::{AverageSalary, CompanyVacancyCount, Vacancy, VacancyListing};

/// Read-only reports over the loaded vacancies. Every call opens and closes
/// its own connection. Row order is whatever Postgres returns.
pub struct QueryService {
    options: PgConnectOptions,
    span: Span,
}

impl QueryService {
    pub fn new(options: PgConnectOptions, span: Span) -> Self {
        Self { options, span }
    }

    pub async fn companies_and_vacancy_counts(&self) -> Result<Vec<CompanyVacancyCount>, AppError> {
        let query = sqlx::query_as::<_, CompanyVacancyCount>(
            "SELECT employer.employer_name, COUNT(vacancies.id) AS vacancy_count
             FROM vacancies
             JOIN employer ON employer.id = vacancies.employer_id
             GROUP BY employer.id, employer.employer_name",
        );
        self.fetch("companies and vacancy counts", query).await
    }

    pub async fn all_vacancies(&self) -> Result<Vec<VacancyListing>, AppError> {
        let query = sqlx::query_as::<_, VacancyListing>(
            "SELECT employer.employer_name, vacancies.vacancy_name, vacancies.salary, vacancies.vacancy_url
             FROM vacancies
             JOIN employer ON employer.id = vacancies.employer_id",
        );
        self.fetch("all vacancies", query).await
    }

    /// Averages come back as NUMERIC, so they are exact decimals.
    pub async fn average_salary_by_vacancy_name(&self) -> Result<Vec<AverageSalary>, AppError> {
        let query = sqlx::query_as::<_, AverageSalary>(
            "SELECT vacancy_name, AVG(salary) AS avg_salary FROM vacancies GROUP BY vacancy_name",
        );
        self.fetch("average salary by vacancy name", query).await
    }

    pub async fn vacancies_above_average_salary(&self) -> Result<Vec<Vacancy>, AppError> {
        let query = sqlx::query_as::<_, Vacancy>(
            "SELECT * FROM vacancies WHERE salary > (SELECT AVG(salary) FROM vacancies)",
        );
        self.fetch("vacancies above average salary", query).await
    }

    /// Case-sensitive substring search on the vacancy name.
    pub async fn vacancies_by_keyword(&self, keyword: &str) -> Result<Vec<Vacancy>, AppError> {
        let query = sqlx::query_as::<_, Vacancy>(
            r"SELECT * FROM vacancies WHERE vacancy_name LIKE $1 ESCAPE '\'",
        )
        .bind(contains_pattern(keyword));
        self.fetch("vacancies by keyword", query).await
    }

    async fn fetch<'q, T>(
        &self,
        what: &str,
        query: QueryAs<'q, Postgres, T, PgArguments>,
    ) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        async {
            tracing::info!("Running query: {what}");
            let mut conn = db::connect(&self.options).await?;
            let rows = query.fetch_all(&mut conn).await.map_err(AppError::Query)?;
            conn.close().await.map_err(AppError::Connection)?;
            tracing::info!("Query '{what}' returned {} rows", rows.len());
            Ok::<_, AppError>(rows)
        }
        .instrument(self.span.clone())
        .await
    }
}

/// `%keyword%` with LIKE metacharacters in the keyword escaped.
fn contains_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_keyword_in_wildcards() {
        assert_eq!(contains_pattern("Специалист"), "%Специалист%");
        assert_eq!(contains_pattern(""), "%%");
    }

    #[test]
    fn escapes_like_metacharacters() {
        assert_eq!(contains_pattern("100%"), r"%100\%%");
        assert_eq!(contains_pattern("a_b"), r"%a\_b%");
        assert_eq!(contains_pattern(r"C:\"), r"%C:\\%");
        assert_eq!(contains_pattern("'; DROP TABLE vacancies; --"), "%'; DROP TABLE vacancies; --%");
    }
}
