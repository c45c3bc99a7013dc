use serde::Serialize;
use sqlx::PgConnection;

use crate::error::RecordError;
use crate::models::vacancy::RawEmployer;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Employer {
    pub id: i32,
    pub employer_id: i32,
    pub employer_name: Option<String>,
    pub employer_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateEmployer {
    pub employer_id: i32,
    pub employer_name: Option<String>,
    pub employer_url: Option<String>,
}

impl CreateEmployer {
    pub fn from_raw(raw: &RawEmployer) -> Result<Self, RecordError> {
        let external_id = raw.id.as_deref().ok_or(RecordError::MissingEmployerId)?;
        let employer_id = external_id
            .trim()
            .parse::<i32>()
            .map_err(|_| RecordError::InvalidEmployerId(external_id.to_string()))?;
        Ok(CreateEmployer {
            employer_id,
            employer_name: raw.name.clone(),
            employer_url: raw.url.clone(),
        })
    }
}

impl Employer {
    /// Insert the employer unless its external id is already known.
    /// Returns the surrogate id and whether a new row was written.
    pub async fn insert_or_ignore(
        conn: &mut PgConnection,
        input: &CreateEmployer,
    ) -> Result<(i32, bool), RecordError> {
        let inserted: Option<(i32,)> = sqlx::query_as(
            "INSERT INTO employer (employer_id, employer_name, employer_url) VALUES ($1, $2, $3) ON CONFLICT (employer_id) DO NOTHING RETURNING id",
        )
        .bind(input.employer_id)
        .bind(&input.employer_name)
        .bind(&input.employer_url)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some((id,)) = inserted {
            return Ok((id, true));
        }

        let (id,): (i32,) = sqlx::query_as("SELECT id FROM employer WHERE employer_id = $1")
            .bind(input.employer_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok((id, false))
    }

    pub async fn list(conn: &mut PgConnection) -> Result<Vec<Employer>, sqlx::Error> {
        sqlx::query_as::<_, Employer>("SELECT * FROM employer ORDER BY id")
            .fetch_all(&mut *conn)
            .await
    }
}
