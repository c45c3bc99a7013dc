use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use crate::error::RecordError;

/// A listing record as delivered by the vacancy API, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawVacancy {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "alternate_url")]
    pub url: Option<String>,
    #[serde(default)]
    pub salary: Option<RawSalary>,
    #[serde(default)]
    pub address: Option<RawAddress>,
    #[serde(default)]
    pub employer: Option<RawEmployer>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSalary {
    pub from: Option<i32>,
    pub to: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawAddress {
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEmployer {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "alternate_url")]
    pub url: Option<String>,
}

impl RawVacancy {
    /// Only records with both a salary and an address object are kept.
    /// A salary object whose bounds are both null still counts as present.
    pub fn is_valid(&self) -> bool {
        self.salary.is_some() && self.address.is_some()
    }

    /// Lower bound when given, otherwise the upper bound.
    pub fn salary_value(&self) -> Option<i32> {
        self.salary.as_ref().and_then(|s| s.from.or(s.to))
    }

    pub fn city(&self) -> Option<&str> {
        self.address.as_ref().and_then(|a| a.city.as_deref())
    }
}

/// A full row of the `vacancies` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Vacancy {
    pub id: i32,
    pub vacancy_name: Option<String>,
    pub vacancy_url: Option<String>,
    pub city: Option<String>,
    pub salary: Option<i32>,
    pub employer_id: i32,
}

#[derive(Debug, Clone)]
pub struct CreateVacancy {
    pub vacancy_name: Option<String>,
    pub vacancy_url: Option<String>,
    pub city: Option<String>,
    pub salary: Option<i32>,
    /// Surrogate key of the owning employer row.
    pub employer_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct VacancyListing {
    pub employer_name: Option<String>,
    pub vacancy_name: Option<String>,
    pub salary: Option<i32>,
    pub vacancy_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CompanyVacancyCount {
    pub employer_name: Option<String>,
    pub vacancy_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AverageSalary {
    pub vacancy_name: Option<String>,
    /// NULL when every vacancy of that name lacks a salary.
    pub avg_salary: Option<Decimal>,
}

impl CreateVacancy {
    pub fn from_raw(raw: &RawVacancy, employer_id: i32) -> Self {
        CreateVacancy {
            vacancy_name: raw.name.clone(),
            vacancy_url: raw.url.clone(),
            city: raw.city().map(String::from),
            salary: raw.salary_value(),
            employer_id,
        }
    }
}

impl Vacancy {
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateVacancy,
    ) -> Result<Vacancy, RecordError> {
        let vacancy = sqlx::query_as::<_, Vacancy>(
            "INSERT INTO vacancies (vacancy_name, vacancy_url, city, salary, employer_id) VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&input.vacancy_name)
        .bind(&input.vacancy_url)
        .bind(&input.city)
        .bind(input.salary)
        .bind(input.employer_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(vacancy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawVacancy {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_listing_item() {
        let vacancy = raw(json!({
            "id": "115482776",
            "name": "Специалист по тендерам",
            "url": "https://api.hh.ru/vacancies/115482776",
            "alternate_url": "https://hh.ru/vacancy/115482776",
            "salary": {"from": 200000, "to": null, "currency": "RUR", "gross": false},
            "address": {"city": "Москва", "street": "Тверская"},
            "employer": {
                "id": "2748",
                "name": "Ростелеком",
                "url": "https://api.hh.ru/employers/2748",
                "alternate_url": "https://hh.ru/employer/2748"
            }
        }));

        assert_eq!(vacancy.url.as_deref(), Some("https://hh.ru/vacancy/115482776"));
        assert_eq!(vacancy.salary_value(), Some(200000));
        assert_eq!(vacancy.city(), Some("Москва"));
        let employer = vacancy.employer.as_ref().unwrap();
        assert_eq!(employer.id.as_deref(), Some("2748"));
        assert_eq!(employer.url.as_deref(), Some("https://hh.ru/employer/2748"));
        assert!(vacancy.is_valid());
    }

    #[test]
    fn null_and_absent_nested_objects_are_invalid() {
        let no_salary = raw(json!({"id": "1", "salary": null, "address": {"city": "Казань"}}));
        let no_address = raw(json!({"id": "2", "salary": {"from": 1000, "to": 2000}}));
        assert!(!no_salary.is_valid());
        assert!(!no_address.is_valid());
    }

    #[test]
    fn empty_salary_object_is_still_present() {
        let vacancy = raw(json!({
            "id": "3",
            "salary": {"from": null, "to": null},
            "address": {"city": null}
        }));
        assert!(vacancy.is_valid());
        assert_eq!(vacancy.salary_value(), None);
        assert_eq!(vacancy.city(), None);
    }

    #[test]
    fn salary_falls_back_to_upper_bound() {
        let vacancy = raw(json!({
            "id": "4",
            "salary": {"from": null, "to": 90000},
            "address": {"city": "Самара"}
        }));
        assert_eq!(vacancy.salary_value(), Some(90000));
    }

    #[test]
    fn create_vacancy_maps_derived_columns() {
        let vacancy = raw(json!({
            "id": "5",
            "name": "Менеджер",
            "alternate_url": "https://hh.ru/vacancy/5",
            "salary": {"from": 50000, "to": 70000},
            "address": {"city": "Омск"}
        }));
        let input = CreateVacancy::from_raw(&vacancy, 7);
        assert_eq!(input.vacancy_name.as_deref(), Some("Менеджер"));
        assert_eq!(input.vacancy_url.as_deref(), Some("https://hh.ru/vacancy/5"));
        assert_eq!(input.city.as_deref(), Some("Омск"));
        assert_eq!(input.salary, Some(50000));
        assert_eq!(input.employer_id, 7);
    }
}
