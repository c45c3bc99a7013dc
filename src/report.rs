//! Text rendering for the interactive report.

use std::io::{self, BufRead, Write};

use crate::db::queries::QueryService;
use crate::models::vacancy::{AverageSalary, CompanyVacancyCount, Vacancy, VacancyListing};

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn salary(value: Option<i32>) -> String {
    match value {
        Some(amount) => format!("{amount} rub."),
        None => "not specified".to_string(),
    }
}

pub fn write_all_vacancies(out: &mut impl Write, rows: &[VacancyListing]) -> io::Result<()> {
    writeln!(out, "\nAll vacancies:")?;
    if rows.is_empty() {
        return writeln!(out, "No vacancies found.");
    }
    for row in rows {
        writeln!(out, "Company: {}", text(&row.employer_name))?;
        writeln!(out, "Vacancy: {}", text(&row.vacancy_name))?;
        writeln!(out, "Salary: {}", salary(row.salary))?;
        writeln!(out, "Link: {}\n", text(&row.vacancy_url))?;
    }
    Ok(())
}

pub fn write_company_counts(out: &mut impl Write, rows: &[CompanyVacancyCount]) -> io::Result<()> {
    writeln!(out, "\nCompanies and vacancy counts:")?;
    if rows.is_empty() {
        return writeln!(out, "No company information found.");
    }
    for row in rows {
        writeln!(
            out,
            "Company: {} - vacancies: {}",
            text(&row.employer_name),
            row.vacancy_count
        )?;
    }
    Ok(())
}

pub fn write_average_salaries(out: &mut impl Write, rows: &[AverageSalary]) -> io::Result<()> {
    writeln!(out, "\nAverage salary by vacancy:")?;
    if rows.is_empty() {
        return writeln!(out, "No average salary information found.");
    }
    for row in rows {
        let average = match row.avg_salary {
            Some(avg) => format!("{} rub.", avg.round_dp(2)),
            None => "not specified".to_string(),
        };
        writeln!(out, "Vacancy: {} - average salary: {average}", text(&row.vacancy_name))?;
    }
    Ok(())
}

/// Full vacancy rows, used by the above-average and keyword sections.
pub fn write_vacancies(
    out: &mut impl Write,
    heading: &str,
    empty_message: &str,
    rows: &[Vacancy],
) -> io::Result<()> {
    writeln!(out, "\n{heading}:")?;
    if rows.is_empty() {
        return writeln!(out, "{empty_message}");
    }
    for row in rows {
        writeln!(out, "Vacancy: {}", text(&row.vacancy_name))?;
        writeln!(out, "Link: {}", text(&row.vacancy_url))?;
        writeln!(out, "City: {}", text(&row.city))?;
        writeln!(out, "Salary: {}\n", salary(row.salary))?;
    }
    Ok(())
}

/// Ask for a search keyword. Blank input (or EOF) means "show everything".
pub fn prompt_keyword(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<Option<String>> {
    write!(
        out,
        "\nEnter a keyword to search for\nLeave empty to see all vacancies: "
    )?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let keyword = line.trim();
    Ok((!keyword.is_empty()).then(|| keyword.to_string()))
}

/// Print the four fixed sections of the report.
pub async fn write_summary(queries: &QueryService, out: &mut impl Write) -> anyhow::Result<()> {
    writeln!(out, "Hi! Here is what the loaded vacancies look like.")?;
    write_all_vacancies(out, &queries.all_vacancies().await?)?;
    write_company_counts(out, &queries.companies_and_vacancy_counts().await?)?;
    write_average_salaries(out, &queries.average_salary_by_vacancy_name().await?)?;
    write_vacancies(
        out,
        "Vacancies with above-average salary",
        "No vacancies with above-average salary found.",
        &queries.vacancies_above_average_salary().await?,
    )?;
    Ok(())
}

/// Keyword search, or the full listing when no keyword was given.
pub async fn write_search(
    queries: &QueryService,
    keyword: Option<&str>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match keyword.filter(|k| !k.is_empty()) {
        Some(keyword) => {
            let rows = queries.vacancies_by_keyword(keyword).await?;
            write_vacancies(
                out,
                &format!("Vacancies matching '{keyword}'"),
                "No vacancies with that keyword found.",
                &rows,
            )?;
        }
        None => {
            writeln!(out, "\nShowing all vacancies.")?;
            write_all_vacancies(out, &queries.all_vacancies().await?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rust_decimal::Decimal;

    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_results_print_not_found() {
        assert!(render(|out| write_all_vacancies(out, &[])).contains("No vacancies found."));
        assert!(render(|out| write_company_counts(out, &[])).contains("No company information found."));
        assert!(render(|out| write_average_salaries(out, &[])).contains("No average salary"));
        assert!(
            render(|out| write_vacancies(out, "Matches", "Nothing here.", &[]))
                .contains("Nothing here.")
        );
    }

    #[test]
    fn renders_listing_rows() {
        let rows = [VacancyListing {
            employer_name: Some("ВкусВилл".to_string()),
            vacancy_name: Some("Специалист по тендерам".to_string()),
            salary: Some(200000),
            vacancy_url: Some("https://hh.ru/vacancy/115482776".to_string()),
        }];
        let text = render(|out| write_all_vacancies(out, &rows));
        assert!(text.contains("Company: ВкусВилл"));
        assert!(text.contains("Vacancy: Специалист по тендерам"));
        assert!(text.contains("Salary: 200000 rub."));
        assert!(text.contains("Link: https://hh.ru/vacancy/115482776"));
    }

    #[test]
    fn average_is_rounded_for_display_only() {
        let rows = [
            AverageSalary {
                vacancy_name: Some("Курьер".to_string()),
                avg_salary: Some(Decimal::new(61000333333, 6)),
            },
            AverageSalary {
                vacancy_name: Some("Стажер".to_string()),
                avg_salary: None,
            },
        ];
        let text = render(|out| write_average_salaries(out, &rows));
        assert!(text.contains("Vacancy: Курьер - average salary: 61000.33 rub."));
        assert!(text.contains("Vacancy: Стажер - average salary: not specified"));
    }

    #[test]
    fn renders_full_vacancy_rows_with_missing_city() {
        let rows = [Vacancy {
            id: 1,
            vacancy_name: Some("Водитель".to_string()),
            vacancy_url: Some("https://hh.ru/vacancy/1".to_string()),
            city: None,
            salary: Some(80000),
            employer_id: 3,
        }];
        let text = render(|out| write_vacancies(out, "Above average", "none", &rows));
        assert!(text.contains("City: -"));
        assert!(text.contains("Salary: 80000 rub."));
    }

    #[test]
    fn prompt_trims_input() {
        let mut out = Vec::new();
        let keyword = prompt_keyword(&mut Cursor::new("  Специалист \n"), &mut out).unwrap();
        assert_eq!(keyword.as_deref(), Some("Специалист"));
        assert!(String::from_utf8(out).unwrap().contains("Enter a keyword"));
    }

    #[test]
    fn blank_prompt_means_show_all() {
        let mut out = Vec::new();
        assert_eq!(prompt_keyword(&mut Cursor::new("\n"), &mut out).unwrap(), None);
        assert_eq!(prompt_keyword(&mut Cursor::new(""), &mut out).unwrap(), None);
    }
}
