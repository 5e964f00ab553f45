//! Conversions from Gherkin data tables and lists
//!
//! Tables carry a header row; columns are looked up by name so feature files
//! may order them freely.

use chrono::NaiveDate;
use cucumber::gherkin::Table;
use eligibility_engine::{parse_evaluation_date, Engineer, EngineerLicense, LevelOption};

fn column(header: &[String], name: &str) -> usize {
    header
        .iter()
        .position(|cell| cell.trim() == name)
        .unwrap_or_else(|| panic!("missing column '{name}' in table header {header:?}"))
}

fn parse_date(value: &str) -> NaiveDate {
    parse_evaluation_date(value).unwrap_or_else(|e| panic!("invalid date '{value}': {e}"))
}

/// Parse an engineer table with one license per row.
///
/// ```text
/// | id | discipline | level   | status | expiry     |
/// | e1 | civil      | grade-1 | ACTIVE | 2026-01-01 |
/// ```
///
/// Rows sharing an id add licenses to the same engineer; engineers keep the
/// order of their first row.
pub fn parse_engineers(table: &Table) -> Vec<Engineer> {
    let (header, rows) = table.rows.split_first().expect("engineer table is empty");
    let id = column(header, "id");
    let discipline = column(header, "discipline");
    let level = column(header, "level");
    let status = column(header, "status");
    let expiry = column(header, "expiry");

    let mut engineers: Vec<Engineer> = Vec::new();
    for row in rows {
        let license = EngineerLicense {
            license_type: row[discipline].trim().to_string(),
            license_level: row[level].trim().to_string(),
            status: row[status].trim().to_string(),
            expiry_date: parse_date(&row[expiry]),
        };

        let engineer_id = row[id].trim();
        match engineers.iter_mut().find(|e| e.id == engineer_id) {
            Some(existing) => existing.licenses.push(license),
            None => engineers.push(Engineer::new(engineer_id, vec![license])),
        }
    }
    engineers
}

/// Parse a `| value | order |` table into level options.
pub fn parse_levels(table: &Table) -> Vec<LevelOption> {
    let (header, rows) = table.rows.split_first().expect("level table is empty");
    let value = column(header, "value");
    let order = column(header, "order");

    rows.iter()
        .map(|row| {
            let rank = row[order]
                .trim()
                .parse::<i64>()
                .unwrap_or_else(|e| panic!("invalid order '{}': {e}", row[order]));
            LevelOption::new(row[value].trim(), rank)
        })
        .collect()
}

/// Split a comma separated list, dropping blanks.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
