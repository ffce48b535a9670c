//! Normalizing the scraped county income table.
//!
//! The upstream page renders income values as currency strings
//! (`"$75,000"`). We strip the formatting and parse the result, so a
//! malformed cell fails here instead of inside a downstream query.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::common::*;
use crate::scrape::RawTable;

/// Number of columns the income table must have.
pub(crate) const COLUMN_COUNT: usize = 6;

/// Header text identifying the income table.
pub(crate) const HEADER_FRAGMENT: &str = "county";

lazy_static! {
    /// Currency formatting stripped before parsing.
    static ref CURRENCY_CHARS: Regex = Regex::new(r"[$,]").unwrap();
}

/// One county's row of the normalized income table. Field order and renames
/// fix the output CSV's header, regardless of what the page called its
/// columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct IncomeRecord {
    #[serde(rename = "County")]
    pub(crate) county: String,
    #[serde(rename = "Population")]
    pub(crate) population: String,
    #[serde(rename = "Population_density")]
    pub(crate) population_density: String,
    #[serde(rename = "Per_capita_income")]
    pub(crate) per_capita_income: u64,
    #[serde(rename = "Median_household_income")]
    pub(crate) median_household_income: u64,
    #[serde(rename = "Median_family_income")]
    pub(crate) median_family_income: u64,
}

/// Strip the currency symbol and thousands separators from `value`.
/// Idempotent on already-clean input.
fn strip_currency(value: &str) -> String {
    CURRENCY_CHARS.replace_all(value, "").into_owned()
}

/// Parse a currency-formatted cell into a plain integer.
fn parse_income(county: &str, value: &str) -> Result<u64> {
    strip_currency(value).trim().parse::<u64>().with_context(|| {
        format!("malformed income value {:?} for county {:?}", value, county)
    })
}

/// Assign the fixed column names positionally and clean the three income
/// columns. Population and density pass through as scraped.
pub(crate) fn normalize(table: &RawTable) -> Result<Vec<IncomeRecord>> {
    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        if row.len() < COLUMN_COUNT {
            return Err(format_err!(
                "expected an income row with {} columns, found {}: {:?}",
                COLUMN_COUNT,
                row.len(),
                row,
            ));
        }
        let county = row[0].clone();
        records.push(IncomeRecord {
            population: row[1].clone(),
            population_density: row[2].clone(),
            per_capita_income: parse_income(&county, &row[3])?,
            median_household_income: parse_income(&county, &row[4])?,
            median_family_income: parse_income(&county, &row[5])?,
            county,
        });
    }
    Ok(records)
}

/// Serialize `records` as CSV text (header row first), encoded as UTF-8
/// bytes ready to upload.
pub(crate) fn to_csv(records: &[IncomeRecord]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for record in records {
        wtr.serialize(record)
            .context("could not serialize income record")?;
    }
    wtr.into_inner().context("could not finish income CSV")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable {
            // Deliberately not the names we assign.
            headers: vec!["a", "b", "c", "d", "e", "f"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(str::to_owned).collect())
                .collect(),
        }
    }

    #[test]
    fn strips_currency_symbol_and_separators() {
        assert_eq!(strip_currency("$75,000"), "75000");
    }

    #[test]
    fn stripping_is_idempotent_on_clean_input() {
        assert_eq!(strip_currency("75000"), "75000");
    }

    #[test]
    fn parses_cleaned_values_as_integers() {
        assert_eq!(parse_income("Alameda", "$36,439").unwrap(), 36_439);
    }

    #[test]
    fn malformed_values_are_parse_errors() {
        let err = parse_income("Alpine", "n/a").unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("n/a"), "got: {}", message);
        assert!(message.contains("Alpine"), "got: {}", message);
    }

    #[test]
    fn column_names_are_assigned_positionally() {
        let table = table(vec![vec![
            "Alameda",
            "1,559,308",
            "2,109.8",
            "$36,439",
            "$73,775",
            "$90,822",
        ]]);
        let records = normalize(&table).unwrap();
        assert_eq!(
            records,
            vec![IncomeRecord {
                county: "Alameda".to_owned(),
                population: "1,559,308".to_owned(),
                population_density: "2,109.8".to_owned(),
                per_capita_income: 36_439,
                median_household_income: 73_775,
                median_family_income: 90_822,
            }],
        );
    }

    #[test]
    fn short_rows_are_errors() {
        let table = table(vec![vec!["Alameda", "1,559,308"]]);
        let err = normalize(&table).unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn csv_output_has_the_fixed_header_row() {
        let table = table(vec![vec![
            "Alameda",
            "1,559,308",
            "2,109.8",
            "$36,439",
            "$73,775",
            "$90,822",
        ]]);
        let csv = to_csv(&normalize(&table).unwrap()).unwrap();
        let text = String::from_utf8(csv).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "County,Population,Population_density,Per_capita_income,\
             Median_household_income,Median_family_income",
        );
        assert_eq!(
            lines.next().unwrap(),
            "Alameda,\"1,559,308\",\"2,109.8\",36439,73775,90822",
        );
    }
}
