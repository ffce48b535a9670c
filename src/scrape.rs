//! Extracting tables from scraped HTML pages.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::common::*;

lazy_static! {
    static ref TABLE: Selector = Selector::parse("table").unwrap();
    static ref TR: Selector = Selector::parse("tr").unwrap();
    static ref CELL: Selector = Selector::parse("th, td").unwrap();
}

/// A table lifted out of an HTML page. Header names are what the page
/// claims; callers decide what the columns actually mean.
#[derive(Clone, Debug)]
pub(crate) struct RawTable {
    /// Cell text of the first row.
    pub(crate) headers: Vec<String>,
    /// Cell text of every following row.
    pub(crate) rows: Vec<Vec<String>>,
}

/// Parse every `<table>` in `html`, in document order.
pub(crate) fn parse_tables(html: &str) -> Vec<RawTable> {
    let document = Html::parse_document(html);
    let mut tables = Vec::new();
    for table in document.select(&TABLE) {
        let mut rows = table.select(&TR);
        let headers = rows
            .next()
            .map(|row| cell_texts(&row))
            .unwrap_or_default();
        let rows = rows.map(|row| cell_texts(&row)).collect();
        tables.push(RawTable { headers, rows });
    }
    tables
}

/// Select the table whose shape matches what we expect: `columns` columns,
/// with `header_fragment` appearing somewhere in the header row
/// (case-insensitive). Page layouts change; matching on a signature instead
/// of a fixed table index fails loudly when they do.
pub(crate) fn find_table<'a>(
    tables: &'a [RawTable],
    columns: usize,
    header_fragment: &str,
) -> Result<&'a RawTable> {
    let fragment = header_fragment.to_lowercase();
    tables
        .iter()
        .find(|table| {
            table.headers.len() == columns
                && table
                    .headers
                    .iter()
                    .any(|header| header.to_lowercase().contains(&fragment))
        })
        .ok_or_else(|| {
            let shapes = tables
                .iter()
                .map(|table| table.headers.len().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format_err!(
                "no table with {} columns mentioning {:?} found ({} tables on page, with column counts [{}])",
                columns,
                header_fragment,
                tables.len(),
                shapes,
            )
        })
}

/// The text of each cell in a row, whitespace-collapsed.
fn cell_texts(row: &ElementRef) -> Vec<String> {
    row.select(&CELL).map(|cell| cell_text(&cell)).collect()
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"
<html><body>
<table>
  <tr><th>Rank</th><th>Place</th></tr>
  <tr><td>1</td><td>Atherton</td></tr>
</table>
<table>
  <tr>
    <th>County</th><th>Population</th><th>Density</th>
    <th>Per capita income</th><th>Median household income</th>
    <th>Median family income</th>
  </tr>
  <tr>
    <th>Alameda</th><td>1,559,308</td><td>2,109.8</td>
    <td>$36,439</td><td>$73,775</td><td> <span>$90,822</span><sup>[1]</sup>
    </td>
  </tr>
</table>
</body></html>
"#;

    #[test]
    fn parses_tables_in_document_order() {
        let tables = parse_tables(PAGE);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].headers, &["Rank", "Place"]);
        assert_eq!(tables[0].rows, &[vec!["1".to_owned(), "Atherton".to_owned()]]);
        assert_eq!(tables[1].headers.len(), 6);
        assert_eq!(tables[1].rows[0][0], "Alameda");
    }

    #[test]
    fn cell_text_is_collapsed_across_nested_elements() {
        let tables = parse_tables(PAGE);
        assert_eq!(tables[1].rows[0][5], "$90,822[1]");
    }

    #[test]
    fn finds_a_table_by_signature_not_position() {
        let tables = parse_tables(PAGE);
        let table = find_table(&tables, 6, "county").unwrap();
        assert_eq!(table.headers[0], "County");
    }

    #[test]
    fn missing_table_is_a_descriptive_error() {
        let tables = parse_tables(PAGE);
        let err = find_table(&tables, 7, "county").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("no table with 7 columns"), "got: {}", message);
        assert!(message.contains("[2, 6]"), "got: {}", message);
    }
}
