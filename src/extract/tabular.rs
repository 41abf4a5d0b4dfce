//! CSV and spreadsheet readers producing [`Dataset`] values.

use super::types::{Dataset, ParseError};
use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use std::path::Path;

/// Rendering for spreadsheet date cells, matching how pandas prints a timestamp.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a CSV file: the first record names the columns, every following record is a row.
///
/// Short records are padded with empty fields up to the header width; records wider than the
/// header are rejected.
pub fn read_csv(path: &Path) -> Result<Dataset, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(ParseError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() > columns.len() {
            return Err(ParseError::ExtraFields {
                line: record.position().map_or(0, |position| position.line()),
                expected: columns.len(),
                found: record.len(),
            });
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        columns = columns.len(),
        "Parsed CSV"
    );
    Ok(Dataset::new(columns, rows))
}

/// Parse the first worksheet of an `.xlsx`/`.xls` workbook.
///
/// The first row becomes the header; fully blank rows are skipped.
pub fn read_excel(path: &Path) -> Result<Dataset, ParseError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)??;

    let mut rows_iter = range.rows();
    let header = rows_iter.next().ok_or(ParseError::MissingHeader)?;
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(index, cell)| match cell_text(cell) {
            name if name.trim().is_empty() => format!("Unnamed: {index}"),
            name => name,
        })
        .collect();

    let rows: Vec<Vec<String>> = rows_iter
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        columns = columns.len(),
        "Parsed spreadsheet"
    );
    Ok(Dataset::new(columns, rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) => datetime.format(DATETIME_FORMAT).to_string(),
            None => value.to_string(),
        },
        // f64 Display already drops the fraction for whole numbers ("42", not "42.0").
        other => other.to_string(),
    }
}
