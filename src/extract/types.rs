//! Data shapes produced by file extraction and the errors raised while parsing uploads.

use std::path::PathBuf;
use thiserror::Error;

/// Name of the column whose first value can answer a question directly.
pub const ANSWER_COLUMN: &str = "answer";

/// Errors raised while turning an uploaded file into [`ExtractedData`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file (or a scratch location next to it) could not be read or written.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// CSV content was malformed (invalid quoting, bad encoding).
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    /// A CSV record carried more fields than the header names.
    #[error("malformed CSV: line {line} has {found} fields, header has {expected}")]
    ExtraFields {
        /// 1-based line number of the offending record.
        line: u64,
        /// Number of header columns.
        expected: usize,
        /// Number of fields in the record.
        found: usize,
    },
    /// The spreadsheet could not be opened or its first sheet could not be read.
    #[error("malformed spreadsheet: {0}")]
    Excel(#[from] calamine::Error),
    /// The archive was corrupt or could not be unpacked.
    #[error("malformed ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// A tabular file had no header row to name its columns.
    #[error("tabular file has no header row")]
    MissingHeader,
    /// A workbook contained no worksheets.
    #[error("workbook contains no worksheets")]
    NoWorksheet,
    /// A text upload was not valid UTF-8.
    #[error("text file is not valid UTF-8")]
    InvalidText,
}

impl ParseError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Tabular content with named columns and rows kept in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset from a header and its records.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Records in file order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// `(rows, columns)` counts.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Position of the first column carrying exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Whether a column named `name` exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// First value of column `name`, if the column exists and the dataset has rows.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        let index = self.column_index(name)?;
        self.rows
            .first()
            .and_then(|row| row.get(index))
            .map(String::as_str)
    }

    /// First value of the [`ANSWER_COLUMN`].
    pub fn answer_value(&self) -> Option<&str> {
        self.first_value(ANSWER_COLUMN)
    }
}

/// Content recovered from an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExtractedData {
    /// Parsed CSV or spreadsheet rows.
    Table(Dataset),
    /// Full contents of a plain-text upload.
    Text(String),
    /// Unsupported format, or an archive without a CSV inside.
    #[default]
    Absent,
}

impl ExtractedData {
    /// Borrow the dataset when the content is tabular.
    pub fn as_table(&self) -> Option<&Dataset> {
        match self {
            Self::Table(dataset) => Some(dataset),
            _ => None,
        }
    }

    /// Whether nothing was extracted.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::Text(_) => "text",
            Self::Absent => "absent",
        }
    }
}
