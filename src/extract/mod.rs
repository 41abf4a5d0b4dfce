//! File extraction: map an uploaded file onto tabular data, plain text, or nothing.
//!
//! The format is chosen from the file extension alone. ZIP uploads are unpacked into a scratch
//! directory and the first CSV found (in file-name order) is parsed; the scratch directory is
//! removed once the CSV is in memory.

mod archive;
mod tabular;
pub mod types;

use std::path::{Path, PathBuf};

pub use types::{ANSWER_COLUMN, Dataset, ExtractedData, ParseError};

/// Upload formats recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// `.zip` archive expected to contain a CSV.
    Zip,
    /// `.csv` table.
    Csv,
    /// `.xlsx` or `.xls` workbook.
    Excel,
    /// `.txt` document.
    Text,
    /// Anything else, including files without an extension.
    Unsupported,
}

impl FileFormat {
    /// Classify a path by its extension, ignoring case.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("zip") => Self::Zip,
            Some("csv") => Self::Csv,
            Some("xlsx" | "xls") => Self::Excel,
            Some("txt") => Self::Text,
            _ => Self::Unsupported,
        }
    }
}

/// Reads uploaded files from disk. Holds the root used for archive scratch directories.
#[derive(Debug, Clone, Default)]
pub struct FileExtractor {
    scratch_root: Option<PathBuf>,
}

impl FileExtractor {
    /// Build an extractor that unpacks archives under `scratch_root` (system temp dir when `None`).
    pub fn new(scratch_root: Option<PathBuf>) -> Self {
        Self { scratch_root }
    }

    /// Extract the content of the file at `path`.
    pub fn extract(&self, path: &Path) -> Result<ExtractedData, ParseError> {
        let format = FileFormat::from_path(path);
        let data = match format {
            FileFormat::Zip => archive::read_first_csv(path, self.scratch_root.as_deref())?
                .map_or(ExtractedData::Absent, ExtractedData::Table),
            FileFormat::Csv => ExtractedData::Table(tabular::read_csv(path)?),
            FileFormat::Excel => ExtractedData::Table(tabular::read_excel(path)?),
            FileFormat::Text => ExtractedData::Text(read_text(path)?),
            FileFormat::Unsupported => ExtractedData::Absent,
        };
        tracing::debug!(
            path = %path.display(),
            format = ?format,
            kind = data.kind(),
            "Extracted upload"
        );
        Ok(data)
    }
}

/// Extract `path` with a default [`FileExtractor`].
pub fn extract(path: &Path) -> Result<ExtractedData, ParseError> {
    FileExtractor::default().extract(path)
}

fn read_text(path: &Path) -> Result<String, ParseError> {
    let bytes = std::fs::read(path).map_err(|error| ParseError::io(path, error))?;
    String::from_utf8(bytes).map_err(|_| ParseError::InvalidText)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection_ignores_case() {
        assert_eq!(FileFormat::from_path(Path::new("a.ZIP")), FileFormat::Zip);
        assert_eq!(FileFormat::from_path(Path::new("a.Csv")), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("a.xlsx")), FileFormat::Excel);
        assert_eq!(FileFormat::from_path(Path::new("a.XLS")), FileFormat::Excel);
        assert_eq!(FileFormat::from_path(Path::new("notes.txt")), FileFormat::Text);
        assert_eq!(FileFormat::from_path(Path::new("doc.pdf")), FileFormat::Unsupported);
        assert_eq!(FileFormat::from_path(Path::new("Makefile")), FileFormat::Unsupported);
    }

    #[test]
    fn text_files_are_read_verbatim() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "line one\nline two\n").expect("write");

        let data = extract(&path).expect("text");
        assert_eq!(data, ExtractedData::Text("line one\nline two\n".into()));
    }

    #[test]
    fn csv_files_become_tables() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("DATA.CSV");
        std::fs::write(&path, "x,y\n1,2\n").expect("write");

        let data = extract(&path).expect("table");
        assert_eq!(data.as_table().map(Dataset::shape), Some((1, 2)));
    }

    #[test]
    fn unsupported_extensions_are_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("image.png");
        std::fs::write(&path, [0_u8, 1, 2]).expect("write");

        assert!(extract(&path).expect("absent").is_absent());
    }

    #[test]
    fn non_utf8_text_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("binary.txt");
        std::fs::write(&path, [0xff_u8, 0xfe, 0x00]).expect("write");

        assert!(matches!(extract(&path), Err(ParseError::InvalidText)));
    }
}
