//! ZIP uploads: unpack into a scratch directory and pick the first CSV inside.

use super::tabular::read_csv;
use super::types::{Dataset, ParseError};
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Unpack `path` under `scratch_root` (or the system temp dir) and parse its first CSV.
///
/// Returns `Ok(None)` when the archive holds no `.csv` entry. The scratch directory is removed
/// before returning, whatever the outcome.
pub fn read_first_csv(
    path: &Path,
    scratch_root: Option<&Path>,
) -> Result<Option<Dataset>, ParseError> {
    let root = scratch_root
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir);
    let scratch = tempfile::Builder::new()
        .prefix("tds-zip-")
        .tempdir_in(&root)
        .map_err(|error| ParseError::io(&root, error))?;

    let file = File::open(path).map_err(|error| ParseError::io(path, error))?;
    let mut archive = ZipArchive::new(file)?;
    archive.extract(scratch.path())?;
    tracing::debug!(
        archive = %path.display(),
        entries = archive.len(),
        scratch = %scratch.path().display(),
        "Unpacked archive"
    );

    match find_first_csv(scratch.path()) {
        Some(csv_path) => {
            tracing::debug!(csv = %csv_path.display(), "Selected CSV from archive");
            read_csv(&csv_path).map(Some)
        }
        None => {
            tracing::info!(archive = %path.display(), "Archive contains no CSV file");
            Ok(None)
        }
    }
}

/// First regular file whose name ends in `.csv`, walking `root` in file-name order.
fn find_first_csv(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| entry.file_name().to_string_lossy().ends_with(".csv"))
        .map(walkdir::DirEntry::into_path)
}
