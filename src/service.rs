//! Request pipeline: stage the upload, extract, classify, then shortcut or ask the oracle.

use crate::{
    answer::AnswerGenerator,
    classify::{QuestionTag, classify},
    extract::{ExtractedData, FileExtractor, ParseError},
    oracle::OracleError,
};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Phrase that, together with a CSV question and an `answer` column, triggers the direct lookup.
const ANSWER_COLUMN_PHRASE: &str = "answer column";

/// Errors produced while answering a question.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The uploaded file could not be staged to disk.
    #[error("failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),
    /// The uploaded file could not be parsed.
    #[error("failed to parse upload: {0}")]
    Parse(#[from] ParseError),
    /// The completion oracle failed.
    #[error("completion failed: {0}")]
    Oracle(#[from] OracleError),
    /// The blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// A file received with a question.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name supplied by the client; only its extension is used.
    pub file_name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Bundle a filename and its contents.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension including the leading dot, or empty when the name has none.
    fn suffix(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

/// Abstraction over the answer pipeline used by the HTTP surface.
#[async_trait]
pub trait SolverApi: Send + Sync {
    /// Answer `question`, consulting `upload` when one was sent.
    async fn solve(&self, question: &str, upload: Option<Upload>) -> Result<String, SolveError>;
}

/// Answers questions, optionally grounded in an uploaded file.
///
/// Uploads are written to a temporary file inside `upload_dir` (system temp dir when unset) for
/// the duration of extraction only; the file is removed however extraction ends.
pub struct SolverService {
    generator: AnswerGenerator,
    extractor: FileExtractor,
    upload_dir: Option<PathBuf>,
}

impl SolverService {
    /// Build the pipeline around an answer generator.
    pub fn new(generator: AnswerGenerator, upload_dir: Option<PathBuf>) -> Self {
        Self {
            generator,
            extractor: FileExtractor::new(upload_dir.clone()),
            upload_dir,
        }
    }

    /// Stage `upload` on disk, extract its content, and delete the staged file.
    pub async fn extract_upload(&self, upload: Upload) -> Result<ExtractedData, SolveError> {
        let extractor = self.extractor.clone();
        let upload_dir = self.upload_dir.clone();
        tokio::task::spawn_blocking(move || {
            let staged = stage(&upload, upload_dir.as_deref())?;
            tracing::debug!(
                file_name = %upload.file_name,
                bytes = upload.bytes.len(),
                staged = %staged.path().display(),
                "Staged upload"
            );
            // `staged` is dropped (and unlinked) on every path out of this closure.
            let extracted = extractor.extract(staged.path())?;
            Ok::<_, SolveError>(extracted)
        })
        .await?
    }
}

fn stage(upload: &Upload, dir: Option<&Path>) -> Result<tempfile::NamedTempFile, SolveError> {
    let suffix = upload.suffix();
    let mut builder = tempfile::Builder::new();
    builder.prefix("tds-upload-").suffix(&suffix);
    let mut staged = match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(SolveError::Staging)?;
    staged
        .write_all(&upload.bytes)
        .and_then(|()| staged.flush())
        .map_err(SolveError::Staging)?;
    Ok(staged)
}

/// Direct answer from the `answer` column when the question explicitly asks for it.
pub fn shortcut_answer(question: &str, tag: QuestionTag, data: &ExtractedData) -> Option<String> {
    if tag != QuestionTag::CsvProcessing {
        return None;
    }
    if !question.to_lowercase().contains(ANSWER_COLUMN_PHRASE) {
        return None;
    }
    data.as_table()?.answer_value().map(str::to_string)
}

#[async_trait]
impl SolverApi for SolverService {
    async fn solve(&self, question: &str, upload: Option<Upload>) -> Result<String, SolveError> {
        let data = match upload {
            Some(upload) => self.extract_upload(upload).await?,
            None => ExtractedData::Absent,
        };

        let tag = classify(question);
        tracing::info!(tag = %tag, data = data.kind(), "Classified question");

        if let Some(answer) = shortcut_answer(question, tag, &data) {
            tracing::info!("Answered from the answer column without calling the oracle");
            return Ok(answer);
        }

        let answer = self.generator.answer(question, &data).await?;
        tracing::info!(answer_chars = answer.len(), "Oracle answered");
        Ok(answer)
    }
}
