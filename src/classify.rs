//! Keyword-based question tagging.
//!
//! Patterns are plain substring searches evaluated in priority order: CSV keywords win over
//! calculation keywords, and anything else is `general`.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static CSV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(csv|CSV|extract\.csv)").expect("valid CSV pattern"));

static CALCULATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(calculate|sum|average|mean|median|compute)").expect("valid calculation pattern")
});

/// Category assigned to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionTag {
    /// Mentions CSV content; eligible for the answer-column shortcut.
    CsvProcessing,
    /// Asks for an aggregate or other computation.
    Calculation,
    /// Everything else.
    General,
}

impl QuestionTag {
    /// Stable label used in logs and responses.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CsvProcessing => "csv_processing",
            Self::Calculation => "calculation",
            Self::General => "general",
        }
    }
}

impl fmt::Display for QuestionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag `question` by keyword.
pub fn classify(question: &str) -> QuestionTag {
    if CSV_PATTERN.is_match(question) {
        QuestionTag::CsvProcessing
    } else if CALCULATION_PATTERN.is_match(question) {
        QuestionTag::Calculation
    } else {
        QuestionTag::General
    }
}
