#![deny(missing_docs)]

//! Core library for the TDS solver server.

/// Prompt assembly and answer generation.
pub mod answer;
/// HTTP routing and the question endpoint.
pub mod api;
/// Keyword-based question classification.
pub mod classify;
/// Environment-driven configuration management.
pub mod config;
/// Upload parsing for CSV, spreadsheet, archive, and text files.
pub mod extract;
/// Structured logging and tracing setup.
pub mod logging;
/// Completion oracle client abstraction and adapters.
pub mod oracle;
/// Request pipeline tying extraction, classification, and answering together.
pub mod service;
