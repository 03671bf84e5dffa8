//! Output sink traits and failure reporting types
//!
//! This module defines the trait interface for record sinks and the
//! structured failure reports collected while crawling.

use crate::record::PropertyRecord;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Where in the pipeline a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// Fetching a sampled index page
    IndexPage,

    /// Fetching a detail page inside a worker
    DetailPage,
}

/// Classification of a non-fatal failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    Timeout,
    Connect,
    HttpStatus,
    Body,
    Request,
    /// The worker task panicked or was cancelled before it settled
    WorkerAborted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::HttpStatus => "http_status",
            Self::Body => "body",
            Self::Request => "request",
            Self::WorkerAborted => "worker_aborted",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One address that contributed nothing because of a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// The address that failed
    pub url: String,

    pub stage: FailureStage,

    pub kind: FailureKind,

    /// Human-readable error message
    pub message: String,

    /// Fetch attempts made, including retries
    pub attempts: u32,
}

/// A destination for the final record set
///
/// Sinks are handed the complete, finalized collection once. Nothing is
/// streamed while the crawl is still running.
pub trait RecordSink {
    /// Short format name used in log messages ("json", "csv")
    fn format_name(&self) -> &'static str;

    /// Path of the file this sink writes
    fn path(&self) -> &Path;

    /// Writes every record, replacing any existing file
    fn write_records(&self, records: &[PropertyRecord]) -> OutputResult<()>;
}
