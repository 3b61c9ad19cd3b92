use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read statement {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A record the lexer recognized by its date line but could not interpret.
/// The record is skipped; scanning resumes at the next boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record at line {line} (date {date}): {reason}")]
pub struct MalformedRecord {
    /// 1-based line number of the date line
    pub line: usize,
    pub date: String,
    pub reason: MalformedReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("no amount on the date line")]
    MissingAmount,
    #[error("more than {0} detail lines")]
    TooManyDetailLines(usize),
    #[error("{0} detail lines is not a recognized record shape")]
    UnrecognizedShape(usize),
    #[error("no counterparty text")]
    EmptyName,
}

/// A section boundary line that never appeared before end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MissingSectionBoundary {
    #[error("credit section header not found; credits may be missing")]
    Credit,
    #[error("debit section header not found; debits may be reported as credits")]
    Debit,
    #[error("summary boundary not found; statement may be truncated")]
    Summary,
}
