//! tally-ingest: statement text lexing and transaction building.

pub mod builder;
pub mod error;
pub mod money;
pub mod parsers;
pub mod types;

pub use builder::{build_transaction, iso_date, normalize_counterparty};
pub use error::{IngestError, MalformedReason, MalformedRecord, MissingSectionBoundary};
pub use money::{is_money_token, parse_money_token};
pub use parsers::usaa::{parse_usaa_text, LexerConfig, StatementLexer, StatementParse};
pub use types::{ParsedRecord, Section};

use std::path::Path;

/// Read a statement that has already been converted to text
pub fn read_statement(path: impl AsRef<Path>) -> Result<String, IngestError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })
}
