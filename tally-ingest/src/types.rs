use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::TransactionKind;

/// Transaction section of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Section {
    Credit,
    Debit,
}

impl Section {
    pub fn kind(self) -> TransactionKind {
        match self {
            Section::Credit => TransactionKind::Credit,
            Section::Debit => TransactionKind::Debit,
        }
    }
}

/// Raw record as cut out of the statement, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    /// Date token exactly as printed (not validated)
    pub date_text: String,
    /// Non-negative; the section decides the direction
    pub amount: Decimal,
    /// Lines believed to name the counterparty
    pub name_lines: Vec<String>,
    pub section: Section,
}
