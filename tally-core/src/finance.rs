//! Transaction and aggregate record types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which statement section a money movement came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "debit")]
    Debit,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }

    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionKind::Credit)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single money movement read from a statement.
///
/// Two transactions describe the same entity when `counterparty` and `kind`
/// match; see [`Transaction::key`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Normalized name: single spaces, trimmed, no newlines
    pub counterparty: String,
    pub kind: TransactionKind,
    /// Statement-native date tag (e.g. "02/01"), not calendar-validated
    pub date: String,
    /// Always non-negative; direction lives in `kind`
    pub amount: Decimal,
}

impl Transaction {
    pub fn new(
        counterparty: impl Into<String>,
        kind: TransactionKind,
        date: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            counterparty: counterparty.into(),
            kind,
            date: date.into(),
            amount,
        }
    }

    /// Grouping identity
    pub fn key(&self) -> (&str, TransactionKind) {
        (&self.counterparty, self.kind)
    }
}

/// One sighting of a counterparty inside an aggregate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub date: String,
    pub amount: Decimal,
}

/// Every transaction of one `(counterparty, kind)` pair, with a running total.
///
/// `total` is kept equal to the sum of `events` on every append and is only
/// readable from outside.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AggregateRecord {
    counterparty: String,
    kind: TransactionKind,
    events: Vec<Event>,
    total: Decimal,
}

impl AggregateRecord {
    /// Start an aggregate from its first transaction
    pub fn from_transaction(txn: Transaction) -> Self {
        let mut record = Self {
            counterparty: txn.counterparty,
            kind: txn.kind,
            events: Vec::new(),
            total: Decimal::ZERO,
        };
        record.push_event(txn.date, txn.amount);
        record
    }

    pub(crate) fn push_event(&mut self, date: String, amount: Decimal) {
        self.total += amount;
        self.events.push(Event { date, amount });
        debug_assert_eq!(
            self.total,
            self.events.iter().map(|e| e.amount).sum::<Decimal>()
        );
    }

    pub fn counterparty(&self) -> &str {
        &self.counterparty
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Event dates in first-seen order, joined for display ("02/01, 02/15")
    pub fn dates(&self) -> String {
        self.events
            .iter()
            .map(|e| e.date.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
