//! Consolidator: folds a transaction stream into one aggregate per
//! `(counterparty, kind)` pair, in first-seen order.

use crate::finance::{AggregateRecord, Transaction, TransactionKind};
use std::collections::HashMap;

/// Incremental grouping state for one statement
#[derive(Debug, Default)]
pub struct Consolidator {
    records: Vec<AggregateRecord>,
    index: HashMap<(String, TransactionKind), usize>,
}

impl Consolidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one transaction, creating its aggregate on first sighting
    pub fn push(&mut self, txn: Transaction) {
        let key = (txn.counterparty.clone(), txn.kind);
        match self.index.get(&key) {
            Some(&i) => self.records[i].push_event(txn.date, txn.amount),
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(AggregateRecord::from_transaction(txn));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finish the statement; the aggregates are frozen from here on
    pub fn finish(self) -> Vec<AggregateRecord> {
        tracing::debug!(aggregates = self.records.len(), "consolidation finished");
        self.records
    }
}

impl Extend<Transaction> for Consolidator {
    fn extend<I: IntoIterator<Item = Transaction>>(&mut self, iter: I) {
        for txn in iter {
            self.push(txn);
        }
    }
}

/// Group a whole statement's transactions
pub fn consolidate(txns: impl IntoIterator<Item = Transaction>) -> Vec<AggregateRecord> {
    let mut c = Consolidator::new();
    c.extend(txns);
    c.finish()
}
