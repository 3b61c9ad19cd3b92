//! tally-core: transaction model, consolidation and category totals

pub mod consolidate;
pub mod finance;
pub mod portions;

pub use consolidate::{consolidate, Consolidator};
pub use finance::{AggregateRecord, Event, Transaction, TransactionKind};
pub use portions::{aggregate_portions, CategoryTotal, Portions, UnknownCounterparty};
