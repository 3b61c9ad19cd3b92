//! tally-finance: classifier store, interactive classification and the
//! statement analysis pipeline.

pub mod categories;
pub mod classify;
pub mod export;
pub mod pipeline;
pub mod store;

pub use categories::{CategorySet, DEFAULT_CATEGORIES, DEPOSIT_CATEGORY};
pub use classify::{classify, Choice, ClassifyError, InvalidCategorySelection, Operator};
pub use export::write_records_csv;
pub use pipeline::{analyze, analyze_file, consolidate_statement, totals, Report, Warning};
pub use store::{category_of, ClassifierEntry, ClassifierStore, Classifiers, StoreError};
