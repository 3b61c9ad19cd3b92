//! Interactive classification of a counterparty.
//!
//! The protocol is a plain request/response loop over the [`Operator`]
//! trait: offer the known categories, optionally show the record's events,
//! take a tentative choice, ask for confirmation, repeat until confirmed.

use std::io;
use tally_core::AggregateRecord;
use thiserror::Error;

use crate::categories::CategorySet;

/// Answer to the category menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Index into the offered category list
    Category(usize),
    /// Type a brand-new category name
    Other,
    /// Show every (date, amount) event for the counterparty first
    Details,
}

/// The person (or script) answering classification prompts
pub trait Operator {
    fn choose(&mut self, record: &AggregateRecord, categories: &[String]) -> io::Result<Choice>;

    fn new_category(&mut self, record: &AggregateRecord) -> io::Result<String>;

    fn show_details(&mut self, record: &AggregateRecord) -> io::Result<()>;

    fn confirm(&mut self, record: &AggregateRecord, category: &str) -> io::Result<bool>;

    /// Feedback after an unusable answer
    fn reject(&mut self, _error: &InvalidCategorySelection) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCategorySelection {
    #[error("selection {index} is out of range (1-{len})")]
    OutOfRange { index: usize, len: usize },
    #[error("category name is empty")]
    Empty,
    #[error("category name `{0}` contains a line break")]
    Multiline(String),
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("operator input failed: {0}")]
    Operator(#[from] io::Error),
}

/// Run the prompt loop for one record and return the confirmed category.
///
/// A category typed through "Other" joins `categories` once confirmed.
pub fn classify(
    record: &AggregateRecord,
    categories: &mut CategorySet,
    operator: &mut dyn Operator,
) -> Result<String, ClassifyError> {
    loop {
        let choice = operator.choose(record, categories.names())?;
        let tentative = match choice {
            Choice::Details => {
                operator.show_details(record)?;
                continue;
            }
            Choice::Category(index) => match categories.names().get(index) {
                Some(name) => name.clone(),
                None => {
                    invalid(
                        operator,
                        InvalidCategorySelection::OutOfRange {
                            index: index + 1,
                            len: categories.len(),
                        },
                    );
                    continue;
                }
            },
            Choice::Other => {
                let name = operator.new_category(record)?;
                match validate_new(&name) {
                    Ok(name) => name,
                    Err(e) => {
                        invalid(operator, e);
                        continue;
                    }
                }
            }
        };

        if operator.confirm(record, &tentative)? {
            if categories.add(tentative.as_str()) {
                tracing::info!(category = %tentative, "new category");
            }
            tracing::debug!(counterparty = record.counterparty(), category = %tentative, "classified");
            return Ok(tentative);
        }
    }
}

fn validate_new(name: &str) -> Result<String, InvalidCategorySelection> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InvalidCategorySelection::Empty);
    }
    if name.contains(['\n', '\r']) {
        return Err(InvalidCategorySelection::Multiline(name.to_string()));
    }
    Ok(name.to_string())
}

fn invalid(operator: &mut dyn Operator, error: InvalidCategorySelection) {
    tracing::warn!(%error, "invalid category selection");
    operator.reject(&error);
}
