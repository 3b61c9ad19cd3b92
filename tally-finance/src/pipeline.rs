//! Statement -> classified category totals, for one invocation.

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;
use tally_core::{aggregate_portions, consolidate, AggregateRecord, Portions};
use tally_ingest::{
    parse_usaa_text, read_statement, LexerConfig, MalformedRecord, MissingSectionBoundary,
};

use crate::categories::CategorySet;
use crate::classify::Operator;
use crate::store::{category_of, ClassifierStore, Classifiers};

/// Something the operator should know about but that did not stop the run
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    Malformed(MalformedRecord),
    MissingBoundary(MissingSectionBoundary),
    Unclassified(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Malformed(m) => write!(f, "skipped {m}"),
            Warning::MissingBoundary(m) => write!(f, "{m}"),
            Warning::Unclassified(name) => {
                write!(f, "`{name}` has no stored category and was left out of the totals")
            }
        }
    }
}

impl Serialize for Warning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Everything a reporting front end needs
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub records: Vec<AggregateRecord>,
    pub portions: Portions,
    pub warnings: Vec<Warning>,
}

/// Parse and consolidate without touching the classifier store
pub fn consolidate_statement(
    text: &str,
    lexer: &LexerConfig,
) -> (Vec<AggregateRecord>, Vec<Warning>) {
    let parse = parse_usaa_text(text, lexer);
    let mut warnings: Vec<Warning> = parse.malformed.into_iter().map(Warning::Malformed).collect();
    warnings.extend(parse.missing.into_iter().map(Warning::MissingBoundary));
    (consolidate(parse.transactions), warnings)
}

/// Run the whole pipeline over statement text.
///
/// Unseen counterparties are classified through `operator` and persisted
/// before totals are computed.
pub fn analyze(
    text: &str,
    lexer: &LexerConfig,
    store: &ClassifierStore,
    categories: &mut CategorySet,
    operator: &mut dyn Operator,
) -> Result<Report> {
    let (records, mut warnings) = consolidate_statement(text, lexer);
    tracing::info!(aggregates = records.len(), "statement consolidated");

    let mapping = store
        .load_or_bootstrap(&records, categories, operator)
        .with_context(|| format!("classifying against {}", store.path().display()))?;

    let portions = totals(&records, &mapping, categories);
    warnings.extend(portions.excluded.iter().cloned().map(Warning::Unclassified));

    Ok(Report {
        records,
        portions,
        warnings,
    })
}

pub fn analyze_file(
    path: impl AsRef<Path>,
    lexer: &LexerConfig,
    store: &ClassifierStore,
    categories: &mut CategorySet,
    operator: &mut dyn Operator,
) -> Result<Report> {
    let path = path.as_ref();
    let text = read_statement(path)?;
    analyze(&text, lexer, store, categories, operator)
        .with_context(|| format!("analyzing {}", path.display()))
}

/// Category totals for already classified records
pub fn totals(records: &[AggregateRecord], mapping: &Classifiers, categories: &CategorySet) -> Portions {
    aggregate_portions(
        records,
        |name| category_of(mapping, name).map(str::to_string),
        categories.names().iter().map(String::as_str),
        categories.deposit(),
    )
}
