//! Durable counterparty -> category mapping.
//!
//! File format, one entry per line:
//!   <counterparty>, <category>
//!
//! The file is created once by `bootstrap` (written to a temp file, then
//! renamed into place) and afterwards only ever appended to by `extend`.
//! One writer at a time; concurrent runs against the same file are not
//! supported.

use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tally_core::{AggregateRecord, UnknownCounterparty};
use thiserror::Error;

use crate::categories::CategorySet;
use crate::classify::{classify, ClassifyError, Operator};

const SEPARATOR: &str = ", ";
const TMP_SUFFIX: &str = ".tmp";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no classifier store at {}", .0.display())]
    NotFound(PathBuf),
    #[error("corrupt classifier store {}: line {line} has no `, ` separator: {content:?}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        content: String,
    },
    #[error("cannot store counterparty {0:?}: empty, multi-line or contains `, `")]
    InvalidKey(String),
    #[error("classifier store I/O on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifierEntry {
    pub counterparty: String,
    pub category: String,
}

/// In-memory mapping with first-write-wins inserts, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classifiers {
    entries: Vec<ClassifierEntry>,
    index: HashMap<String, usize>,
}

impl Classifiers {
    /// Insert unless the counterparty is already classified.
    /// Returns false (and changes nothing) for a repeat.
    pub fn insert(&mut self, counterparty: impl Into<String>, category: impl Into<String>) -> bool {
        let counterparty = counterparty.into();
        if self.index.contains_key(&counterparty) {
            return false;
        }
        self.index.insert(counterparty.clone(), self.entries.len());
        self.entries.push(ClassifierEntry {
            counterparty,
            category: category.into(),
        });
        true
    }

    pub fn get(&self, counterparty: &str) -> Option<&str> {
        self.index
            .get(counterparty)
            .map(|&i| self.entries[i].category.as_str())
    }

    pub fn contains(&self, counterparty: &str) -> bool {
        self.index.contains_key(counterparty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassifierEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Category stored for `counterparty`
pub fn category_of<'m>(
    mapping: &'m Classifiers,
    counterparty: &str,
) -> Result<&'m str, UnknownCounterparty> {
    mapping
        .get(counterparty)
        .ok_or_else(|| UnknownCounterparty(counterparty.to_string()))
}

#[derive(Debug, Clone)]
pub struct ClassifierStore {
    path: PathBuf,
}

impl ClassifierStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Read the whole mapping. Duplicate lines keep the first category.
    pub fn load(&self) -> Result<Classifiers, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(self.io_err(e)),
        };

        let mut mapping = Classifiers::default();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (counterparty, category) =
                line.split_once(SEPARATOR)
                    .ok_or_else(|| StoreError::Corrupt {
                        path: self.path.clone(),
                        line: i + 1,
                        content: line.to_string(),
                    })?;
            if !mapping.insert(counterparty, category) {
                tracing::warn!(counterparty, line = i + 1, "duplicate store entry ignored");
            }
        }

        tracing::info!(entries = mapping.len(), path = %self.path.display(), "classifier store loaded");
        Ok(mapping)
    }

    /// First run: classify every record and write the store in one go.
    ///
    /// Credits get the deposit category without prompting. Nothing touches
    /// the disk until every record has a category, so an aborted run leaves
    /// no store behind.
    pub fn bootstrap(
        &self,
        records: &[AggregateRecord],
        categories: &mut CategorySet,
        operator: &mut dyn Operator,
    ) -> Result<Classifiers, StoreError> {
        let mut mapping = Classifiers::default();
        for record in records {
            if mapping.contains(record.counterparty()) {
                continue;
            }
            let category = resolve_new(record, categories, operator)?;
            check_entry(record.counterparty(), &category)?;
            mapping.insert(record.counterparty(), category);
        }

        self.write_atomic(&mapping)?;
        tracing::info!(entries = mapping.len(), path = %self.path.display(), "classifier store created");
        Ok(mapping)
    }

    /// Later runs: classify only unseen counterparties and append them.
    ///
    /// Each confirmed entry is appended as soon as it is known. When nothing
    /// is new the file is not opened at all.
    pub fn extend(
        &self,
        mut existing: Classifiers,
        records: &[AggregateRecord],
        categories: &mut CategorySet,
        operator: &mut dyn Operator,
    ) -> Result<Classifiers, StoreError> {
        let mut file = None;
        let mut added = 0usize;

        for record in records {
            if existing.contains(record.counterparty()) {
                continue;
            }
            let category = resolve_new(record, categories, operator)?;
            check_entry(record.counterparty(), &category)?;

            if file.is_none() {
                file = Some(self.open_append()?);
            }
            if let Some(f) = file.as_mut() {
                f.write_all(format_entry(record.counterparty(), &category).as_bytes())
                    .and_then(|_| f.flush())
                    .map_err(|e| self.io_err(e))?;
            }
            existing.insert(record.counterparty(), category);
            added += 1;
        }

        if added > 0 {
            tracing::info!(added, path = %self.path.display(), "classifier store extended");
        }
        Ok(existing)
    }

    /// `load`, falling back to `bootstrap` when there is no store yet
    pub fn load_or_bootstrap(
        &self,
        records: &[AggregateRecord],
        categories: &mut CategorySet,
        operator: &mut dyn Operator,
    ) -> Result<Classifiers, StoreError> {
        match self.load() {
            Ok(existing) => {
                categories.absorb(&existing);
                self.extend(existing, records, categories, operator)
            }
            Err(StoreError::NotFound(_)) => {
                tracing::info!(path = %self.path.display(), "no classifier store; bootstrapping");
                self.bootstrap(records, categories, operator)
            }
            Err(e) => Err(e),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(TMP_SUFFIX);
        self.path.with_file_name(name)
    }

    fn write_atomic(&self, mapping: &Classifiers) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let body: String = mapping
            .iter()
            .map(|e| format_entry(&e.counterparty, &e.category))
            .collect();

        let tmp = self.tmp_path();
        let result = fs::write(&tmp, body).and_then(|_| fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_err(e));
        }
        Ok(())
    }

    fn open_append(&self) -> Result<fs::File, StoreError> {
        // a hand-edited store may lack the final newline
        let needs_newline = fs::read(&self.path)
            .map(|b| b.last().is_some_and(|&c| c != b'\n'))
            .map_err(|e| self.io_err(e))?;
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        if needs_newline {
            f.write_all(b"\n").map_err(|e| self.io_err(e))?;
        }
        Ok(f)
    }
}

fn resolve_new(
    record: &AggregateRecord,
    categories: &mut CategorySet,
    operator: &mut dyn Operator,
) -> Result<String, StoreError> {
    if record.kind().is_credit() {
        return Ok(categories.deposit().to_string());
    }
    Ok(classify(record, categories, operator)?)
}

fn check_entry(counterparty: &str, category: &str) -> Result<(), StoreError> {
    let bad_key = counterparty.is_empty()
        || counterparty.contains(SEPARATOR)
        || counterparty.contains(['\n', '\r']);
    if bad_key || category.is_empty() || category.contains(['\n', '\r']) {
        return Err(StoreError::InvalidKey(counterparty.to_string()));
    }
    Ok(())
}

fn format_entry(counterparty: &str, category: &str) -> String {
    format!("{counterparty}{SEPARATOR}{category}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::tests::Scripted;
    use crate::classify::Choice;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use tally_core::{consolidate, Transaction, TransactionKind};

    fn records() -> Vec<AggregateRecord> {
        consolidate(vec![
            Transaction::new("ACME CORP PAYROLL", TransactionKind::Credit, "02/05", dec!(2150.00)),
            Transaction::new("HEB GROCERY #455", TransactionKind::Debit, "02/06", dec!(42.17)),
            Transaction::new("SHELL OIL", TransactionKind::Debit, "02/07", dec!(40.00)),
        ])
    }

    fn answers(choices: impl IntoIterator<Item = usize>) -> Scripted {
        Scripted {
            choices: choices.into_iter().map(Choice::Category).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_store_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClassifierStore::new(dir.path().join(".collectors"));
        assert!(matches!(store.load(), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_bootstrap_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClassifierStore::new(dir.path().join(".collectors"));
        let mut set = CategorySet::default();
        let mut op = answers([4, 5]);

        let written = store.bootstrap(&records(), &mut set, &mut op).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(written, loaded);
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.get("ACME CORP PAYROLL"), Some("Deposit"));
        assert_eq!(loaded.get("HEB GROCERY #455"), Some("Grocery"));
        assert_eq!(loaded.get("SHELL OIL"), Some("Fuel"));
        assert!(!store.tmp_path().exists());

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            text,
            "ACME CORP PAYROLL, Deposit\nHEB GROCERY #455, Grocery\nSHELL OIL, Fuel\n"
        );
    }

    #[test]
    fn test_aborted_bootstrap_leaves_no_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClassifierStore::new(dir.path().join(".collectors"));
        let mut set = CategorySet::default();
        // one answer for two debits
        let mut op = answers([4]);

        let err = store.bootstrap(&records(), &mut set, &mut op).unwrap_err();
        assert!(matches!(err, StoreError::Classify(_)));
        assert!(!store.exists());
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn test_extend_appends_only_new_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".collectors");
        fs::write(&path, "ACME CORP PAYROLL, Deposit\nHEB GROCERY #455, Grocery\n").unwrap();
        let store = ClassifierStore::new(&path);

        let existing = store.load().unwrap();
        let mut set = CategorySet::default();
        let mut op = answers([5]);
        let mapping = store.extend(existing, &records(), &mut set, &mut op).unwrap();

        assert_eq!(mapping.get("SHELL OIL"), Some("Fuel"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "ACME CORP PAYROLL, Deposit\nHEB GROCERY #455, Grocery\nSHELL OIL, Fuel\n"
        );
    }

    #[test]
    fn test_extend_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClassifierStore::new(dir.path().join(".collectors"));
        let mut set = CategorySet::default();
        store.bootstrap(&records(), &mut set, &mut answers([4, 5])).unwrap();

        let first = store
            .extend(store.load().unwrap(), &records(), &mut set, &mut answers([]))
            .unwrap();
        let bytes = fs::read(store.path()).unwrap();
        let second = store
            .extend(store.load().unwrap(), &records(), &mut set, &mut answers([]))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(bytes, fs::read(store.path()).unwrap());
    }

    #[test]
    fn test_extend_credits_skip_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".collectors");
        fs::write(&path, "HEB GROCERY #455, Grocery\nSHELL OIL, Fuel\n").unwrap();
        let store = ClassifierStore::new(&path);

        let mapping = store
            .extend(store.load().unwrap(), &records(), &mut CategorySet::default(), &mut answers([]))
            .unwrap();
        assert_eq!(mapping.get("ACME CORP PAYROLL"), Some("Deposit"));
    }

    #[test]
    fn test_extend_repairs_missing_final_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".collectors");
        fs::write(&path, "ACME CORP PAYROLL, Deposit\nHEB GROCERY #455, Grocery").unwrap();
        let store = ClassifierStore::new(&path);

        store
            .extend(store.load().unwrap(), &records(), &mut CategorySet::default(), &mut answers([5]))
            .unwrap();
        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.get("HEB GROCERY #455"), Some("Grocery"));
    }

    #[test]
    fn test_corrupt_store_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".collectors");
        fs::write(&path, "SHELL OIL, Fuel\nthis line has no separator\n").unwrap();
        let store = ClassifierStore::new(&path);

        match store.load() {
            Err(StoreError::Corrupt { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected corrupt store, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_lines_first_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".collectors");
        fs::write(&path, "SHELL OIL, Fuel\nSHELL OIL, Misc\n\nHEB, Grocery, produce\n").unwrap();
        let mapping = ClassifierStore::new(&path).load().unwrap();

        assert_eq!(mapping.len(), 2);
        assert_eq!(category_of(&mapping, "SHELL OIL"), Ok("Fuel"));
        assert_eq!(category_of(&mapping, "HEB"), Ok("Grocery, produce"));
        assert_eq!(
            category_of(&mapping, "NOPE"),
            Err(UnknownCounterparty("NOPE".to_string()))
        );
    }

    #[test]
    fn test_insert_first_write_wins() {
        let mut mapping = Classifiers::default();
        assert!(mapping.insert("SHELL OIL", "Fuel"));
        assert!(!mapping.insert("SHELL OIL", "Misc"));
        assert_eq!(mapping.get("SHELL OIL"), Some("Fuel"));
    }

    #[test]
    fn test_rejects_unstorable_key() {
        assert!(check_entry("ACME, INC", "Bill").is_err());
        assert!(check_entry("", "Bill").is_err());
        assert!(check_entry("ACME INC", "").is_err());
        assert!(check_entry("ACME INC", "Bill").is_ok());
    }
}
