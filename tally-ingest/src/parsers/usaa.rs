//! USAA checking statement lexer (text export).
//!
//! Expected layout after PDF-to-text:
//!   ... prelude ...
//!       DEPOSITS AND OTHER CREDITS
//!   02/01 USAA FUNDS TRANSFER CR          150.23        TO SAVINGS
//!   02/05              2,150.00   DEPOSIT
//!                      ACME CORP PAYROLL
//!       OTHER DEBITS
//!   02/06                 42.17   DEBIT CARD PURCHASE
//!                         REF 0206 CARD 1234
//!                         HEB GROCERY #455
//!                         *POSTED 02/07
//!    ACCOUNT BALANCE SUMMARY
//!
//! Section headers are matched verbatim, leading whitespace included. Every
//! line whose first token is `MM/DD` opens a record; the following lines up
//! to the next date line or header are its detail lines.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::iter::Enumerate;
use std::str::Lines;
use std::sync::LazyLock;
use tally_core::Transaction;

use crate::builder::build_transaction;
use crate::error::{MalformedReason, MalformedRecord, MissingSectionBoundary};
use crate::money::parse_money_token;
use crate::types::{ParsedRecord, Section};

/// Layout constants. These were read off one vendor's exports and are kept
/// out of the code so a differing export can be handled from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerConfig {
    pub credit_header: String,
    pub debit_header: String,
    pub summary_header: String,
    /// Most lines one record may span, date line included
    pub max_detail_lines: usize,
    /// Records with at least this many lines carry the name on `name_line_index`
    pub name_line_threshold: usize,
    pub name_line_index: usize,
    /// Leading character of a cleared/posted annotation line
    pub cleared_marker: char,
    /// Institution token dropped from one-line internal transfers
    pub institution_token: Option<String>,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            credit_header: "    DEPOSITS AND OTHER CREDITS".to_string(),
            debit_header: "    OTHER DEBITS".to_string(),
            summary_header: " ACCOUNT BALANCE SUMMARY".to_string(),
            max_detail_lines: 6,
            name_line_threshold: 4,
            name_line_index: 3,
            cleared_marker: '*',
            institution_token: Some("USAA".to_string()),
        }
    }
}

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}/\d{1,2}$").expect("date pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Prelude,
    Section(Section),
    Done,
}

/// Which boundary lines the lexer has passed so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Boundaries {
    pub credit: bool,
    pub debit: bool,
    pub summary: bool,
}

impl Boundaries {
    pub fn missing(&self) -> Vec<MissingSectionBoundary> {
        let mut out = Vec::new();
        if !self.credit {
            out.push(MissingSectionBoundary::Credit);
        }
        if !self.debit {
            out.push(MissingSectionBoundary::Debit);
        }
        if !self.summary {
            out.push(MissingSectionBoundary::Summary);
        }
        out
    }
}

/// Single forward pass over statement text yielding one item per record.
pub struct StatementLexer<'a> {
    lines: Enumerate<Lines<'a>>,
    config: &'a LexerConfig,
    state: State,
    /// Line that ended the previous record and still needs handling
    pending: Option<(usize, &'a str)>,
    seen: Boundaries,
}

impl<'a> StatementLexer<'a> {
    pub fn new(text: &'a str, config: &'a LexerConfig) -> Self {
        Self {
            lines: text.lines().enumerate(),
            config,
            state: State::Prelude,
            pending: None,
            seen: Boundaries::default(),
        }
    }

    /// Boundaries seen so far. Complete only once the iterator is exhausted.
    pub fn boundaries(&self) -> Boundaries {
        self.seen
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.pending.take().or_else(|| self.lines.next())
    }

    /// The state entered if `line` is the next header in order. Sections
    /// only move forward, so earlier or skipped headers are plain text.
    fn header(&self, line: &str) -> Option<State> {
        let (expected, next) = match self.state {
            State::Prelude => (&self.config.credit_header, State::Section(Section::Credit)),
            State::Section(Section::Credit) => {
                (&self.config.debit_header, State::Section(Section::Debit))
            }
            State::Section(Section::Debit) => (&self.config.summary_header, State::Done),
            State::Done => return None,
        };
        (line == expected.as_str()).then_some(next)
    }

    fn enter(&mut self, state: State) {
        match state {
            State::Section(Section::Credit) => self.seen.credit = true,
            State::Section(Section::Debit) => self.seen.debit = true,
            State::Done => self.seen.summary = true,
            State::Prelude => {}
        }
        tracing::debug!(?state, "statement boundary");
        self.state = state;
    }

    fn date_token<'l>(&self, line: &'l str) -> Option<&'l str> {
        line.split_whitespace()
            .next()
            .filter(|t| DATE_RE.is_match(t))
    }

    fn is_boundary(&self, line: &str) -> bool {
        self.header(line).is_some() || self.date_token(line).is_some()
    }

    /// Collect the detail lines of the record opened by `first` and interpret them
    fn read_record(
        &mut self,
        line_no: usize,
        first: &'a str,
        date: &'a str,
        section: Section,
    ) -> Result<ParsedRecord, MalformedRecord> {
        let max = self.config.max_detail_lines;
        let mut details = vec![first];
        let mut overflow = false;

        while let Some((n, line)) = self.lines.next() {
            if self.is_boundary(line) {
                self.pending = Some((n, line));
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            if details.len() >= max {
                // keep draining up to the next boundary
                overflow = true;
                continue;
            }
            details.push(line);
        }

        let malformed = |reason| MalformedRecord {
            line: line_no + 1,
            date: date.to_string(),
            reason,
        };

        if overflow {
            return Err(malformed(MalformedReason::TooManyDetailLines(max)));
        }

        let (amount, amount_pos) = first
            .split_whitespace()
            .enumerate()
            .skip(1)
            .find_map(|(i, t)| parse_money_token(t).map(|a| (a, i)))
            .ok_or_else(|| malformed(MalformedReason::MissingAmount))?;

        let name_lines = match details.len() {
            1 => {
                let name = self.transfer_name(first, amount_pos);
                if name.is_empty() {
                    return Err(malformed(MalformedReason::EmptyName));
                }
                vec![name]
            }
            2 => vec![details[1].to_string()],
            n if n >= self.config.name_line_threshold => {
                let mut idx = self.config.name_line_index;
                let marked = details
                    .get(idx)
                    .is_some_and(|l| l.trim_start().starts_with(self.config.cleared_marker));
                if marked && idx > 0 {
                    idx -= 1;
                }
                match details.get(idx) {
                    Some(line) => vec![line.to_string()],
                    None => return Err(malformed(MalformedReason::UnrecognizedShape(n))),
                }
            }
            n => return Err(malformed(MalformedReason::UnrecognizedShape(n))),
        };

        Ok(ParsedRecord {
            date_text: date.to_string(),
            amount,
            name_lines,
            section,
        })
    }

    /// Name of a one-line internal transfer: the line minus date and amount
    fn transfer_name(&self, line: &str, amount_pos: usize) -> String {
        let mut tokens: Vec<&str> = line
            .split_whitespace()
            .enumerate()
            .filter(|(i, _)| *i != 0 && *i != amount_pos)
            .map(|(_, t)| t)
            .collect();
        if let Some(inst) = self.config.institution_token.as_deref() {
            if tokens.first() == Some(&inst) {
                tokens.remove(0);
            }
        }
        tokens.join(" ")
    }
}

impl<'a> Iterator for StatementLexer<'a> {
    type Item = Result<ParsedRecord, MalformedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == State::Done {
                return None;
            }
            let (line_no, line) = self.next_line()?;

            if let Some(next) = self.header(line) {
                self.enter(next);
                continue;
            }

            if let State::Section(section) = self.state {
                if let Some(date) = self.date_token(line) {
                    return Some(self.read_record(line_no, line, date, section));
                }
            }
        }
    }
}

/// Everything recovered from one statement
#[derive(Debug, Clone, Default)]
pub struct StatementParse {
    pub transactions: Vec<Transaction>,
    pub malformed: Vec<MalformedRecord>,
    pub missing: Vec<MissingSectionBoundary>,
}

/// Lex a whole statement and build its transactions.
///
/// Malformed records and missing boundaries are collected rather than
/// returned as errors; the caller decides how loudly to report them.
pub fn parse_usaa_text(text: &str, config: &LexerConfig) -> StatementParse {
    let mut lexer = StatementLexer::new(text, config);
    let mut out = StatementParse::default();

    for item in lexer.by_ref() {
        match item {
            Ok(record) => {
                tracing::debug!(date = %record.date_text, amount = %record.amount, "record");
                out.transactions.push(build_transaction(record));
            }
            Err(err) => {
                tracing::warn!(%err, "skipping record");
                out.malformed.push(err);
            }
        }
    }

    out.missing = lexer.boundaries().missing();
    for m in &out.missing {
        tracing::warn!(%m, "incomplete statement");
    }
    tracing::info!(
        transactions = out.transactions.len(),
        malformed = out.malformed.len(),
        "statement parsed"
    );
    out
}
