//! ParsedRecord -> Transaction

use chrono::NaiveDate;
use tally_core::Transaction;

use crate::types::ParsedRecord;

/// Join name lines into one counterparty key.
///
/// Whitespace runs collapse to one space. A comma followed by whitespace
/// collapses too, since `", "` separates fields in the classifier store.
pub fn normalize_counterparty<S: AsRef<str>>(lines: &[S]) -> String {
    let joined = lines
        .iter()
        .flat_map(|l| l.as_ref().split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");
    joined.replace(", ", " ")
}

pub fn build_transaction(record: ParsedRecord) -> Transaction {
    Transaction {
        counterparty: normalize_counterparty(&record.name_lines),
        kind: record.section.kind(),
        date: record.date_text,
        amount: record.amount,
    }
}

/// Resolve an `MM/DD` statement tag to a calendar date.
///
/// Statements only print month and day, so the year has to come from the caller.
pub fn iso_date(date_text: &str, year: i32) -> Option<NaiveDate> {
    let mut it = date_text.trim().split('/');
    let m: u32 = it.next()?.parse().ok()?;
    let d: u32 = it.next()?.parse().ok()?;
    if it.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Section;
    use rust_decimal_macros::dec;
    use tally_core::TransactionKind;

    #[test]
    fn test_normalize_collapses_whitespace() {
        let name = normalize_counterparty(&["  STARBUCKS   STORE\t#123  ", "  AUSTIN TX"]);
        assert_eq!(name, "STARBUCKS STORE #123 AUSTIN TX");
    }

    #[test]
    fn test_normalize_drops_store_separator() {
        assert_eq!(normalize_counterparty(&["ACME, INC"]), "ACME INC");
        assert_eq!(normalize_counterparty(&["ACME,INC"]), "ACME,INC");
    }

    #[test]
    fn test_build_debit() {
        let txn = build_transaction(ParsedRecord {
            date_text: "02/06".to_string(),
            amount: dec!(42.17),
            name_lines: vec!["   HEB GROCERY   #455 ".to_string()],
            section: Section::Debit,
        });
        assert_eq!(txn.counterparty, "HEB GROCERY #455");
        assert_eq!(txn.kind, TransactionKind::Debit);
        assert_eq!(txn.date, "02/06");
        assert_eq!(txn.amount, dec!(42.17));
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(iso_date("02/06", 2024), NaiveDate::from_ymd_opt(2024, 2, 6));
        assert_eq!(iso_date("02/30", 2024), None);
        assert_eq!(iso_date("2/6/24", 2024), None);
        assert_eq!(iso_date("garbage", 2024), None);
    }
}
