//! Per-category totals and deposit/debit shares for reporting

use crate::finance::AggregateRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// A counterparty that has no stored category
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no category stored for counterparty `{0}`")]
pub struct UnknownCounterparty(pub String);

/// Running total for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

/// Result of folding classified aggregates into categories
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portions {
    pub totals: Vec<CategoryTotal>,
    pub deposit_category: String,
    pub deposit_total: Decimal,
    pub debit_total: Decimal,
    /// Counterparties left out because they had no category
    pub excluded: Vec<String>,
}

impl Portions {
    pub fn is_deposit(&self, total: &CategoryTotal) -> bool {
        total.category == self.deposit_category
    }

    /// Fraction of the deposit or debit total this category represents.
    /// Zero when the relevant total is zero.
    pub fn share(&self, total: &CategoryTotal) -> Decimal {
        let whole = if self.is_deposit(total) {
            self.deposit_total
        } else {
            self.debit_total
        };
        total.amount.checked_div(whole).unwrap_or(Decimal::ZERO)
    }

    pub fn get(&self, category: &str) -> Option<&CategoryTotal> {
        self.totals.iter().find(|t| t.category == category)
    }
}

fn seed(totals: &mut Vec<CategoryTotal>, name: &str) -> usize {
    match totals.iter().position(|t| t.category == name) {
        Some(i) => i,
        None => {
            totals.push(CategoryTotal {
                category: name.to_string(),
                amount: Decimal::ZERO,
            });
            totals.len() - 1
        }
    }
}

/// Sum aggregate totals per category.
///
/// `categories` seeds the output so that every known category is reported,
/// zero or not. Categories returned by `resolve` that are not in `categories`
/// are appended in the order they are first met.
pub fn aggregate_portions<'a, F>(
    records: &[AggregateRecord],
    mut resolve: F,
    categories: impl IntoIterator<Item = &'a str>,
    deposit_category: &str,
) -> Portions
where
    F: FnMut(&str) -> Result<String, UnknownCounterparty>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    seed(&mut totals, deposit_category);
    for name in categories {
        seed(&mut totals, name);
    }

    let mut excluded = Vec::new();
    for record in records {
        match resolve(record.counterparty()) {
            Ok(category) => {
                let i = seed(&mut totals, &category);
                totals[i].amount += record.total();
            }
            Err(UnknownCounterparty(name)) => {
                tracing::warn!(counterparty = %name, "no category stored; excluded from totals");
                excluded.push(name);
            }
        }
    }

    let (deposit_total, debit_total) = totals.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(dep, deb), t| {
            if t.category == deposit_category {
                (dep + t.amount, deb)
            } else {
                (dep, deb + t.amount)
            }
        },
    );

    Portions {
        totals,
        deposit_category: deposit_category.to_string(),
        deposit_total,
        debit_total,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::consolidate;
    use crate::finance::{Transaction, TransactionKind};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(map: &HashMap<&str, &str>) -> impl FnMut(&str) -> Result<String, UnknownCounterparty> {
        move |name| {
            map.get(name)
                .map(|c| c.to_string())
                .ok_or_else(|| UnknownCounterparty(name.to_string()))
        }
    }

    #[test]
    fn test_totals_per_category() {
        let records = consolidate(vec![
            Transaction::new("PAYROLL", TransactionKind::Credit, "02/01", dec!(2000.00)),
            Transaction::new("HEB", TransactionKind::Debit, "02/02", dec!(60.00)),
            Transaction::new("SHELL", TransactionKind::Debit, "02/03", dec!(40.00)),
            Transaction::new("HEB", TransactionKind::Debit, "02/09", dec!(100.00)),
        ]);
        let map = HashMap::from([
            ("PAYROLL", "Deposit"),
            ("HEB", "Grocery"),
            ("SHELL", "Fuel"),
        ]);

        let p = aggregate_portions(&records, lookup(&map), ["Grocery", "Fuel", "Coffee"], "Deposit");

        assert_eq!(p.deposit_total, dec!(2000.00));
        assert_eq!(p.debit_total, dec!(200.00));
        assert_eq!(p.get("Grocery").unwrap().amount, dec!(160.00));
        assert_eq!(p.get("Coffee").unwrap().amount, Decimal::ZERO);
        assert_eq!(p.share(p.get("Grocery").unwrap()), dec!(0.8));
        assert_eq!(p.share(p.get("Deposit").unwrap()), Decimal::ONE);
        assert!(p.excluded.is_empty());
    }

    #[test]
    fn test_no_debits_share_is_zero() {
        let records = consolidate(vec![Transaction::new(
            "PAYROLL",
            TransactionKind::Credit,
            "02/01",
            dec!(2000.00),
        )]);
        let map = HashMap::from([("PAYROLL", "Deposit")]);
        let p = aggregate_portions(&records, lookup(&map), ["Fuel"], "Deposit");

        assert_eq!(p.debit_total, Decimal::ZERO);
        assert_eq!(p.share(p.get("Fuel").unwrap()), Decimal::ZERO);
    }

    #[test]
    fn test_no_credits_share_is_zero() {
        let records = consolidate(vec![Transaction::new(
            "SHELL",
            TransactionKind::Debit,
            "02/01",
            dec!(20.00),
        )]);
        let map = HashMap::from([("SHELL", "Fuel")]);
        let p = aggregate_portions(&records, lookup(&map), ["Fuel"], "Deposit");

        assert_eq!(p.deposit_total, Decimal::ZERO);
        assert_eq!(p.share(p.get("Deposit").unwrap()), Decimal::ZERO);
        assert_eq!(p.share(p.get("Fuel").unwrap()), Decimal::ONE);
    }

    #[test]
    fn test_unknown_counterparty_excluded() {
        let records = consolidate(vec![
            Transaction::new("SHELL", TransactionKind::Debit, "02/01", dec!(20.00)),
            Transaction::new("MYSTERY LLC", TransactionKind::Debit, "02/02", dec!(99.00)),
        ]);
        let map = HashMap::from([("SHELL", "Fuel")]);
        let p = aggregate_portions(&records, lookup(&map), ["Fuel"], "Deposit");

        assert_eq!(p.excluded, vec!["MYSTERY LLC".to_string()]);
        assert_eq!(p.debit_total, dec!(20.00));
    }

    #[test]
    fn test_category_outside_known_set_is_appended() {
        let records = consolidate(vec![Transaction::new(
            "PETCO",
            TransactionKind::Debit,
            "02/01",
            dec!(15.00),
        )]);
        let map = HashMap::from([("PETCO", "Pets")]);
        let p = aggregate_portions(&records, lookup(&map), ["Fuel"], "Deposit");

        let names: Vec<_> = p.totals.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(names, vec!["Deposit", "Fuel", "Pets"]);
    }
}
