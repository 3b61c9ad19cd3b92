//! Category names offered when classifying a counterparty

use crate::store::Classifiers;

pub const DEPOSIT_CATEGORY: &str = "Deposit";

pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Deposit",
    "Savings",
    "Misc",
    "Bill",
    "Grocery",
    "Fuel",
    "Restaurant",
    "Coffee",
];

/// Ordered, duplicate-free set of categories for one run.
///
/// The deposit category is always present and always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    deposit: String,
    names: Vec<String>,
}

impl CategorySet {
    pub fn new<I, S>(deposit: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let deposit = deposit.into();
        let mut set = Self {
            names: vec![deposit.clone()],
            deposit,
        };
        for name in names {
            set.add(name);
        }
        set
    }

    /// Add a category; returns false when it was already known
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn deposit(&self) -> &str {
        &self.deposit
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Pick up categories created in earlier runs
    pub fn absorb(&mut self, mapping: &Classifiers) {
        for entry in mapping.iter() {
            if self.add(entry.category.as_str()) {
                tracing::debug!(category = %entry.category, "category from store");
            }
        }
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::new(DEPOSIT_CATEGORY, DEFAULT_CATEGORIES)
    }
}
