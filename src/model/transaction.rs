use crate::model::Amount;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated, categorized, signed monetary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    date: NaiveDate,
    category: String,
    amount: Amount,
}

impl Transaction {
    pub fn new(date: NaiveDate, category: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            date,
            category: category.into(),
            amount: amount.into(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }
}

/// The transactions loaded from one file, in file order. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transactions {
    data: Vec<Transaction>,
}

impl Transactions {
    pub fn new(data: Vec<Transaction>) -> Self {
        Self { data }
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The distinct categories present, each listed once, in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.data
            .iter()
            .map(Transaction::category)
            .filter(|c| seen.insert(*c))
            .collect()
    }
}

impl FromIterator<Transaction> for Transactions {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Transactions {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
