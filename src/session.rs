//! The session controller.
//!
//! A `Session` owns everything one user is looking at: the loaded transactions, the selected
//! categories and the monthly budget. Each change of state is followed by a full, pure
//! recomputation of the dashboard through `view`.

use crate::aggregate::{self, Bar, CategorySlice, SeriesPoint, Selection, Summary};
use crate::error::LoadError;
use crate::ingest::{self, IngestOptions};
use crate::model::{Amount, Transaction, Transactions};
use crate::Config;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Read;
use tracing::{debug, info, warn};

/// What to tell the user while no file has been loaded.
pub const IDLE_MESSAGE: &str =
    "Please supply a CSV file of financial transactions to analyze your finances.";

#[derive(Debug, Clone)]
pub struct Session {
    budget: Decimal,
    loaded: Option<Loaded>,
}

#[derive(Debug, Clone)]
struct Loaded {
    transactions: Transactions,
    selection: Selection,
}

/// What the session has to show right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<'a> {
    /// No file is loaded.
    Idle,
    Dashboard(Dashboard<'a>),
}

/// Every dataset the dashboard displays, computed from the current session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard<'a> {
    pub budget: Amount,
    pub selected_categories: Vec<&'a str>,
    pub summary: Summary,
    pub time_series: Vec<SeriesPoint<'a>>,
    pub category_breakdown: Vec<CategorySlice<'a>>,
    pub income_vs_expense: [Bar; 2],
    pub transactions: Vec<&'a Transaction>,
}

impl<'a> Dashboard<'a> {
    /// Runs the whole pipeline over `transactions`.
    pub fn build(transactions: &'a Transactions, selection: &'a Selection, budget: Decimal) -> Self {
        let filtered = aggregate::filter(transactions, selection);
        let summary = aggregate::summarize(&filtered, budget);
        Self {
            budget: Amount::new(budget),
            selected_categories: selection.iter().collect(),
            summary,
            time_series: aggregate::time_series(&filtered),
            category_breakdown: aggregate::category_breakdown(&filtered),
            income_vs_expense: aggregate::income_vs_expense(&summary),
            transactions: filtered,
        }
    }
}

impl Session {
    pub fn new(budget: Decimal) -> Self {
        Self {
            budget,
            loaded: None,
        }
    }

    /// A fresh session using the configured default budget.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.monthly_budget())
    }

    /// Loads a new file, replacing anything loaded before. Every category in the new file starts
    /// out selected.
    ///
    /// # Errors
    /// If the file cannot be loaded the session becomes idle and the `LoadError` is returned.
    pub fn upload<R: Read>(
        &mut self,
        reader: R,
        options: &IngestOptions,
    ) -> Result<&Transactions, LoadError> {
        self.loaded = None;
        let transactions = ingest::read_transactions(reader, options)?;
        let selection = Selection::all(&transactions);
        info!(
            "Loaded {} transactions in {} categories",
            transactions.len(),
            selection.len()
        );
        let loaded = self.loaded.insert(Loaded {
            transactions,
            selection,
        });
        Ok(&loaded.transactions)
    }

    pub fn is_idle(&self) -> bool {
        self.loaded.is_none()
    }

    pub fn transactions(&self) -> Option<&Transactions> {
        self.loaded.as_ref().map(|l| &l.transactions)
    }

    /// The categories present in the loaded file, in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        self.transactions()
            .map(Transactions::categories)
            .unwrap_or_default()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.loaded.as_ref().map(|l| &l.selection)
    }

    /// Replaces the selected categories. Names that are not in the file are kept, they simply
    /// match nothing.
    pub fn set_selection<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(loaded) = self.loaded.as_mut() else {
            debug!("Ignoring a category selection while no file is loaded");
            return;
        };
        let selection: Selection = categories.into_iter().collect();
        let present = loaded.transactions.categories();
        for unknown in selection.iter().filter(|c| !present.contains(c)) {
            warn!("The category '{unknown}' does not appear in the loaded transactions");
        }
        loaded.selection = selection;
    }

    /// Selects every category in the file.
    pub fn select_all(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.selection = Selection::all(&loaded.transactions);
        }
    }

    /// Removes categories from the current selection.
    pub fn deselect<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(loaded) = self.loaded.as_mut() {
            for category in categories {
                if !loaded.selection.remove(category.as_ref()) {
                    debug!("'{}' was not selected", category.as_ref());
                }
            }
        }
    }

    pub fn budget(&self) -> Decimal {
        self.budget
    }

    pub fn set_budget(&mut self, budget: Decimal) {
        self.budget = budget;
    }

    /// Recomputes everything to display from the current state.
    pub fn view(&self) -> View<'_> {
        match &self.loaded {
            None => View::Idle,
            Some(loaded) => View::Dashboard(Dashboard::build(
                &loaded.transactions,
                &loaded.selection,
                self.budget,
            )),
        }
    }
}
