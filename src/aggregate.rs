//! The aggregation pipeline: filtering by category, summary metrics and the datasets that feed
//! the charts.
//!
//! Every function here is pure. The session re-runs the whole pipeline whenever the file, the
//! category selection or the budget changes.

use crate::model::{Amount, Transaction, Transactions};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of categories the user has chosen to look at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection(BTreeSet<String>);

impl Selection {
    /// Every category present in `transactions`.
    pub fn all(transactions: &Transactions) -> Self {
        transactions.categories().into_iter().collect()
    }

    /// No categories; filtering with this yields nothing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains(category)
    }

    pub fn remove(&mut self, category: &str) -> bool {
        self.0.remove(category)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The four headline metrics of the dashboard.
///
/// `total_income` is never negative and `total_expense` is never positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Summary {
    pub total_income: Amount,
    pub total_expense: Amount,
    pub net_income: Amount,
    pub budget_remaining: Amount,
}

/// One point of the spending trend line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint<'a> {
    pub date: NaiveDate,
    pub category: &'a str,
    pub amount: Amount,
}

/// One expense in the spending-by-category breakdown. The amount keeps its negative sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategorySlice<'a> {
    pub category: &'a str,
    pub amount: Amount,
}

/// The two bars of the income versus expenses comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Flow {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(Flow);
serde_plain::derive_fromstr_from_deserialize!(Flow);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub flow: Flow,
    pub amount: Amount,
}

/// Keeps the transactions whose category is selected, in their original order.
pub fn filter<'a>(transactions: &'a Transactions, selection: &Selection) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| selection.contains(t.category()))
        .collect()
}

/// Computes the headline metrics of `transactions` against a monthly `budget`.
///
/// Zero amounts count as neither income nor expense. With no transactions every metric is zero
/// except `budget_remaining`, which equals `budget`.
pub fn summarize(transactions: &[&Transaction], budget: Decimal) -> Summary {
    let total_income: Amount = transactions
        .iter()
        .filter(|t| t.is_income())
        .map(|t| t.amount())
        .sum();
    let total_expense: Amount = transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount())
        .sum();
    Summary {
        total_income,
        total_expense,
        net_income: total_income + total_expense,
        budget_remaining: Amount::new(budget) + total_expense,
    }
}

/// One point per transaction; grouping by category is up to whoever draws the lines.
pub fn time_series<'a>(transactions: &[&'a Transaction]) -> Vec<SeriesPoint<'a>> {
    transactions
        .iter()
        .map(|t| SeriesPoint {
            date: t.date(),
            category: t.category(),
            amount: t.amount(),
        })
        .collect()
}

/// The expenses only, as (category, negative amount) pairs in transaction order.
pub fn category_breakdown<'a>(transactions: &[&'a Transaction]) -> Vec<CategorySlice<'a>> {
    transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| CategorySlice {
            category: t.category(),
            amount: t.amount(),
        })
        .collect()
}

/// Sums slices that share a category, keeping categories in order of first appearance.
pub fn category_totals<'a>(slices: &[CategorySlice<'a>]) -> Vec<CategorySlice<'a>> {
    let mut totals: Vec<CategorySlice<'a>> = Vec::new();
    for slice in slices {
        match totals.iter().position(|t| t.category == slice.category) {
            Some(ix) => totals[ix].amount = totals[ix].amount + slice.amount,
            None => totals.push(*slice),
        }
    }
    totals
}

/// Income and the magnitude of expenses, side by side.
pub fn income_vs_expense(summary: &Summary) -> [Bar; 2] {
    [
        Bar {
            flow: Flow::Income,
            amount: summary.total_income,
        },
        Bar {
            flow: Flow::Expense,
            amount: -summary.total_expense,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{dec, scenario, txn};

    fn all(transactions: &Transactions) -> Vec<&Transaction> {
        filter(transactions, &Selection::all(transactions))
    }

    #[test]
    fn test_scenario_a_all_categories() {
        let transactions = scenario();
        let summary = summarize(&all(&transactions), dec("1500"));
        assert_eq!(summary.total_income.value(), dec("2000"));
        assert_eq!(summary.total_expense.value(), dec("-50"));
        assert_eq!(summary.net_income.value(), dec("1950"));
        assert_eq!(summary.budget_remaining.value(), dec("1450"));
    }

    #[test]
    fn test_scenario_b_food_only() {
        let transactions = scenario();
        let filtered = filter(&transactions, &Selection::from_iter(["Food"]));
        let summary = summarize(&filtered, dec("1500"));
        assert_eq!(summary.total_income.value(), Decimal::ZERO);
        assert_eq!(summary.total_expense.value(), dec("-50"));
        assert_eq!(summary.net_income.value(), dec("-50"));
        assert_eq!(summary.budget_remaining.value(), dec("1450"));
    }

    #[test]
    fn test_scenario_c_empty() {
        let summary = summarize(&[], dec("1500"));
        assert!(summary.total_income.is_zero());
        assert!(summary.total_expense.is_zero());
        assert!(summary.net_income.is_zero());
        assert_eq!(summary.budget_remaining.value(), dec("1500"));
    }

    #[test]
    fn test_scenario_d_income_vs_expense() {
        let transactions = scenario();
        let summary = summarize(&all(&transactions), dec("1500"));
        let bars = income_vs_expense(&summary);
        assert_eq!(bars[0].flow, Flow::Income);
        assert_eq!(bars[0].amount.value(), dec("2000"));
        assert_eq!(bars[1].flow, Flow::Expense);
        assert_eq!(bars[1].amount.value(), dec("50"));
        assert_eq!(bars[1].flow.to_string(), "Expense");
    }

    #[test]
    fn test_filter_keeps_order_and_only_selected() {
        let transactions: Transactions = vec![
            txn("2024-01-05", "Rent", "-900"),
            txn("2024-01-01", "Food", "-10"),
            txn("2024-01-03", "Salary", "2000"),
            txn("2024-01-02", "Food", "-20"),
            txn("2024-01-04", "Fun", "-30"),
        ]
        .into_iter()
        .collect();
        let selection = Selection::from_iter(["Food", "Rent"]);
        let filtered = filter(&transactions, &selection);
        let got: Vec<(&str, Decimal)> = filtered
            .iter()
            .map(|t| (t.category(), t.amount().value()))
            .collect();
        assert_eq!(
            got,
            vec![("Rent", dec("-900")), ("Food", dec("-10")), ("Food", dec("-20"))]
        );
    }

    #[test]
    fn test_empty_selection_gives_empty_outputs() {
        let transactions = scenario();
        let filtered = filter(&transactions, &Selection::none());
        assert!(filtered.is_empty());
        assert!(time_series(&filtered).is_empty());
        assert!(category_breakdown(&filtered).is_empty());
        let summary = summarize(&filtered, dec("700"));
        assert_eq!(summary.budget_remaining.value(), dec("700"));
        let bars = income_vs_expense(&summary);
        assert!(bars.iter().all(|b| b.amount.is_zero()));
    }

    #[test]
    fn test_selection_of_absent_category_is_tolerated() {
        let transactions = scenario();
        let filtered = filter(&transactions, &Selection::from_iter(["Travel"]));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_zero_amount_counts_as_neither() {
        let transactions: Transactions = vec![
            txn("2024-01-01", "Transfer", "0"),
            txn("2024-01-02", "Transfer", "-0.00"),
        ]
        .into_iter()
        .collect();
        let filtered = all(&transactions);
        let summary = summarize(&filtered, dec("10"));
        assert!(summary.total_income.is_zero());
        assert!(summary.total_expense.is_zero());
        assert!(category_breakdown(&filtered).is_empty());
    }

    #[test]
    fn test_summarize_is_linear_over_partitions() {
        let transactions: Transactions = vec![
            txn("2024-01-01", "Food", "-12.34"),
            txn("2024-01-02", "Salary", "2500"),
            txn("2024-01-03", "Rent", "-900"),
            txn("2024-01-04", "Refund", "15.66"),
            txn("2024-01-05", "Food", "-0.01"),
        ]
        .into_iter()
        .collect();
        let filtered = all(&transactions);
        let whole = summarize(&filtered, dec("1500"));
        for split in 0..=filtered.len() {
            let (left, right) = filtered.split_at(split);
            let a = summarize(left, dec("1500"));
            let b = summarize(right, dec("1500"));
            assert_eq!(whole.total_income, a.total_income + b.total_income);
            assert_eq!(whole.total_expense, a.total_expense + b.total_expense);
            assert_eq!(whole.net_income, a.net_income + b.net_income);
        }
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let transactions = scenario();
        let filtered = all(&transactions);
        assert_eq!(
            summarize(&filtered, dec("1500")),
            summarize(&filtered, dec("1500"))
        );
    }

    #[test]
    fn test_budget_remaining_adds_the_negative_expense_total() {
        let transactions: Transactions = vec![
            txn("2024-01-01", "Food", "-100"),
            txn("2024-01-02", "Food", "-250.50"),
            txn("2024-01-03", "Salary", "5000"),
        ]
        .into_iter()
        .collect();
        let summary = summarize(&all(&transactions), dec("300"));
        // Income does not raise the remaining budget and the result may go negative.
        assert_eq!(summary.budget_remaining.value(), dec("-50.50"));
        assert_eq!(
            summary.budget_remaining.value(),
            dec("300") + summary.total_expense.value()
        );
    }

    #[test]
    fn test_summarize_largest_amounts() {
        let transactions: Transactions = vec![
            txn("2024-01-01", "Rent", "-1000000000000"),
            txn("2024-01-02", "Rent", "-1000000000000"),
            txn("2024-01-03", "Salary", "1000000000000"),
        ]
        .into_iter()
        .collect();
        let summary = summarize(&all(&transactions), -Amount::MAX_MAGNITUDE);
        assert_eq!(summary.total_expense.value(), dec("-2000000000000"));
        assert_eq!(summary.net_income.value(), dec("-1000000000000"));
        assert_eq!(summary.budget_remaining.value(), dec("-3000000000000"));
    }

    #[test]
    fn test_time_series_is_one_point_per_transaction() {
        let transactions: Transactions = vec![
            txn("2024-01-01", "Food", "-5"),
            txn("2024-01-01", "Food", "-6"),
            txn("2024-01-02", "Salary", "100"),
        ]
        .into_iter()
        .collect();
        let series = time_series(&all(&transactions));
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(series[1].category, "Food");
        assert_eq!(series[1].amount.value(), dec("-6"));
    }

    #[test]
    fn test_category_breakdown_keeps_sign_and_skips_income() {
        let transactions: Transactions = vec![
            txn("2024-01-01", "Food", "-5"),
            txn("2024-01-02", "Salary", "100"),
            txn("2024-01-03", "Rent", "-500"),
            txn("2024-01-04", "Food", "-7"),
        ]
        .into_iter()
        .collect();
        let slices = category_breakdown(&all(&transactions));
        let got: Vec<(&str, Decimal)> = slices
            .iter()
            .map(|s| (s.category, s.amount.value()))
            .collect();
        assert_eq!(
            got,
            vec![("Food", dec("-5")), ("Rent", dec("-500")), ("Food", dec("-7"))]
        );

        let totals = category_totals(&slices);
        let got: Vec<(&str, Decimal)> = totals
            .iter()
            .map(|s| (s.category, s.amount.value()))
            .collect();
        assert_eq!(got, vec![("Food", dec("-12")), ("Rent", dec("-500"))]);
    }

    #[test]
    fn test_summary_json() {
        let transactions = scenario();
        let summary = summarize(&all(&transactions), dec("1500"));
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["total_income"], "2000");
        assert_eq!(json["total_expense"], "-50");
        assert_eq!(json["net_income"], "1950");
        assert_eq!(json["budget_remaining"], "1450");
    }
}
