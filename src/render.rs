//! Turns the session's view into text for the terminal.
//!
//! `Format::Table` prints each dataset as a Markdown table under the heading the dashboard gives
//! it. `Format::Json` prints the datasets themselves.

use crate::aggregate::{self, CategorySlice, SeriesPoint, Summary};
use crate::model::{Amount, Transaction};
use crate::session::{Dashboard, View, IDLE_MESSAGE};
use crate::Result;
use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// How a report is printed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Markdown tables.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

serde_plain::derive_display_from_serialize!(Format);
serde_plain::derive_fromstr_from_deserialize!(Format);

/// Which part of the dashboard to print.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    All,
    /// The four headline metrics.
    Summary,
    /// The spending trend, one series per category.
    Trend,
    /// Spending by category.
    Breakdown,
    /// Income versus expenses.
    Comparison,
    /// The filtered transactions.
    Table,
}

serde_plain::derive_display_from_serialize!(Section);
serde_plain::derive_fromstr_from_deserialize!(Section);

pub fn render(view: &View<'_>, format: Format, section: Section) -> Result<String> {
    match (view, format) {
        (View::Idle, Format::Table) => Ok(IDLE_MESSAGE.to_string()),
        (View::Idle, Format::Json) => to_json(&serde_json::json!({ "message": IDLE_MESSAGE })),
        (View::Dashboard(d), Format::Table) => Ok(render_tables(d, section)),
        (View::Dashboard(d), Format::Json) => match section {
            Section::All => to_json(d),
            Section::Summary => to_json(&d.summary),
            Section::Trend => to_json(&d.time_series),
            Section::Breakdown => to_json(&d.category_breakdown),
            Section::Comparison => to_json(&d.income_vs_expense),
            Section::Table => to_json(&d.transactions),
        },
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Unable to serialize the report")
}

fn render_tables(d: &Dashboard<'_>, section: Section) -> String {
    let sections: Vec<(&str, String)> = match section {
        Section::All => vec![
            ("Monthly Summary", summary_table(&d.summary)),
            ("Spending Trend Over Time", trend_table(&d.time_series)),
            ("Spending by Category", breakdown_table(&d.category_breakdown)),
            ("Income vs Expenses", comparison_table(d)),
            ("Full Transaction Data", transaction_table(&d.transactions)),
        ],
        Section::Summary => vec![("Monthly Summary", summary_table(&d.summary))],
        Section::Trend => vec![("Spending Trend Over Time", trend_table(&d.time_series))],
        Section::Breakdown => vec![(
            "Spending by Category",
            breakdown_table(&d.category_breakdown),
        )],
        Section::Comparison => vec![("Income vs Expenses", comparison_table(d))],
        Section::Table => vec![(
            "Full Transaction Data",
            transaction_table(&d.transactions),
        )],
    };

    sections
        .into_iter()
        .map(|(heading, body)| format!("## {heading}\n\n{body}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn summary_table(summary: &Summary) -> String {
    // Expenses are shown as a positive magnitude, like the comparison chart.
    markdown_table(
        &["Metric", "Value"],
        vec![
            vec!["Total Income".into(), summary.total_income.to_string()],
            vec!["Total Expenses".into(), (-summary.total_expense).to_string()],
            vec!["Net Income".into(), summary.net_income.to_string()],
            vec!["Budget Remaining".into(), summary.budget_remaining.to_string()],
        ],
    )
}

fn trend_table(points: &[SeriesPoint<'_>]) -> String {
    let mut series: Vec<(&str, Vec<String>)> = Vec::new();
    for point in points {
        let label = format!("{}: {}", point.date, point.amount);
        match series.iter().position(|(c, _)| *c == point.category) {
            Some(ix) => series[ix].1.push(label),
            None => series.push((point.category, vec![label])),
        }
    }
    markdown_table(
        &["Category", "Points"],
        series
            .into_iter()
            .map(|(category, labels)| vec![category.to_string(), labels.join("; ")])
            .collect(),
    )
}

fn breakdown_table(slices: &[CategorySlice<'_>]) -> String {
    let totals = aggregate::category_totals(slices);
    let spent: Amount = totals.iter().map(|s| s.amount).sum();
    let rows = totals
        .iter()
        .map(|s| {
            vec![
                s.category.to_string(),
                s.amount.abs().to_string(),
                format!("{}%", share(s.amount, spent)),
            ]
        })
        .collect();
    markdown_table(&["Category", "Spent", "Share"], rows)
}

/// `part` as a percentage of `whole`, to one decimal place.
fn share(part: Amount, whole: Amount) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part.value() / whole.value() * Decimal::ONE_HUNDRED).round_dp(1)
}

fn comparison_table(d: &Dashboard<'_>) -> String {
    markdown_table(
        &["Type", "Amount"],
        d.income_vs_expense
            .iter()
            .map(|bar| vec![bar.flow.to_string(), bar.amount.to_string()])
            .collect(),
    )
}

fn transaction_table(transactions: &[&Transaction]) -> String {
    markdown_table(
        &["Date", "Category", "Amount"],
        transactions
            .iter()
            .map(|t| {
                vec![
                    t.date().to_string(),
                    t.category().to_string(),
                    t.amount().to_string(),
                ]
            })
            .collect(),
    )
}

fn markdown_table(headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let _ = writeln!(out, "|{}", " --- |".repeat(headers.len()));
    if rows.is_empty() {
        out.push_str("\n_No data_\n");
    }
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| cell.replace('|', "\\|")).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out
}
