//! Plain-text rendering of the conversation page panels.
//!
//! The insights dashboard has a single renderer: while the fetch is pending
//! it draws the same sections with placeholder bars, so switching from the
//! skeleton to real content does not move anything around.

use std::fmt::Write;

use super::panel::PanelState;
use super::view::DocumentViewer;
use crate::adapters::{CategorySummary, Frequency, InsightsRecord, TableDataset};
use crate::document::UploadRecord;

const PLACEHOLDER: &str = "░░░░░░░░░░░░";
const RECURRING_SHOWN: usize = 3;
const BREAKDOWN_SKELETON_ROWS: usize = 3;

pub fn document(record: &UploadRecord, viewer: &DocumentViewer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({:.2} MB)", record.name, record.size_mb());
    let _ = writeln!(
        out,
        "Page {} of {}  |  Zoom {}%",
        viewer.page(),
        viewer.total_pages(),
        viewer.zoom()
    );
    if let Some(url) = &record.url {
        let _ = writeln!(out, "Preview: {url}");
    }
    out
}

pub fn tables(panel: &PanelState<Vec<TableDataset>>) -> String {
    let mut out = String::from("Transactions Viewer\n\n");
    match panel {
        PanelState::Loading => {
            for _ in 0..BREAKDOWN_SKELETON_ROWS {
                let _ = writeln!(out, "{PLACEHOLDER} {PLACEHOLDER} {PLACEHOLDER}");
            }
            out.push_str("Loading transactions...\n");
        }
        PanelState::Failed(message) => {
            let _ = writeln!(out, "! Could not load transactions: {message}");
        }
        PanelState::Ready(datasets) if datasets.is_empty() => {
            out.push_str("No transaction tables found.\n");
        }
        PanelState::Ready(datasets) => {
            for dataset in datasets {
                out.push_str(&table(dataset));
                out.push('\n');
            }
        }
    }
    out
}

/// Column-aligned text table.
pub fn table(dataset: &TableDataset) -> String {
    let columns = dataset.columns();
    if columns.is_empty() {
        return "(empty table)\n".to_string();
    }

    let cells: Vec<Vec<String>> = (0..dataset.len())
        .map(|row| columns.iter().map(|c| dataset.cell_text(row, c)).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            cells
                .iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &columns, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}

pub fn insights(panel: &PanelState<InsightsRecord>) -> String {
    match panel {
        PanelState::Failed(message) => format!("! Could not load insights: {message}\n"),
        PanelState::Loading => dashboard(None),
        PanelState::Ready(record) => dashboard(Some(record)),
    }
}

fn dashboard(data: Option<&InsightsRecord>) -> String {
    let mut out = String::new();
    let value = |v: Option<String>| v.unwrap_or_else(|| PLACEHOLDER.to_string());

    let ratio = data.map(|d| &d.trends.credit_debit_ratio);
    let _ = writeln!(
        out,
        "Total Credits:      {}",
        value(ratio.map(|r| format!("${:.2}", r.total_credits)))
    );
    let _ = writeln!(
        out,
        "Total Debits:       {}",
        value(ratio.map(|r| format!("${:.2}", r.total_debits)))
    );
    let _ = writeln!(
        out,
        "Credit-Debit Ratio: {}",
        value(ratio.map(|r| format!("{:.2}", r.ratio)))
    );
    let _ = writeln!(
        out,
        "Largest Expense:    {}",
        value(data.map(|d| {
            d.largest_expense()
                .map(|e| e.category.clone())
                .unwrap_or_else(|| "-".to_string())
        }))
    );

    out.push_str("\nFinancial Insights\n");
    let trends = data.map(|d| &d.trends);
    let items = [
        ("Income Pattern", trends.map(|t| t.income_pattern.clone())),
        ("Spending Pattern", trends.map(|t| t.spending_pattern.clone())),
        ("Notable Observation", trends.map(|t| t.notable_observation.clone())),
        ("Cash Flow Alert", trends.map(|t| t.cash_flow_alert.clone())),
        ("Recurring Expenses", trends.map(|t| t.recurring_expenses.clone())),
    ];
    for (title, text) in items {
        let _ = writeln!(out, "  {title}: {}", value(text));
    }

    out.push_str("\nCredit Breakdown\n");
    breakdown(&mut out, data.map(|d| d.credits.as_slice()));
    out.push_str("\nDebit Breakdown\n");
    breakdown(&mut out, data.map(|d| d.debits.as_slice()));

    out.push_str("\nRecurring Expenses\n");
    match data {
        Some(d) => {
            let recurring = d.top_recurring_expenses(RECURRING_SHOWN);
            if recurring.is_empty() {
                out.push_str("  none detected\n");
            }
            for expense in recurring {
                let _ = writeln!(
                    out,
                    "  {} - ${:.2} ({}, {} payments)",
                    expense.category,
                    expense.total_amount,
                    Frequency::from_count(expense.transaction_count).label(),
                    expense.transaction_count
                );
            }
        }
        None => {
            for _ in 0..RECURRING_SHOWN {
                let _ = writeln!(out, "  {PLACEHOLDER}");
            }
        }
    }

    if data.is_none() {
        out.push_str("\nLoading insights...\n");
    }
    out
}

fn breakdown(out: &mut String, entries: Option<&[CategorySummary]>) {
    match entries {
        Some(entries) => {
            for (category, total) in InsightsRecord::breakdown(entries) {
                let _ = writeln!(out, "  {category}: ${total:.2}");
            }
        }
        None => {
            for _ in 0..BREAKDOWN_SKELETON_ROWS {
                let _ = writeln!(out, "  {PLACEHOLDER}");
            }
        }
    }
}
