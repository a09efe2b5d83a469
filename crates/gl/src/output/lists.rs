//! Saved list and sync status output formatting.

use chrono::{DateTime, Utc};
use grocery_store_rs::{Connectivity, MergePolicy, ReconcileReport, SavedListsMap};
use owo_colors::OwoColorize;
use serde::Serialize;

use super::helpers::{format_timestamp, truncate_str};

/// Widest list name shown in tables.
const NAME_WIDTH: usize = 24;

/// JSON output structure for a saved list summary.
#[derive(Serialize)]
pub struct SavedListOutput<'a> {
    pub name: &'a str,
    pub items: usize,
    pub timestamp: DateTime<Utc>,
    /// Saved offline and not yet reconciled.
    pub pending: bool,
}

/// JSON output structure for the lists command.
#[derive(Serialize)]
pub struct SavedListsOutput<'a> {
    pub lists: Vec<SavedListOutput<'a>>,
}

fn summaries<'a>(lists: &'a SavedListsMap, staged: &[String]) -> Vec<SavedListOutput<'a>> {
    lists
        .iter()
        .map(|(name, list)| SavedListOutput {
            name,
            items: list.items.len(),
            timestamp: list.timestamp,
            pending: staged.iter().any(|s| s == name),
        })
        .collect()
}

/// Formats saved lists as JSON.
pub fn format_lists_json(
    lists: &SavedListsMap,
    staged: &[String],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SavedListsOutput {
        lists: summaries(lists, staged),
    })
}

/// Formats saved lists as a table, most recently saved first.
pub fn format_lists_table(lists: &SavedListsMap, staged: &[String], use_colors: bool) -> String {
    if lists.is_empty() {
        return "No saved lists.\n".to_string();
    }

    let mut rows = summaries(lists, staged);
    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut output = String::new();
    let header = format!("{:<width$} {:<6} {}", "Name", "Items", "Saved", width = NAME_WIDTH);
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for row in rows {
        let mut line = format!(
            "{:<width$} {:<6} {}",
            truncate_str(row.name, NAME_WIDTH),
            row.items,
            format_timestamp(row.timestamp),
            width = NAME_WIDTH
        );
        if row.pending {
            let marker = "(pending sync)";
            if use_colors {
                line.push_str(&format!(" {}", marker.yellow()));
            } else {
                line.push(' ');
                line.push_str(marker);
            }
        }
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Snapshot of sync state for the status command.
#[derive(Serialize)]
pub struct StatusSummary {
    pub connectivity: Connectivity,
    pub merge_policy: MergePolicy,
    pub items: usize,
    pub remaining: usize,
    pub saved_lists: usize,
    pub pending: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciled: Option<ReconcileReport>,
}

/// Formats the status summary as JSON.
pub fn format_status_json(summary: &StatusSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

/// Formats the status summary as a table.
pub fn format_status_table(summary: &StatusSummary, use_colors: bool) -> String {
    let connectivity = summary.connectivity.to_string();
    let connectivity = match (summary.connectivity, use_colors) {
        (Connectivity::Online, true) => connectivity.green().to_string(),
        (Connectivity::Offline, true) => connectivity.yellow().to_string(),
        _ => connectivity,
    };

    let mut output = String::new();
    output.push_str(&format!("Connectivity:  {connectivity}\n"));
    output.push_str(&format!("Merge policy:  {}\n", summary.merge_policy.as_str()));
    output.push_str(&format!(
        "Current list:  {} items ({} remaining)\n",
        summary.items, summary.remaining
    ));
    output.push_str(&format!("Saved lists:   {}\n", summary.saved_lists));
    if summary.pending.is_empty() {
        output.push_str("Pending sync:  none\n");
    } else {
        output.push_str(&format!("Pending sync:  {}\n", summary.pending.join(", ")));
    }
    if let Some(ref report) = summary.reconciled {
        output.push_str(&format_reconcile_report(report));
    }
    output
}

/// Describes what a reconciliation did, one line per outcome.
pub fn format_reconcile_report(report: &ReconcileReport) -> String {
    if report.is_noop() {
        return "Nothing to sync.\n".to_string();
    }

    let mut output = String::new();
    if !report.added.is_empty() {
        output.push_str(&format!("Synced: {}\n", report.added.join(", ")));
    }
    if !report.overwritten.is_empty() {
        output.push_str(&format!("Replaced: {}\n", report.overwritten.join(", ")));
    }
    if !report.discarded.is_empty() {
        output.push_str(&format!(
            "Kept newer saved copy of: {}\n",
            report.discarded.join(", ")
        ));
    }
    if !report.persisted {
        output.push_str("Could not write saved lists; offline saves kept for the next sync.\n");
    }
    output
}
