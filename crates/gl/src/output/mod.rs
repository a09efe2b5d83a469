//! Output formatting utilities for the gl CLI.
//!
//! This module provides functions for formatting data as tables or JSON.
//! It is organized into submodules by entity type:
//!
//! - [`items`] - Working list output (list, add, edit, check)
//! - [`lists`] - Saved lists and sync status output (lists, status, sync)
//! - [`helpers`] - Common formatting utilities (truncation, notices, timestamps)

pub mod helpers;
mod items;
mod lists;

// Items
pub use items::{format_item_json, format_items_json, format_items_table};

// Lists and sync
pub use lists::{
    format_lists_json, format_lists_table, format_reconcile_report, format_status_json,
    format_status_table, StatusSummary,
};

use grocery_store_rs::{Notice, Transition};

use crate::commands::CommandContext;
use helpers::format_notice;

/// Prints a notice for a human reader. Error notices go to stderr.
pub fn print_notice(ctx: &CommandContext, notice: &Notice) {
    if !ctx.human() {
        return;
    }
    let text = format_notice(notice, ctx.use_colors);
    match notice.level {
        grocery_store_rs::NoticeLevel::Error => eprintln!("{text}"),
        _ => println!("{text}"),
    }
}

/// Reports a connectivity change noticed when the session opened.
///
/// Written to stderr so it never mixes with command output.
pub fn print_transition(ctx: &CommandContext, transition: &Transition) {
    if !ctx.human() {
        return;
    }
    if let Some(notice) = transition.notice() {
        eprintln!("{}", format_notice(&notice, ctx.use_colors));
    }
    if let Transition::WentOnline(report) = transition {
        if !report.is_noop() {
            eprint!("{}", format_reconcile_report(report));
        }
    }
}
