//! Working list output formatting.

use grocery_store_rs::Item;
use owo_colors::OwoColorize;
use serde::Serialize;

use super::helpers::{format_check, truncate_str};

/// Widest item name shown in tables.
const NAME_WIDTH: usize = 32;

/// JSON output structure for a single item.
#[derive(Serialize)]
pub struct ItemOutput<'a> {
    /// 1-based position, as accepted by the item commands.
    pub position: usize,
    pub name: &'a str,
    pub quantity: u32,
    pub completed: bool,
}

impl<'a> ItemOutput<'a> {
    pub fn new(index: usize, item: &'a Item) -> Self {
        Self {
            position: index + 1,
            name: &item.name,
            quantity: item.quantity,
            completed: item.completed,
        }
    }
}

/// JSON output structure for the list command.
#[derive(Serialize)]
pub struct ItemsListOutput<'a> {
    pub items: Vec<ItemOutput<'a>>,
    pub remaining: usize,
}

/// Formats the working list as JSON.
pub fn format_items_json(items: &[Item]) -> Result<String, serde_json::Error> {
    let output = ItemsListOutput {
        items: items
            .iter()
            .enumerate()
            .map(|(i, item)| ItemOutput::new(i, item))
            .collect(),
        remaining: items.iter().filter(|i| !i.completed).count(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats the working list as a table.
pub fn format_items_table(items: &[Item], use_colors: bool) -> String {
    if items.is_empty() {
        return "Your list is empty.\n".to_string();
    }

    let mut output = String::new();

    let header = format!("{:<4} {:<4} {:<width$} {}", "#", "", "Name", "Qty", width = NAME_WIDTH);
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for (index, item) in items.iter().enumerate() {
        let name = truncate_str(&item.name, NAME_WIDTH);
        let name = if item.completed && use_colors {
            format!("{:<width$}", name, width = NAME_WIDTH)
                .strikethrough()
                .dimmed()
                .to_string()
        } else {
            format!("{:<width$}", name, width = NAME_WIDTH)
        };
        output.push_str(&format!(
            "{:<4} {:<4} {} {}\n",
            index + 1,
            format_check(item.completed, use_colors),
            name,
            item.quantity
        ));
    }

    output
}

/// Formats a single item after a change, as JSON.
pub fn format_item_json(index: usize, item: &Item) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ItemOutput::new(index, item))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<Item> {
        let mut eggs = Item::new("Eggs", 12);
        eggs.completed = true;
        vec![Item::new("Milk", 2), eggs]
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_items_table(&[], false), "Your list is empty.\n");
    }

    #[test]
    fn test_table_rows_use_positions() {
        let table = format_items_table(&items(), false);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('#'));
        assert!(lines[1].starts_with("1"));
        assert!(lines[1].contains("[ ]"));
        assert!(lines[1].contains("Milk"));
        assert!(lines[2].contains("[x]"));
        assert!(lines[2].trim_end().ends_with("12"));
    }

    #[test]
    fn test_items_json() {
        let json: serde_json::Value =
            serde_json::from_str(&format_items_json(&items()).unwrap()).unwrap();

        assert_eq!(json["remaining"], 1);
        assert_eq!(json["items"][0]["position"], 1);
        assert_eq!(json["items"][1]["name"], "Eggs");
        assert_eq!(json["items"][1]["completed"], true);
    }
}
