//! Common helper functions for output formatting.

use chrono::{DateTime, Local, Utc};
use grocery_store_rs::{Notice, NoticeLevel};
use owo_colors::OwoColorize;

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a notice, colored by level.
pub fn format_notice(notice: &Notice, use_colors: bool) -> String {
    if !use_colors {
        return notice.message.clone();
    }
    match notice.level {
        NoticeLevel::Success => notice.message.green().to_string(),
        NoticeLevel::Error => notice.message.red().to_string(),
        NoticeLevel::Info => notice.message.blue().to_string(),
    }
}

/// Formats a save time in local time, with relative wording for today and yesterday.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    let local = timestamp.with_timezone(&Local);
    let today = Local::now().date_naive();
    let date = local.date_naive();

    if date == today {
        format!("Today {}", local.format("%H:%M"))
    } else if today.pred_opt() == Some(date) {
        format!("Yesterday {}", local.format("%H:%M"))
    } else {
        local.format("%b %d %Y").to_string()
    }
}

/// Formats a completion checkbox.
pub fn format_check(completed: bool, use_colors: bool) -> String {
    match (completed, use_colors) {
        (true, true) => "[x]".green().to_string(),
        (true, false) => "[x]".to_string(),
        (false, _) => "[ ]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Milk", 10), "Milk");
        assert_eq!(truncate_str("Unsalted butter sticks", 10), "Unsalte...");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("Crème fraîche épaisse", 8), "Crème...");
    }

    #[test]
    fn test_format_notice_plain() {
        assert_eq!(
            format_notice(&Notice::item_added(), false),
            "Item added successfully!"
        );
    }

    #[test]
    fn test_format_notice_colored_keeps_message() {
        let colored = format_notice(&Notice::error("Nope"), true);
        assert!(colored.contains("Nope"));
        assert_ne!(colored, "Nope");
    }

    #[test]
    fn test_format_timestamp_old_date() {
        let ts = Utc.with_ymd_and_hms(2020, 3, 15, 12, 0, 0).unwrap();
        assert!(format_timestamp(ts).ends_with("2020"));
    }

    #[test]
    fn test_format_timestamp_today() {
        assert!(format_timestamp(Utc::now()).starts_with("Today"));
    }

    #[test]
    fn test_format_check() {
        assert_eq!(format_check(true, false), "[x]");
        assert_eq!(format_check(false, true), "[ ]");
    }
}
