//! Plain-text export and sharing.
//!
//! Formatting is pure. [`share_list`] drives the share-then-clipboard fallback over the
//! [`ShareSink`] and [`Clipboard`] capabilities and turns the outcome into a notice.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use thiserror::Error;

use crate::notice::Notice;
use crate::Item;

/// Characters `encodeURIComponent` leaves alone besides alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Line style for copied lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopyFormat {
    /// `Milk (2)`
    #[default]
    Plain,
    /// `[ ] Milk (2)`, or `[x] Milk (2)` once completed
    Checkbox,
}

/// Renders one item as `name (quantity)`.
pub fn format_item_line(item: &Item) -> String {
    format!("{} ({})", item.name, item.quantity)
}

/// Renders items one per line in the given format.
pub fn format_copy_text(items: &[Item], format: CopyFormat) -> String {
    items
        .iter()
        .map(|item| match format {
            CopyFormat::Plain => format_item_line(item),
            CopyFormat::Checkbox => {
                let mark = if item.completed { "[x]" } else { "[ ]" };
                format!("{mark} {}", format_item_line(item))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a named list for a native share sheet: the name, a blank line, then bullets.
pub fn format_share_text(name: &str, items: &[Item]) -> String {
    let lines = items
        .iter()
        .map(|item| format!("• {}", format_item_line(item)))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{name}\n\n{lines}")
}

/// A `data:` URL with the plain list, for handing off to a notes app.
pub fn notes_data_url(items: &[Item]) -> String {
    let text = format_copy_text(items, CopyFormat::Plain);
    format!(
        "data:text/plain;charset=utf-8,{}",
        utf8_percent_encode(&text, URI_COMPONENT)
    )
}

/// What gets handed to a share target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SharePayload {
    pub fn for_list(name: &str, items: &[Item]) -> Self {
        Self {
            title: format!("Grocery List: {name}"),
            text: format_share_text(name, items),
            url: None,
        }
    }
}

/// Share and clipboard failures.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The platform has no such capability.
    #[error("{0} is not available on this platform")]
    Unavailable(&'static str),

    /// The capability exists but the request failed or was dismissed.
    #[error("{0}")]
    Rejected(String),
}

/// A native share target.
pub trait ShareSink {
    fn share(&self, payload: &SharePayload) -> Result<(), ShareError>;
}

/// A clipboard that accepts plain text.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ShareError>;
}

/// A share target for platforms without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoShareSink;

impl ShareSink for NoShareSink {
    fn share(&self, _payload: &SharePayload) -> Result<(), ShareError> {
        Err(ShareError::Unavailable("native share"))
    }
}

/// How a share request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareMethod {
    /// Delivered to the share target.
    Shared,
    /// Share failed or was unavailable; the text went to the clipboard.
    Copied,
    /// Both share and clipboard failed.
    Failed,
}

/// Outcome of [`share_list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareOutcome {
    pub method: ShareMethod,
    pub notice: Notice,
    /// The text that was shared or copied.
    pub text: String,
}

/// Shares a named list, falling back to the clipboard.
///
/// Never fails: every failure ends up as an error notice in the outcome.
pub fn share_list(
    sink: &impl ShareSink,
    clipboard: &impl Clipboard,
    name: &str,
    items: &[Item],
) -> ShareOutcome {
    let payload = SharePayload::for_list(name, items);

    match sink.share(&payload) {
        Ok(()) => {
            return ShareOutcome {
                method: ShareMethod::Shared,
                notice: Notice::success("List shared successfully!"),
                text: payload.text,
            };
        }
        Err(e) => tracing::debug!(error = %e, "share unavailable, falling back to clipboard"),
    }

    match clipboard.write_text(&payload.text) {
        Ok(()) => ShareOutcome {
            method: ShareMethod::Copied,
            notice: Notice::info("List copied to clipboard! You can now paste it in any app."),
            text: payload.text,
        },
        Err(e) => {
            tracing::warn!(error = %e, "could not copy list to clipboard");
            ShareOutcome {
                method: ShareMethod::Failed,
                notice: Notice::error("Unable to share. Please try again."),
                text: payload.text,
            }
        }
    }
}

/// Copies items to the clipboard in the given format.
pub fn copy_list(clipboard: &impl Clipboard, items: &[Item], format: CopyFormat) -> Notice {
    let text = format_copy_text(items, format);
    match clipboard.write_text(&text) {
        Ok(()) => Notice::success("List copied to clipboard!"),
        Err(e) => {
            tracing::warn!(error = %e, "could not copy list to clipboard");
            Notice::error("Unable to copy. Please try again.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingClipboard {
        fail: bool,
        written: RefCell<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<(), ShareError> {
            if self.fail {
                return Err(ShareError::Rejected("denied".into()));
            }
            self.written.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    struct AcceptingSink;

    impl ShareSink for AcceptingSink {
        fn share(&self, _payload: &SharePayload) -> Result<(), ShareError> {
            Ok(())
        }
    }

    struct DismissingSink;

    impl ShareSink for DismissingSink {
        fn share(&self, _payload: &SharePayload) -> Result<(), ShareError> {
            Err(ShareError::Rejected("AbortError".into()))
        }
    }

    fn items() -> Vec<Item> {
        let mut eggs = Item::new("Eggs", 12);
        eggs.completed = true;
        vec![Item::new("Milk", 2), eggs]
    }

    #[test]
    fn test_plain_copy_text() {
        assert_eq!(
            format_copy_text(&items(), CopyFormat::Plain),
            "Milk (2)\nEggs (12)"
        );
    }

    #[test]
    fn test_checkbox_copy_text_marks_completed() {
        assert_eq!(
            format_copy_text(&items(), CopyFormat::Checkbox),
            "[ ] Milk (2)\n[x] Eggs (12)"
        );
    }

    #[test]
    fn test_share_text_has_title_and_bullets() {
        assert_eq!(
            format_share_text("Week1", &items()),
            "Week1\n\n• Milk (2)\n• Eggs (12)"
        );
    }

    #[test]
    fn test_empty_list_formats_to_empty_body() {
        assert_eq!(format_copy_text(&[], CopyFormat::Plain), "");
        assert_eq!(format_share_text("Empty", &[]), "Empty\n\n");
    }

    #[test]
    fn test_notes_data_url_is_percent_encoded() {
        let url = notes_data_url(&[Item::new("Milk & honey", 1)]);
        assert_eq!(url, "data:text/plain;charset=utf-8,Milk%20%26%20honey%20(1)");
    }

    #[test]
    fn test_share_succeeds_without_clipboard() {
        let clipboard = RecordingClipboard::default();
        let outcome = share_list(&AcceptingSink, &clipboard, "Week1", &items());

        assert_eq!(outcome.method, ShareMethod::Shared);
        assert_eq!(outcome.notice.level, NoticeLevel::Success);
        assert!(clipboard.written.borrow().is_empty());
    }

    #[test]
    fn test_unavailable_share_falls_back_to_clipboard() {
        let clipboard = RecordingClipboard::default();
        let outcome = share_list(&NoShareSink, &clipboard, "Week1", &items());

        assert_eq!(outcome.method, ShareMethod::Copied);
        assert_eq!(
            clipboard.written.borrow().as_slice(),
            &["Week1\n\n• Milk (2)\n• Eggs (12)".to_string()]
        );
    }

    #[test]
    fn test_dismissed_share_falls_back_to_clipboard() {
        let clipboard = RecordingClipboard::default();
        let outcome = share_list(&DismissingSink, &clipboard, "Week1", &items());
        assert_eq!(outcome.method, ShareMethod::Copied);
    }

    #[test]
    fn test_both_failing_yields_error_notice() {
        let clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        let outcome = share_list(&NoShareSink, &clipboard, "Week1", &items());

        assert_eq!(outcome.method, ShareMethod::Failed);
        assert_eq!(outcome.notice.level, NoticeLevel::Error);
        assert_eq!(outcome.notice.message, "Unable to share. Please try again.");
    }

    #[test]
    fn test_copy_list_reports_result() {
        let clipboard = RecordingClipboard::default();
        let notice = copy_list(&clipboard, &items(), CopyFormat::Checkbox);
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(clipboard.written.borrow()[0], "[ ] Milk (2)\n[x] Eggs (12)");
    }
}
