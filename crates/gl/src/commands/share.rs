//! Share and copy commands.
//!
//! A terminal has no share sheet, so sharing always falls through to the system
//! clipboard. The clipboard is driven through the platform's copy command.

use std::io::Write;
use std::process::{Command, Stdio};

use grocery_store_rs::share::{
    self, Clipboard, CopyFormat, NoShareSink, ShareError, ShareMethod,
};
use grocery_store_rs::{DurableStore, ListRepository, NoticeLevel};

use super::{CommandContext, CommandError, Result};
use crate::cli::CopyStyle;
use crate::output;

/// A program that reads text on stdin and puts it on the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CopyProgram {
    program: String,
    args: Vec<String>,
}

impl CopyProgram {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn run(&self, text: &str) -> std::result::Result<(), ShareError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ShareError::Rejected(format!("failed to spawn {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(|e| {
                ShareError::Rejected(format!("failed to write to {}: {e}", self.program))
            })?;
        }

        let status = child
            .wait()
            .map_err(|e| ShareError::Rejected(format!("failed to wait for {}: {e}", self.program)))?;

        if status.success() {
            Ok(())
        } else {
            Err(ShareError::Rejected(format!("{} exited with {status}", self.program)))
        }
    }
}

/// The system clipboard, reached through the first copy program that works.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    programs: Vec<CopyProgram>,
}

impl SystemClipboard {
    /// Uses the platform's usual copy programs.
    ///
    /// - macOS: pbcopy
    /// - Linux: xclip, then xsel
    /// - Windows: clip
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        let programs = vec![CopyProgram::new("pbcopy", &[])];

        #[cfg(target_os = "linux")]
        let programs = vec![
            CopyProgram::new("xclip", &["-selection", "clipboard"]),
            CopyProgram::new("xsel", &["--clipboard", "--input"]),
        ];

        #[cfg(target_os = "windows")]
        let programs = vec![CopyProgram::new("clip", &[])];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let programs = Vec::new();

        Self { programs }
    }

    /// Uses a single custom copy program.
    pub fn with_program(program: &str, args: &[&str]) -> Self {
        Self {
            programs: vec![CopyProgram::new(program, args)],
        }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> std::result::Result<(), ShareError> {
        let mut last_error = ShareError::Unavailable("clipboard");
        for program in &self.programs {
            match program.run(text) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(program = %program.program, error = %e, "copy program failed");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

impl From<CopyStyle> for CopyFormat {
    fn from(style: CopyStyle) -> Self {
        match style {
            CopyStyle::Plain => CopyFormat::Plain,
            CopyStyle::Checkbox => CopyFormat::Checkbox,
        }
    }
}

/// Options for the copy command.
#[derive(Debug)]
pub struct CopyOptions {
    pub style: CopyStyle,
    pub notes_url: bool,
}

/// Executes the share command for a saved list.
pub fn execute_share<S: DurableStore>(
    ctx: &CommandContext,
    repo: &ListRepository<S>,
    clipboard: &impl Clipboard,
    name: &str,
) -> Result<()> {
    let list = repo.find_list(name)?;
    let outcome = share::share_list(&NoShareSink, clipboard, name.trim(), &list.items);

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        output::print_notice(ctx, &outcome.notice);
    }

    if outcome.method == ShareMethod::Failed {
        return Err(CommandError::Clipboard(outcome.notice.message));
    }
    Ok(())
}

/// Executes the copy command for the current list.
///
/// With `notes_url` the data URL is printed instead of touching the clipboard.
pub fn execute_copy<S: DurableStore>(
    ctx: &CommandContext,
    repo: &ListRepository<S>,
    clipboard: &impl Clipboard,
    opts: &CopyOptions,
) -> Result<()> {
    let items = repo.working_list();

    if opts.notes_url {
        let url = share::notes_data_url(items);
        if ctx.json_output {
            let output = serde_json::json!({ "url": url });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{url}");
        }
        return Ok(());
    }

    let notice = share::copy_list(clipboard, items, opts.style.into());
    if notice.level == NoticeLevel::Error {
        return Err(CommandError::Clipboard(notice.message));
    }

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "copied",
            "items": items.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output::print_notice(ctx, &notice);
    }
    Ok(())
}
