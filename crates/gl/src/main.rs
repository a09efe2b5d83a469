use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::load_config;
use commands::{CommandContext, CommandError};
use dispatch::{ConfiguredCommand, ConfiguredDispatch, NoStoreCommand, NoStoreDispatch};
use grocery_store_rs::Notice;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `GL_LOG=grocery_store_rs=debug`.
const LOG_ENV: &str = "GL_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("{error_json}"),
                }
            } else if let CommandError::List(ref list_error) = e {
                let notice = Notice::from(list_error);
                let ctx = CommandContext::from_cli(&cli);
                eprintln!(
                    "{}",
                    output::helpers::format_notice(&notice, ctx.use_colors)
                );
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Logs go to stderr. `GL_LOG` wins over `--verbose`, which wins over the default.
fn init_tracing(cli: &Cli) {
    let default = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: &Cli) -> commands::Result<()> {
    let mut ctx = CommandContext::from_cli(cli);

    // Config, completions and help never touch storage
    if let Some(dispatch) = NoStoreDispatch::try_from_cli(cli) {
        return dispatch.execute(&ctx);
    }

    let config = load_config()?;
    ctx.apply_config(&config);

    match ConfiguredDispatch::from_cli(cli) {
        Some(dispatch) => dispatch.execute(&ctx, &config).await,
        None => Ok(()),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::List(_) => "LIST_ERROR",
        CommandError::Store(_) => "STORE_ERROR",
        CommandError::Install(_) => "INSTALL_ERROR",
        CommandError::Fetch(_) => "FETCH_ERROR",
        CommandError::Lifecycle(_) => "LIFECYCLE_ERROR",
        CommandError::CacheStorage(_) => "CACHE_ERROR",
        CommandError::Clipboard(_) => "CLIPBOARD_ERROR",
        CommandError::InvalidArgs(_) => "INVALID_ARGS",
        CommandError::ConfirmationRequired(_) => "CONFIRMATION_REQUIRED",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}

fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::List(_) | CommandError::InvalidArgs(_) | CommandError::Json(_) => 1,
        CommandError::Install(_) | CommandError::Fetch(_) => 2,
        CommandError::Io(_) | CommandError::Clipboard(_) => 3,
        CommandError::ConfirmationRequired(_) => 4,
        CommandError::Config(_)
        | CommandError::Store(_)
        | CommandError::CacheStorage(_)
        | CommandError::Lifecycle(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocery_store_rs::ListError;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_code(&CommandError::List(ListError::EmptyList)),
            "LIST_ERROR"
        );
        assert_eq!(
            error_code(&CommandError::ConfirmationRequired("clear".into())),
            "CONFIRMATION_REQUIRED"
        );
        assert_eq!(
            error_code(&CommandError::Config("bad".into())),
            "CONFIG_ERROR"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_status(&CommandError::List(ListError::EmptyListName)), 1);
        assert_eq!(
            exit_status(&CommandError::ConfirmationRequired("clear".into())),
            4
        );
        assert_eq!(exit_status(&CommandError::Config("bad".into())), 5);
    }

    #[test]
    fn test_list_error_message_is_friendly() {
        let notice = Notice::from(&ListError::EmptyItemName);
        assert_eq!(notice.message, "Please enter an item name.");
    }
}
