//! Command dispatch module for routing CLI commands to their handlers.
//!
//! Commands that never touch the list store (config, completions, help) run
//! synchronously without loading anything. Everything else gets the loaded config
//! and, for list commands, an opened [`Session`].

use grocery_store_rs::Transition;

use crate::cli::{AssetsCommands, Cli, Commands, ConfigCommands, CopyStyle, Shell};
use crate::commands::config::Config;
use crate::commands::share::SystemClipboard;
use crate::commands::{self, CommandContext, CommandError, Result, Session};
use crate::output;

/// Trait for commands that run without config or storage.
pub trait NoStoreCommand {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Trait for commands that need the loaded config.
#[allow(async_fn_in_trait)]
pub trait ConfiguredCommand {
    async fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()>;
}

/// Commands that don't need config or storage.
pub enum NoStoreDispatch<'a> {
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> NoStoreDispatch<'a> {
    /// Try to create a dispatch from the CLI command.
    /// Returns None if the command needs config or storage.
    pub fn try_from_cli(cli: &'a Cli) -> Option<Self> {
        match &cli.command {
            Some(Commands::Config {
                command: Some(ConfigCommands::Edit),
            }) => None,
            Some(Commands::Config { command }) => Some(Self::Config(command)),
            Some(Commands::Completions { shell }) => Some(Self::Completions(shell)),
            None => Some(Self::Help),
            _ => None,
        }
    }
}

impl NoStoreCommand for NoStoreDispatch<'_> {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("gl - grocery lists that keep working offline");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch the synchronous config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = commands::config::ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            commands::config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
        Some(ConfigCommands::Edit) => Err(CommandError::Config(
            "edit requires async context".into(),
        )),
    }
}

/// Commands that need the loaded config.
pub enum ConfiguredDispatch<'a> {
    ConfigEdit,
    Assets(&'a Option<AssetsCommands>),
    List(ListCommand<'a>),
}

/// Commands that operate on the list store.
pub enum ListCommand<'a> {
    Add { name: &'a str, quantity: u32 },
    Edit {
        position: u32,
        name: &'a Option<String>,
        quantity: Option<u32>,
    },
    Check { positions: &'a [u32], completed: bool },
    Remove { position: u32 },
    Clear { force: bool },
    Show,
    Save { name: &'a str },
    Load { name: &'a str },
    Lists,
    Drop { name: &'a str, force: bool },
    Share { name: &'a str },
    Copy { style: CopyStyle, notes_url: bool },
    Status,
    Sync { tag: &'a str },
}

impl<'a> ConfiguredDispatch<'a> {
    /// Create a dispatch from the CLI command.
    pub fn from_cli(cli: &'a Cli) -> Option<Self> {
        let list = match cli.command.as_ref()? {
            Commands::Config {
                command: Some(ConfigCommands::Edit),
            } => return Some(Self::ConfigEdit),
            Commands::Assets { command } => return Some(Self::Assets(command)),
            Commands::Config { .. } | Commands::Completions { .. } => return None,
            Commands::Add { name, quantity } => ListCommand::Add {
                name,
                quantity: *quantity,
            },
            Commands::Edit {
                position,
                name,
                quantity,
            } => ListCommand::Edit {
                position: *position,
                name,
                quantity: *quantity,
            },
            Commands::Check { positions } => ListCommand::Check {
                positions,
                completed: true,
            },
            Commands::Uncheck { positions } => ListCommand::Check {
                positions,
                completed: false,
            },
            Commands::Rm { position } => ListCommand::Remove {
                position: *position,
            },
            Commands::Clear { force } => ListCommand::Clear { force: *force },
            Commands::List => ListCommand::Show,
            Commands::Save { name } => ListCommand::Save { name },
            Commands::Load { name } => ListCommand::Load { name },
            Commands::Lists => ListCommand::Lists,
            Commands::Drop { name, force } => ListCommand::Drop {
                name,
                force: *force,
            },
            Commands::Share { name } => ListCommand::Share { name },
            Commands::Copy { format, notes_url } => ListCommand::Copy {
                style: *format,
                notes_url: *notes_url,
            },
            Commands::Status => ListCommand::Status,
            Commands::Sync { tag } => ListCommand::Sync { tag },
        };
        Some(Self::List(list))
    }
}

impl ConfiguredCommand for ConfiguredDispatch<'_> {
    async fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()> {
        match self {
            Self::ConfigEdit => commands::config::execute_edit(ctx).await,
            Self::Assets(command) => dispatch_assets(ctx, config, command).await,
            Self::List(command) => {
                let mut session = Session::open(ctx, config)?;
                output::print_transition(ctx, &session.transition);
                dispatch_list(ctx, &mut session, command)
            }
        }
    }
}

/// Dispatch asset cache subcommands.
async fn dispatch_assets(
    ctx: &CommandContext,
    config: &Config,
    command: &Option<AssetsCommands>,
) -> Result<()> {
    let mut worker = commands::assets::open_worker(config)?;
    match command {
        Some(AssetsCommands::Status) | None => commands::assets::execute_status(ctx, &worker),
        Some(AssetsCommands::Install { retry }) => {
            commands::assets::execute_install(ctx, &mut worker, *retry).await
        }
        Some(AssetsCommands::Activate) => commands::assets::execute_activate(ctx, &mut worker),
        Some(AssetsCommands::Fetch { url, output }) => {
            let opts = commands::assets::FetchOptions {
                url: url.clone(),
                output: output.clone(),
            };
            commands::assets::execute_fetch(ctx, &worker, &opts).await
        }
    }
}

/// Dispatch list store commands against an opened session.
fn dispatch_list(ctx: &CommandContext, session: &mut Session, command: &ListCommand) -> Result<()> {
    let repo = &mut session.repo;
    match command {
        ListCommand::Add { name, quantity } => {
            let opts = commands::items::AddOptions {
                name: name.to_string(),
                quantity: *quantity,
            };
            commands::items::execute_add(ctx, repo, &opts)
        }
        ListCommand::Edit {
            position,
            name,
            quantity,
        } => {
            let opts = commands::items::EditOptions {
                position: *position,
                name: (*name).clone(),
                quantity: *quantity,
            };
            commands::items::execute_edit(ctx, repo, &opts)
        }
        ListCommand::Check {
            positions,
            completed,
        } => {
            let opts = commands::items::CheckOptions {
                positions: positions.to_vec(),
                completed: *completed,
            };
            commands::items::execute_check(ctx, repo, &opts)
        }
        ListCommand::Remove { position } => commands::items::execute_remove(ctx, repo, *position),
        ListCommand::Clear { force } => {
            let opts = commands::items::ClearOptions { force: *force };
            commands::items::execute_clear(ctx, repo, &opts)
        }
        ListCommand::Show => commands::items::execute_list(ctx, repo),
        ListCommand::Save { name } => commands::lists::execute_save(ctx, repo, name).map(|_| ()),
        ListCommand::Load { name } => commands::lists::execute_load(ctx, repo, name),
        ListCommand::Lists => commands::lists::execute_lists(ctx, repo),
        ListCommand::Drop { name, force } => {
            let opts = commands::lists::DropOptions {
                name: name.to_string(),
                force: *force,
            };
            commands::lists::execute_drop(ctx, repo, &opts)
        }
        ListCommand::Share { name } => {
            commands::share::execute_share(ctx, repo, &SystemClipboard::detect(), name)
        }
        ListCommand::Copy { style, notes_url } => {
            let opts = commands::share::CopyOptions {
                style: *style,
                notes_url: *notes_url,
            };
            commands::share::execute_copy(ctx, repo, &SystemClipboard::detect(), &opts)
        }
        ListCommand::Status => {
            let reconciled = match &session.transition {
                Transition::WentOnline(report) => Some(report.clone()),
                _ => None,
            };
            commands::status::execute_status(ctx, &session.repo, &session.sync, reconciled)
        }
        ListCommand::Sync { tag } => {
            commands::status::execute_sync(ctx, &mut session.repo, &session.sync, tag).map(|_| ())
        }
    }
}
