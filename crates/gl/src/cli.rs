//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the gl CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// gl - A grocery list manager that keeps working offline
#[derive(Parser, Debug)]
#[command(name = "gl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Treat the network as unavailable (saves are staged until back online)
    #[arg(long, global = true, env = "GL_OFFLINE")]
    pub offline: bool,

    /// Override the data directory (default: from config or the platform data dir)
    #[arg(long, global = true, env = "GL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add an item to the current list
    #[command(alias = "a")]
    Add {
        /// Item name
        name: String,

        /// How many to buy
        #[arg(short = 'n', long, default_value_t = 1)]
        quantity: u32,
    },

    /// Edit an item of the current list
    #[command(alias = "e")]
    Edit {
        /// Item position as shown by `gl list`
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New quantity
        #[arg(short = 'n', long)]
        quantity: Option<u32>,
    },

    /// Mark item(s) as picked up
    #[command(alias = "c")]
    Check {
        /// Item position(s)
        #[arg(required = true, value_parser = clap::value_parser!(u32).range(1..))]
        positions: Vec<u32>,
    },

    /// Mark item(s) as not picked up
    Uncheck {
        /// Item position(s)
        #[arg(required = true, value_parser = clap::value_parser!(u32).range(1..))]
        positions: Vec<u32>,
    },

    /// Remove an item from the current list
    #[command(alias = "remove")]
    Rm {
        /// Item position
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        position: u32,
    },

    /// Remove every item from the current list
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show the current list
    #[command(alias = "l")]
    List,

    /// Save the current list under a name
    #[command(alias = "s")]
    Save {
        /// List name (an existing list with this name is replaced)
        name: String,
    },

    /// Replace the current list with a saved list
    Load {
        /// Saved list name
        name: String,
    },

    /// Show saved lists
    #[command(alias = "ls")]
    Lists,

    /// Delete a saved list
    Drop {
        /// Saved list name
        name: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Share a saved list (copied to the clipboard)
    Share {
        /// Saved list name
        name: String,
    },

    /// Copy the current list to the clipboard
    Copy {
        /// Line format
        #[arg(short, long, value_enum, default_value_t = CopyStyle::Plain)]
        format: CopyStyle,

        /// Print a data URL for a notes app instead of copying
        #[arg(long)]
        notes_url: bool,
    },

    /// Show connectivity and pending offline saves
    Status,

    /// Check connectivity and reconcile offline saves
    Sync {
        /// Sync event tag to handle
        #[arg(long, default_value = grocery_store_rs::SYNC_TAG)]
        tag: String,
    },

    /// Manage the offline asset cache
    Assets {
        #[command(subcommand)]
        command: Option<AssetsCommands>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Copy formats for the copy command
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyStyle {
    /// `Milk (2)`
    Plain,
    /// `[ ] Milk (2)`
    Checkbox,
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Asset cache subcommands
#[derive(Subcommand, Debug)]
pub enum AssetsCommands {
    /// Show cache generations and the current worker phase (default)
    Status,

    /// Fetch every manifest asset into the current cache generation
    Install {
        /// Retry transient failures with backoff
        #[arg(long)]
        retry: bool,
    },

    /// Delete every cache generation except the current one
    Activate,

    /// Fetch one asset, cache first
    Fetch {
        /// Asset URL, absolute or relative to the origin
        url: String,

        /// Write the body to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Open config in $EDITOR
    Edit,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}
