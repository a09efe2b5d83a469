//! Command implementations for the gl CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod assets;
pub mod completions;
pub mod config;
pub mod items;
pub mod lists;
pub mod share;
pub mod status;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use grocery_assets_rs::TcpProbe;
use grocery_store_rs::{
    ConnectivityProbe, FileStore, ListRepository, StaticProbe, SyncController, Transition,
};
use url::Url;

use crate::cli::Cli;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Rejected list operation.
    #[error("{0}")]
    List(#[from] grocery_store_rs::ListError),

    /// Durable storage could not be set up.
    #[error("storage error: {0}")]
    Store(#[from] grocery_store_rs::StoreError),

    /// Asset install failed.
    #[error("install failed: {0}")]
    Install(#[from] grocery_assets_rs::InstallError),

    /// Asset fetch failed.
    #[error("fetch failed: {0}")]
    Fetch(#[from] grocery_assets_rs::FetchError),

    /// Asset worker used out of order.
    #[error("{0}")]
    Lifecycle(#[from] grocery_assets_rs::LifecycleError),

    /// Asset cache storage error.
    #[error("cache error: {0}")]
    CacheStorage(#[from] grocery_assets_rs::CacheStorageError),

    /// Clipboard or share target failure.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// Arguments that clap accepts but that make no sense together.
    #[error("{0}")]
    InvalidArgs(String),

    /// A destructive command needs confirmation that could not be asked for.
    #[error("refusing to {0} without confirmation; pass --force")]
    ConfirmationRequired(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Whether to treat the network as unavailable.
    pub offline: bool,
    /// Data directory override from the command line.
    pub data_dir: Option<PathBuf>,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color,
            quiet: cli.quiet,
            verbose: cli.verbose,
            offline: cli.offline,
            data_dir: cli.data_dir.clone(),
        }
    }

    /// Applies config file preferences that flags did not override.
    pub fn apply_config(&mut self, config: &Config) {
        if config.output.color == Some(false) || std::env::var_os("NO_COLOR").is_some() {
            self.use_colors = false;
        }
    }

    /// True when human-readable output should be printed.
    pub fn human(&self) -> bool {
        !self.json_output && !self.quiet
    }
}

/// How the CLI decides whether it is online.
#[derive(Debug)]
pub enum Probe {
    /// `--offline`, or no origin configured to probe.
    Fixed(StaticProbe),
    /// TCP reachability of the configured asset origin.
    Origin(TcpProbe),
}

impl ConnectivityProbe for Probe {
    fn is_online(&self) -> bool {
        match self {
            Probe::Fixed(probe) => probe.is_online(),
            Probe::Origin(probe) => probe.is_online(),
        }
    }
}

impl Probe {
    /// Picks a probe from the flags and config.
    pub fn select(ctx: &CommandContext, config: &Config) -> Result<Self> {
        if ctx.offline {
            return Ok(Probe::Fixed(StaticProbe::new(false)));
        }
        match config.assets_origin()? {
            Some(origin) => Ok(TcpProbe::for_origin(&origin)
                .map(Probe::Origin)
                .unwrap_or_else(|| Probe::Fixed(StaticProbe::new(true)))),
            None => Ok(Probe::Fixed(StaticProbe::new(true))),
        }
    }
}

/// An opened repository with connectivity already checked.
pub struct Session {
    pub repo: ListRepository<FileStore>,
    pub sync: SyncController<Probe>,
    /// What the startup poll observed.
    pub transition: Transition,
}

impl Session {
    /// Opens the repository and polls connectivity once.
    ///
    /// Starts from the state the previous run persisted, so a run that comes back
    /// online reconciles what earlier offline runs staged.
    pub fn open(ctx: &CommandContext, config: &Config) -> Result<Self> {
        let store = match ctx.data_dir.clone().or_else(|| config.storage.data_dir.clone()) {
            Some(dir) => FileStore::with_dir(dir),
            None => FileStore::new()?,
        };
        if ctx.verbose {
            eprintln!("Using data directory {}", store.dir().display());
        }

        let mut repo = ListRepository::open(store);
        let last_known = SyncController::<Probe>::last_known(&repo);
        let mut sync = SyncController::resume(Probe::select(ctx, config)?, last_known)
            .with_policy(config.merge_policy()?);
        let transition = sync.poll(&mut repo);
        tracing::debug!(state = %sync.state(), ?transition, "session opened");

        Ok(Self {
            repo,
            sync,
            transition,
        })
    }
}

/// Asks before a destructive action.
///
/// Returns `Ok(false)` if the user declines. Without a terminal the action is refused
/// unless `force` is set.
pub fn confirm(action: &str, prompt: &str, force: bool) -> Result<bool> {
    if force {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CommandError::ConfirmationRequired(action.to_string()));
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| CommandError::Io(io::Error::other(e.to_string())))
}

/// Converts a 1-based position from the command line to an index.
pub fn index_of(position: u32) -> usize {
    (position as usize).saturating_sub(1)
}

/// Parses an origin URL from config.
pub fn parse_origin(origin: &str) -> Result<Url> {
    Url::parse(origin)
        .map_err(|e| CommandError::Config(format!("Invalid assets.origin '{origin}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(offline: bool) -> CommandContext {
        CommandContext {
            json_output: false,
            use_colors: false,
            quiet: true,
            verbose: false,
            offline,
            data_dir: None,
        }
    }

    #[test]
    fn test_index_of_is_zero_based() {
        assert_eq!(index_of(1), 0);
        assert_eq!(index_of(7), 6);
    }

    #[test]
    fn test_offline_flag_forces_offline_probe() {
        let mut config = Config::default();
        config.assets.origin = Some("http://127.0.0.1:1/".into());
        let probe = Probe::select(&ctx(true), &config).unwrap();
        assert!(matches!(probe, Probe::Fixed(_)));
        assert!(!probe.is_online());
    }

    #[test]
    fn test_no_origin_assumes_online() {
        let probe = Probe::select(&ctx(false), &Config::default()).unwrap();
        assert!(probe.is_online());
    }

    #[test]
    fn test_origin_selects_tcp_probe() {
        let mut config = Config::default();
        config.assets.origin = Some("https://groceries.example.com/".into());
        let probe = Probe::select(&ctx(false), &config).unwrap();
        assert!(matches!(probe, Probe::Origin(_)));
    }

    #[test]
    fn test_invalid_origin_is_config_error() {
        let mut config = Config::default();
        config.assets.origin = Some("not a url".into());
        assert!(matches!(
            Probe::select(&ctx(false), &config),
            Err(CommandError::Config(_))
        ));
    }

    #[test]
    fn test_confirm_with_force_skips_prompt() {
        assert!(confirm("clear the list", "Clear?", true).unwrap());
    }

    #[test]
    fn test_session_reconciles_after_offline_run() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut offline = ctx(true);
        offline.data_dir = Some(temp_dir.path().to_path_buf());

        {
            let mut session = Session::open(&offline, &config).unwrap();
            session.repo.add_item("Milk", 2).unwrap();
            session.repo.save_list("Weekly").unwrap();
            assert_eq!(session.repo.staged_names(), vec!["Weekly"]);
        }

        let mut online = ctx(false);
        online.data_dir = Some(temp_dir.path().to_path_buf());
        let session = Session::open(&online, &config).unwrap();

        assert!(matches!(session.transition, Transition::WentOnline(_)));
        assert!(session.repo.staged_names().is_empty());
        assert!(session.repo.canonical_lists().contains_key("Weekly"));
    }
}
