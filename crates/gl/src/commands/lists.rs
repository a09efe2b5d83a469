//! Saved list commands: save, load, lists, drop.

use grocery_store_rs::{DurableStore, ListRepository, Notice, SaveOutcome};

use super::{confirm, CommandContext, Result};
use crate::output::{self, format_items_json, format_items_table, format_lists_json, format_lists_table};

/// Options for the drop command.
#[derive(Debug)]
pub struct DropOptions {
    pub name: String,
    pub force: bool,
}

/// Executes the save command.
///
/// While offline the snapshot is staged and merged on the next sync.
pub fn execute_save<S: DurableStore>(
    ctx: &CommandContext,
    repo: &mut ListRepository<S>,
    name: &str,
) -> Result<SaveOutcome> {
    let outcome = repo.save_list(name)?;
    let name = name.trim();

    if ctx.json_output {
        let status = match outcome {
            SaveOutcome::Saved => "saved",
            SaveOutcome::Staged => "staged",
        };
        let output = serde_json::json!({
            "status": status,
            "name": name,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let notice = match outcome {
            SaveOutcome::Saved => Notice::list_saved(name),
            SaveOutcome::Staged => Notice::list_staged(name),
        };
        output::print_notice(ctx, &notice);
    }
    Ok(outcome)
}

/// Executes the load command.
pub fn execute_load<S: DurableStore>(
    ctx: &CommandContext,
    repo: &mut ListRepository<S>,
    name: &str,
) -> Result<()> {
    let items = repo.load_list(name)?;

    if ctx.json_output {
        println!("{}", format_items_json(items)?);
    } else if ctx.human() {
        let table = format_items_table(items, ctx.use_colors);
        output::print_notice(ctx, &Notice::list_loaded(name.trim()));
        print!("{table}");
    }
    Ok(())
}

/// Executes the lists command.
///
/// Includes lists saved offline, marked as pending.
pub fn execute_lists<S: DurableStore>(ctx: &CommandContext, repo: &ListRepository<S>) -> Result<()> {
    let lists = repo.saved_lists();
    let staged = repo.staged_names();

    if ctx.json_output {
        println!("{}", format_lists_json(&lists, &staged)?);
    } else if !ctx.quiet {
        print!("{}", format_lists_table(&lists, &staged, ctx.use_colors));
    }
    Ok(())
}

/// Executes the drop command.
pub fn execute_drop<S: DurableStore>(
    ctx: &CommandContext,
    repo: &mut ListRepository<S>,
    opts: &DropOptions,
) -> Result<()> {
    let name = opts.name.trim();
    // Surface "not found" before prompting.
    repo.find_list(name)?;

    let prompt = format!("Delete saved list '{name}'?");
    if !confirm("delete a saved list", &prompt, opts.force)? {
        if !ctx.quiet {
            eprintln!("Aborted.");
        }
        return Ok(());
    }

    repo.delete_list(name)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "deleted",
            "name": name,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output::print_notice(ctx, &Notice::list_deleted(name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandError;
    use grocery_store_rs::{ListError, MemoryStore, StaticProbe, SyncController};

    fn quiet() -> CommandContext {
        CommandContext {
            json_output: false,
            use_colors: false,
            quiet: true,
            verbose: false,
            offline: false,
            data_dir: None,
        }
    }

    fn repo_with(names: &[&str]) -> ListRepository<MemoryStore> {
        let mut repo = ListRepository::open(MemoryStore::new());
        for name in names {
            repo.add_item(name, 1).unwrap();
        }
        repo
    }

    #[test]
    fn test_save_online_then_load() {
        let mut repo = repo_with(&["Milk", "Eggs"]);

        let outcome = execute_save(&quiet(), &mut repo, " Weekly ").unwrap();
        assert_eq!(outcome, SaveOutcome::Saved);

        repo.clear_working_list();
        execute_load(&quiet(), &mut repo, "Weekly").unwrap();
        assert_eq!(repo.working_list().len(), 2);
    }

    #[test]
    fn test_save_offline_is_staged() {
        let mut repo = repo_with(&["Milk"]);
        let mut sync = SyncController::new(StaticProbe::new(false));
        sync.poll(&mut repo);

        let outcome = execute_save(&quiet(), &mut repo, "Weekly").unwrap();

        assert_eq!(outcome, SaveOutcome::Staged);
        assert!(repo.canonical_lists().is_empty());
        assert_eq!(repo.staged_names(), vec!["Weekly"]);
    }

    #[test]
    fn test_save_empty_list_fails() {
        let mut repo = repo_with(&[]);
        assert!(matches!(
            execute_save(&quiet(), &mut repo, "Weekly"),
            Err(CommandError::List(ListError::EmptyList))
        ));
    }

    #[test]
    fn test_load_unknown_suggests_name() {
        let mut repo = repo_with(&["Milk"]);
        repo.save_list("Weekly").unwrap();

        let err = execute_load(&quiet(), &mut repo, "Weekyl").unwrap_err();

        assert_eq!(
            err.to_string(),
            "list 'Weekyl' not found. Did you mean 'Weekly'?"
        );
    }

    #[test]
    fn test_drop_with_force() {
        let mut repo = repo_with(&["Milk"]);
        repo.save_list("Weekly").unwrap();
        let opts = DropOptions {
            name: "Weekly".into(),
            force: true,
        };

        execute_drop(&quiet(), &mut repo, &opts).unwrap();

        assert!(repo.saved_lists().is_empty());
    }

    #[test]
    fn test_drop_unknown_fails_before_confirming() {
        let mut repo = repo_with(&["Milk"]);
        let opts = DropOptions {
            name: "Weekly".into(),
            force: false,
        };
        assert!(matches!(
            execute_drop(&quiet(), &mut repo, &opts),
            Err(CommandError::List(ListError::ListNotFound { .. }))
        ));
    }

    #[test]
    fn test_lists_runs_with_staged_entries() {
        let mut repo = repo_with(&["Milk"]);
        let mut sync = SyncController::new(StaticProbe::new(false));
        sync.poll(&mut repo);
        repo.save_list("Weekly").unwrap();

        execute_lists(&quiet(), &repo).unwrap();
        assert!(repo.saved_lists().contains_key("Weekly"));
    }
}
