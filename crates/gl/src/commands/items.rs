//! Working list commands: add, edit, check, uncheck, rm, clear, list.
//!
//! Positions on the command line are 1-based, matching `gl list`.

use grocery_store_rs::{DurableStore, ListError, ListRepository, Notice};

use super::{confirm, index_of, CommandContext, CommandError, Result};
use crate::output::{self, format_item_json, format_items_json, format_items_table};

/// Options for the add command.
#[derive(Debug)]
pub struct AddOptions {
    pub name: String,
    pub quantity: u32,
}

/// Options for the edit command.
#[derive(Debug)]
pub struct EditOptions {
    pub position: u32,
    pub name: Option<String>,
    pub quantity: Option<u32>,
}

/// Options for the check and uncheck commands.
#[derive(Debug)]
pub struct CheckOptions {
    pub positions: Vec<u32>,
    pub completed: bool,
}

/// Options for the clear command.
#[derive(Debug)]
pub struct ClearOptions {
    pub force: bool,
}

/// Executes the add command.
pub fn execute_add<S: DurableStore>(
    ctx: &CommandContext,
    repo: &mut ListRepository<S>,
    opts: &AddOptions,
) -> Result<()> {
    repo.add_item(&opts.name, opts.quantity)?;
    let index = repo.working_list().len() - 1;

    if ctx.json_output {
        println!("{}", format_item_json(index, &repo.working_list()[index])?);
    } else {
        output::print_notice(ctx, &Notice::item_added());
    }
    Ok(())
}

/// Executes the edit command.
///
/// Fields not given keep their current value.
pub fn execute_edit<S: DurableStore>(
    ctx: &CommandContext,
    repo: &mut ListRepository<S>,
    opts: &EditOptions,
) -> Result<()> {
    if opts.name.is_none() && opts.quantity.is_none() {
        return Err(CommandError::InvalidArgs(
            "Nothing to edit. Pass --name and/or --quantity.".to_string(),
        ));
    }

    let index = index_of(opts.position);
    let current = repo.working_list().get(index).cloned();
    let name = opts
        .name
        .clone()
        .or_else(|| current.as_ref().map(|item| item.name.clone()))
        .unwrap_or_default();
    let quantity = opts
        .quantity
        .or_else(|| current.as_ref().map(|item| item.quantity))
        .unwrap_or(1);

    let item = repo.update_item(index, &name, quantity)?;

    if ctx.json_output {
        println!("{}", format_item_json(index, item)?);
    } else {
        output::print_notice(ctx, &Notice::item_updated());
    }
    Ok(())
}

/// Executes the check and uncheck commands.
///
/// Every position is validated before anything changes.
pub fn execute_check<S: DurableStore>(
    ctx: &CommandContext,
    repo: &mut ListRepository<S>,
    opts: &CheckOptions,
) -> Result<()> {
    let len = repo.working_list().len();
    let indices: Vec<usize> = opts.positions.iter().map(|p| index_of(*p)).collect();
    if let Some(&index) = indices.iter().find(|&&i| i >= len) {
        return Err(ListError::IndexOutOfRange { index, len }.into());
    }

    for &index in &indices {
        repo.toggle_item(index, opts.completed)?;
    }

    if ctx.json_output {
        println!("{}", format_items_json(repo.working_list())?);
    } else {
        output::print_notice(ctx, &Notice::item_updated());
    }
    Ok(())
}

/// Executes the rm command.
pub fn execute_remove<S: DurableStore>(
    ctx: &CommandContext,
    repo: &mut ListRepository<S>,
    position: u32,
) -> Result<()> {
    let index = index_of(position);
    let removed = repo.delete_item(index)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "deleted",
            "item": removed,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output::print_notice(ctx, &Notice::item_deleted());
    }
    Ok(())
}

/// Executes the clear command.
pub fn execute_clear<S: DurableStore>(
    ctx: &CommandContext,
    repo: &mut ListRepository<S>,
    opts: &ClearOptions,
) -> Result<()> {
    let count = repo.working_list().len();
    if count > 0 {
        let prompt = format!("Remove all {count} items from the current list?");
        if !confirm("clear the current list", &prompt, opts.force)? {
            if !ctx.quiet {
                eprintln!("Aborted.");
            }
            return Ok(());
        }
    }

    repo.clear_working_list();

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "cleared",
            "removed": count,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        output::print_notice(ctx, &Notice::list_cleared());
    }
    Ok(())
}

/// Executes the list command.
pub fn execute_list<S: DurableStore>(
    ctx: &CommandContext,
    repo: &ListRepository<S>,
) -> Result<()> {
    let items = repo.working_list();
    if ctx.json_output {
        println!("{}", format_items_json(items)?);
    } else if !ctx.quiet {
        print!("{}", format_items_table(items, ctx.use_colors));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocery_store_rs::MemoryStore;

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
    fn test_add_trims_and_appends() {
        let mut repo = repo_with(&["Milk"]);
        let opts = AddOptions {
            name: "  Eggs ".into(),
            quantity: 12,
        };

        execute_add(&quiet(), &mut repo, &opts).unwrap();

        assert_eq!(repo.working_list()[1].name, "Eggs");
        assert_eq!(repo.working_list()[1].quantity, 12);
    }

    #[test]
    fn test_add_rejects_zero_quantity() {
        let mut repo = repo_with(&[]);
        let opts = AddOptions {
            name: "Eggs".into(),
            quantity: 0,
        };

        let err = execute_add(&quiet(), &mut repo, &opts).unwrap_err();

        assert!(matches!(
            err,
            CommandError::List(ListError::InvalidQuantity(0))
        ));
        assert!(repo.working_list().is_empty());
    }

    #[test]
    fn test_edit_keeps_unspecified_fields() {
        let mut repo = repo_with(&["Milk"]);
        repo.toggle_item(0, true).unwrap();
        let opts = EditOptions {
            position: 1,
            name: None,
            quantity: Some(3),
        };

        execute_edit(&quiet(), &mut repo, &opts).unwrap();

        let item = &repo.working_list()[0];
        assert_eq!(item.name, "Milk");
        assert_eq!(item.quantity, 3);
        assert!(item.completed);
    }

    #[test]
    fn test_edit_requires_a_change() {
        let mut repo = repo_with(&["Milk"]);
        let opts = EditOptions {
            position: 1,
            name: None,
            quantity: None,
        };
        assert!(matches!(
            execute_edit(&quiet(), &mut repo, &opts),
            Err(CommandError::InvalidArgs(_))
        ));
    }

    #[test]
    fn test_edit_out_of_range() {
        let mut repo = repo_with(&["Milk"]);
        let opts = EditOptions {
            position: 4,
            name: Some("Bread".into()),
            quantity: None,
        };
        assert!(matches!(
            execute_edit(&quiet(), &mut repo, &opts),
            Err(CommandError::List(ListError::IndexOutOfRange { index: 3, len: 1 }))
        ));
    }

    #[test]
    fn test_check_is_all_or_nothing() {
        let mut repo = repo_with(&["Milk", "Eggs"]);
        let opts = CheckOptions {
            positions: vec![1, 5],
            completed: true,
        };

        assert!(execute_check(&quiet(), &mut repo, &opts).is_err());
        assert!(repo.working_list().iter().all(|i| !i.completed));
    }

    #[test]
    fn test_check_then_uncheck() {
        let mut repo = repo_with(&["Milk", "Eggs", "Bread"]);
        let check = CheckOptions {
            positions: vec![1, 3],
            completed: true,
        };
        execute_check(&quiet(), &mut repo, &check).unwrap();
        let completed: Vec<bool> = repo.working_list().iter().map(|i| i.completed).collect();
        assert_eq!(completed, vec![true, false, true]);

        let uncheck = CheckOptions {
            positions: vec![3],
            completed: false,
        };
        execute_check(&quiet(), &mut repo, &uncheck).unwrap();
        assert!(!repo.working_list()[2].completed);
    }

    #[test]
    fn test_remove_shifts_positions() {
        let mut repo = repo_with(&["Milk", "Eggs", "Bread"]);

        execute_remove(&quiet(), &mut repo, 2).unwrap();

        let names: Vec<&str> = repo.working_list().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Bread"]);
    }

    #[test]
    fn test_clear_with_force() {
        let mut repo = repo_with(&["Milk", "Eggs"]);

        execute_clear(&quiet(), &mut repo, &ClearOptions { force: true }).unwrap();

        assert!(repo.working_list().is_empty());
    }

    #[test]
    fn test_clear_empty_list_needs_no_confirmation() {
        let mut repo = repo_with(&[]);
        execute_clear(&quiet(), &mut repo, &ClearOptions { force: false }).unwrap();
    }
}
