//! Status and sync commands.

use grocery_store_rs::{
    ConnectivityProbe, DurableStore, ListRepository, Notice, ReconcileReport, SyncController,
};

use super::{CommandContext, Result};
use crate::output::{self, format_reconcile_report, format_status_json, format_status_table, StatusSummary};

/// Builds the status summary for a repository.
///
/// `reconciled` is what the session's startup poll merged, if anything.
pub fn summarize<S: DurableStore, P: ConnectivityProbe>(
    repo: &ListRepository<S>,
    sync: &SyncController<P>,
    reconciled: Option<ReconcileReport>,
) -> StatusSummary {
    let items = repo.working_list();
    StatusSummary {
        connectivity: sync.state(),
        merge_policy: sync.policy(),
        items: items.len(),
        remaining: items.iter().filter(|i| !i.completed).count(),
        saved_lists: repo.saved_lists().len(),
        pending: repo.staged_names(),
        reconciled,
    }
}

/// Executes the status command.
pub fn execute_status<S: DurableStore, P: ConnectivityProbe>(
    ctx: &CommandContext,
    repo: &ListRepository<S>,
    sync: &SyncController<P>,
    reconciled: Option<ReconcileReport>,
) -> Result<()> {
    let summary = summarize(repo, sync, reconciled);
    if ctx.json_output {
        println!("{}", format_status_json(&summary)?);
    } else if !ctx.quiet {
        print!("{}", format_status_table(&summary, ctx.use_colors));
    }
    Ok(())
}

/// Executes the sync command.
///
/// Handles one sync event. While offline nothing is merged and the staged lists stay
/// pending. Returns the reconciliation report when one ran.
pub fn execute_sync<S: DurableStore, P: ConnectivityProbe>(
    ctx: &CommandContext,
    repo: &mut ListRepository<S>,
    sync: &SyncController<P>,
    tag: &str,
) -> Result<Option<ReconcileReport>> {
    if !sync.is_online() {
        let pending = repo.staged_names();
        if ctx.json_output {
            let output = serde_json::json!({
                "status": "offline",
                "pending": pending,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            output::print_notice(
                ctx,
                &Notice::info(format!(
                    "Still offline. {} list(s) waiting to sync.",
                    pending.len()
                )),
            );
        }
        return Ok(None);
    }

    let report = sync.handle_sync_event(tag, repo);

    match (&report, ctx.json_output) {
        (Some(report), true) => println!("{}", serde_json::to_string_pretty(report)?),
        (None, true) => {
            let output = serde_json::json!({
                "status": "ignored",
                "tag": tag,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        (Some(report), false) => {
            if !ctx.quiet {
                print!("{}", format_reconcile_report(report));
            }
        }
        (None, false) => {
            output::print_notice(ctx, &Notice::info(format!("Ignored unknown sync tag '{tag}'.")));
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocery_store_rs::{Connectivity, MemoryStore, StaticProbe, SYNC_TAG};

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

    fn offline_repo() -> (ListRepository<MemoryStore>, SyncController<StaticProbe>) {
        let mut repo = ListRepository::open(MemoryStore::new());
        let mut sync = SyncController::new(StaticProbe::new(false));
        sync.poll(&mut repo);
        repo.add_item("Milk", 2).unwrap();
        repo.add_item("Eggs", 1).unwrap();
        repo.toggle_item(0, true).unwrap();
        repo.save_list("Weekly").unwrap();
        (repo, sync)
    }

    #[test]
    fn test_summary_counts() {
        let (repo, sync) = offline_repo();

        let summary = summarize(&repo, &sync, None);

        assert_eq!(summary.connectivity, Connectivity::Offline);
        assert_eq!(summary.items, 2);
        assert_eq!(summary.remaining, 1);
        assert_eq!(summary.saved_lists, 1);
        assert_eq!(summary.pending, vec!["Weekly"]);
    }

    #[test]
    fn test_sync_while_offline_keeps_pending() {
        let (mut repo, sync) = offline_repo();

        let report = execute_sync(&quiet(), &mut repo, &sync, SYNC_TAG).unwrap();

        assert!(report.is_none());
        assert_eq!(repo.staged_names(), vec!["Weekly"]);
    }

    #[test]
    fn test_sync_online_reconciles() {
        let (mut repo, _) = offline_repo();
        let online = SyncController::new(StaticProbe::new(true));

        let report = execute_sync(&quiet(), &mut repo, &online, SYNC_TAG)
            .unwrap()
            .unwrap();

        assert_eq!(report.added, vec!["Weekly"]);
        assert!(repo.staged_names().is_empty());
        assert!(repo.canonical_lists().contains_key("Weekly"));
    }

    #[test]
    fn test_sync_ignores_unknown_tag() {
        let (mut repo, _) = offline_repo();
        let online = SyncController::new(StaticProbe::new(true));

        let report = execute_sync(&quiet(), &mut repo, &online, "periodic-refresh").unwrap();

        assert!(report.is_none());
        assert_eq!(repo.staged_names(), vec!["Weekly"]);
    }

    #[test]
    fn test_status_runs() {
        let (repo, sync) = offline_repo();
        execute_status(&quiet(), &repo, &sync, None).unwrap();
    }
}
