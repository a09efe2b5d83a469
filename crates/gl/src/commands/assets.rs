//! Offline asset cache commands: status, install, activate, fetch.

use std::path::PathBuf;

use grocery_assets_rs::{
    AssetWorker, CacheStorage, DiskCacheStorage, Fetcher, HttpFetcher, Manifest, RetryConfig,
    WorkerPhase,
};
use serde::Serialize;

use super::config::Config;
use super::{CommandContext, CommandError, Result};

/// Options for the fetch subcommand.
#[derive(Debug)]
pub struct FetchOptions {
    pub url: String,
    pub output: Option<PathBuf>,
}

/// Builds the worker from config, picking up whatever is already cached.
pub fn open_worker(config: &Config) -> Result<AssetWorker<DiskCacheStorage, HttpFetcher>> {
    let origin = config.assets_origin()?.ok_or_else(|| {
        CommandError::Config(
            "No asset origin configured. Run `gl config set assets.origin <url>`.".to_string(),
        )
    })?;
    let storage = match config.assets.cache_dir.clone() {
        Some(dir) => DiskCacheStorage::with_root(dir),
        None => DiskCacheStorage::new()?,
    };
    let fetcher = HttpFetcher::new(origin.clone());
    Ok(AssetWorker::restore(storage, fetcher, Manifest::default(), origin)?)
}

/// JSON output for the status subcommand.
#[derive(Serialize)]
struct AssetsStatus<'a> {
    origin: &'a str,
    cache_name: &'a str,
    phase: WorkerPhase,
    caches: Vec<String>,
    cached: Vec<String>,
}

/// Executes `assets status`.
pub fn execute_status<C: CacheStorage, F: Fetcher>(
    ctx: &CommandContext,
    worker: &AssetWorker<C, F>,
) -> Result<()> {
    let status = AssetsStatus {
        origin: worker.origin().as_str(),
        cache_name: &worker.manifest().cache_name,
        phase: worker.phase(),
        caches: worker.storage().keys()?,
        cached: worker.cached_urls()?,
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }

    println!("Origin:   {}", status.origin);
    println!("Cache:    {} ({})", status.cache_name, status.phase);
    println!("Assets:   {}/{}", status.cached.len(), worker.manifest().urls.len());
    let stale: Vec<&str> = status
        .caches
        .iter()
        .filter(|name| *name != status.cache_name)
        .map(String::as_str)
        .collect();
    if !stale.is_empty() {
        println!("Stale:    {} (run `gl assets activate`)", stale.join(", "));
    }
    if ctx.verbose {
        for url in &status.cached {
            println!("  {url}");
        }
    }
    Ok(())
}

/// Executes `assets install`.
pub async fn execute_install<C: CacheStorage, F: Fetcher>(
    ctx: &CommandContext,
    worker: &mut AssetWorker<C, F>,
    retry: bool,
) -> Result<()> {
    if ctx.verbose {
        eprintln!(
            "Installing {} assets into {}...",
            worker.manifest().urls.len(),
            worker.manifest().cache_name
        );
    }

    let report = if retry {
        worker.install_with_retry(&RetryConfig::default()).await?
    } else {
        worker.install().await?
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !ctx.quiet {
        println!("Installed {} assets into {}", report.urls.len(), report.cache_name);
    }
    Ok(())
}

/// Executes `assets activate`.
pub fn execute_activate<C: CacheStorage, F: Fetcher>(
    ctx: &CommandContext,
    worker: &mut AssetWorker<C, F>,
) -> Result<()> {
    let report = worker.activate()?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !ctx.quiet {
        if report.deleted.is_empty() {
            println!("{} is active; nothing to clean up", report.kept);
        } else {
            println!(
                "{} is active; deleted {}",
                report.kept,
                report.deleted.join(", ")
            );
        }
    }
    Ok(())
}

/// Executes `assets fetch`.
///
/// The body goes to `--output` if given, otherwise to stdout unless `--json` is set.
pub async fn execute_fetch<C: CacheStorage, F: Fetcher>(
    ctx: &CommandContext,
    worker: &AssetWorker<C, F>,
    opts: &FetchOptions,
) -> Result<()> {
    let asset = worker.fetch(&opts.url).await?;

    if let Some(ref path) = opts.output {
        tokio::fs::write(path, &asset.response.body).await?;
    }

    if ctx.json_output {
        let output = serde_json::json!({
            "url": asset.response.url,
            "status": asset.response.status,
            "kind": asset.response.kind,
            "content_type": asset.response.content_type,
            "bytes": asset.response.body.len(),
            "source": asset.source,
            "stored": asset.stored,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if opts.output.is_none() {
        use std::io::Write;
        std::io::stdout().write_all(&asset.response.body)?;
    } else if ctx.verbose {
        eprintln!(
            "{} {} ({} bytes, {:?})",
            asset.response.status,
            asset.response.url,
            asset.response.body.len(),
            asset.source
        );
    }
    Ok(())
}
