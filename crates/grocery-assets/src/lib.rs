//! Offline asset cache for the grocery list app.
//!
//! A fixed, versioned [`Manifest`] of static assets is kept in exactly one named cache
//! generation. [`AssetWorker`] drives the three lifecycle phases:
//!
//! - **install** - fetch every manifest URL and store them together; any failure fails
//!   the install
//! - **fetch** - answer from cache, else go to the network and keep successful
//!   same-origin copies
//! - **activate** - delete every cache generation except the current one
//!
//! Storage and network access are capabilities ([`CacheStorage`], [`Fetcher`]) so the
//! lifecycle can run against in-memory fakes.
//!
//! # Example
//!
//! ```no_run
//! use grocery_assets_rs::{AssetWorker, DiskCacheStorage, HttpFetcher, Manifest};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let origin = Url::parse("https://groceries.example.com/")?;
//!     let storage = DiskCacheStorage::new()?;
//!     let fetcher = HttpFetcher::new(origin.clone());
//!     let mut worker = AssetWorker::new(storage, fetcher, Manifest::default(), origin);
//!
//!     worker.install().await?;
//!     worker.activate()?;
//!     let asset = worker.fetch("/index.html").await?;
//!     println!("{} bytes from {:?}", asset.response.body.len(), asset.source);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fetcher;
pub mod manifest;
pub mod probe;
pub mod response;
pub mod retry;
pub mod storage;
pub mod worker;

pub use error::{CacheStorageError, FetchError, InstallError, LifecycleError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use manifest::{Manifest, CACHE_NAME, DEFAULT_ASSETS};
pub use probe::TcpProbe;
pub use response::{AssetResponse, ResponseKind};
pub use retry::RetryConfig;
pub use storage::{CacheStorage, DiskCacheStorage, MemoryCacheStorage};
pub use worker::{
    ActivateReport, AssetWorker, FetchSource, FetchedAsset, InstallReport, WorkerPhase,
};
