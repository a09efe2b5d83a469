//! Error types for the asset cache.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::worker::WorkerPhase;

/// Errors from a [`CacheStorage`](crate::CacheStorage) backend.
#[derive(Debug, Error)]
pub enum CacheStorageError {
    /// Failed to determine the XDG cache directory.
    #[error("failed to determine cache directory: no valid home directory found")]
    NoCacheDir,

    /// Cache generation name cannot be used as a directory name.
    #[error("invalid cache name '{0}'")]
    InvalidName(String),

    /// I/O error while reading.
    #[error("failed to read cache entry '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error while writing.
    #[error("failed to write cache entry '{path}': {source}")]
    WriteError {
        /// The path that failed to write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error while deleting a cache generation.
    #[error("failed to delete cache '{path}': {source}")]
    DeleteError {
        /// The directory that failed to delete.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Metadata serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors while fetching an asset.
///
/// A network failure with no cached copy is reported as-is; there is no synthetic
/// offline response.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or resolved against the origin.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Connection, DNS, TLS or body read failure.
    #[error("network error fetching '{url}': {message}")]
    Network { url: String, message: String },

    /// Looking up the cache failed.
    #[error("cache error: {0}")]
    Storage(#[from] CacheStorageError),
}

impl FetchError {
    /// Returns true if retrying may help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network { .. })
    }
}

/// Errors that fail an install.
#[derive(Debug, Error)]
pub enum InstallError {
    /// A required asset could not be fetched.
    #[error("failed to fetch required asset: {0}")]
    Fetch(#[from] FetchError),

    /// A required asset answered with a non-success status.
    #[error("required asset '{url}' returned HTTP {status}")]
    BadStatus { url: String, status: u16 },

    /// Writing the cache generation failed.
    #[error("cache error: {0}")]
    Storage(#[from] CacheStorageError),
}

impl InstallError {
    /// Returns true if the platform should try the install again.
    pub fn is_retryable(&self) -> bool {
        match self {
            InstallError::Fetch(e) => e.is_retryable(),
            InstallError::BadStatus { status, .. } => *status == 429 || *status >= 500,
            InstallError::Storage(_) => false,
        }
    }
}

/// Lifecycle misuse or storage failure during activation.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// `activate` was called before a successful install.
    #[error("cannot activate: worker is {phase}, expected installed")]
    NotInstalled { phase: WorkerPhase },

    /// Enumerating or deleting caches failed.
    #[error("cache error: {0}")]
    Storage(#[from] CacheStorageError),
}
