//! The versioned list of assets needed offline.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FetchError;

/// Name of the current cache generation. Bump the suffix when the asset set changes.
pub const CACHE_NAME: &str = "grocery-list-cache-v1";

/// Assets required for the app to start offline.
pub const DEFAULT_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/script.js",
    "https://cdn.tailwindcss.com",
    "https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap",
];

/// A cache generation name and the URLs it must hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub cache_name: String,
    pub urls: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            urls: DEFAULT_ASSETS.iter().map(|u| u.to_string()).collect(),
        }
    }
}

impl Manifest {
    pub fn new(cache_name: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            cache_name: cache_name.into(),
            urls,
        }
    }

    /// Resolves every manifest URL against `origin`.
    pub fn resolve(&self, origin: &Url) -> Result<Vec<Url>, FetchError> {
        self.urls.iter().map(|u| resolve_url(origin, u)).collect()
    }
}

/// Resolves a possibly relative URL against the app origin.
pub fn resolve_url(origin: &Url, url: &str) -> Result<Url, FetchError> {
    origin.join(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Returns true if `url` has the same scheme, host and port as `origin`.
pub fn same_origin(origin: &Url, url: &Url) -> bool {
    origin.origin() == url.origin()
}
