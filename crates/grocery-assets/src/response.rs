//! Fetched asset responses.

use serde::{Deserialize, Serialize};

/// Response type, as the fetch standard classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response.
    Basic,
    /// Cross-origin response with readable status and body.
    Cors,
    /// Cross-origin response whose status and body are hidden.
    Opaque,
}

/// A response held in memory or in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetResponse {
    /// Final URL the response came from.
    pub url: String,

    /// HTTP status code. Opaque responses report 0.
    pub status: u16,

    pub kind: ResponseKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Body bytes. Stored separately from the metadata on disk.
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl AssetResponse {
    /// Returns true for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the fetch handler may keep a copy: status 200 and same-origin.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }
}
