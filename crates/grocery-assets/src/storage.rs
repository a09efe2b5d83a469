//! Named cache generations.
//!
//! A [`CacheStorage`] holds any number of named caches, each mapping a URL to a stored
//! [`AssetResponse`]. Lookups by URL search every cache, oldest name first.
//!
//! [`DiskCacheStorage`] lays caches out as directories:
//!
//! ```text
//! <root>/<cache name>/<sha256(url)>.json   metadata
//! <root>/<cache name>/<sha256(url)>.body   response body
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use sha2::{Digest, Sha256};

use crate::error::CacheStorageError;
use crate::response::AssetResponse;

/// Result type for cache storage operations.
pub type Result<T> = std::result::Result<T, CacheStorageError>;

/// Storage for named cache generations.
pub trait CacheStorage {
    /// Names of all caches, sorted.
    fn keys(&self) -> Result<Vec<String>>;

    /// Returns true if a cache with this name exists.
    fn has(&self, name: &str) -> Result<bool> {
        Ok(self.keys()?.iter().any(|k| k == name))
    }

    /// Creates the cache if it does not exist.
    fn open(&self, name: &str) -> Result<()>;

    /// Deletes a cache. Returns true if it existed.
    fn delete(&self, name: &str) -> Result<bool>;

    /// Finds a stored response for `url` in any cache.
    fn match_url(&self, url: &str) -> Result<Option<AssetResponse>>;

    /// Stores `response` for `url` in cache `name`, creating the cache if needed.
    fn put(&self, name: &str, url: &str, response: &AssetResponse) -> Result<()>;

    /// URLs stored in cache `name`, sorted. Empty if the cache does not exist.
    fn urls(&self, name: &str) -> Result<Vec<String>>;

    /// Stores a batch of responses in one cache.
    fn put_all(&self, name: &str, entries: &[(String, AssetResponse)]) -> Result<()> {
        self.open(name)?;
        for (url, response) in entries {
            self.put(name, url, response)?;
        }
        Ok(())
    }
}

impl<C: CacheStorage + ?Sized> CacheStorage for &C {
    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }

    fn has(&self, name: &str) -> Result<bool> {
        (**self).has(name)
    }

    fn open(&self, name: &str) -> Result<()> {
        (**self).open(name)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        (**self).delete(name)
    }

    fn match_url(&self, url: &str) -> Result<Option<AssetResponse>> {
        (**self).match_url(url)
    }

    fn put(&self, name: &str, url: &str, response: &AssetResponse) -> Result<()> {
        (**self).put(name, url, response)
    }

    fn urls(&self, name: &str) -> Result<Vec<String>> {
        (**self).urls(name)
    }

    fn put_all(&self, name: &str, entries: &[(String, AssetResponse)]) -> Result<()> {
        (**self).put_all(name, entries)
    }
}

// ============================================================================
// In-memory storage
// ============================================================================

type CacheMap = BTreeMap<String, BTreeMap<String, AssetResponse>>;

/// Cache storage held in process memory.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: Mutex<CacheMap>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheMap> {
        self.caches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock().keys().cloned().collect())
    }

    fn open(&self, name: &str) -> Result<()> {
        self.lock().entry(name.to_string()).or_default();
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.lock().remove(name).is_some())
    }

    fn match_url(&self, url: &str) -> Result<Option<AssetResponse>> {
        Ok(self
            .lock()
            .values()
            .find_map(|cache| cache.get(url).cloned()))
    }

    fn put(&self, name: &str, url: &str, response: &AssetResponse) -> Result<()> {
        self.lock()
            .entry(name.to_string())
            .or_default()
            .insert(url.to_string(), response.clone());
        Ok(())
    }

    fn urls(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()
            .get(name)
            .map(|cache| cache.keys().cloned().collect())
            .unwrap_or_default())
    }
}

// ============================================================================
// On-disk storage
// ============================================================================

/// Application qualifier (for XDG paths).
const QUALIFIER: &str = "";

/// Application organization (for XDG paths).
const ORGANIZATION: &str = "";

/// Application name (for XDG paths).
const APPLICATION: &str = "gl";

/// Subdirectory of the XDG cache dir holding asset caches.
const ASSETS_DIR: &str = "assets";

/// Cache storage backed by a directory tree.
#[derive(Debug, Clone)]
pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    /// Uses the default XDG location (`~/.cache/gl/assets` on Unix).
    pub fn new() -> Result<Self> {
        Ok(Self {
            root: Self::default_root()?,
        })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_root() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(CacheStorageError::NoCacheDir)?;
        Ok(project_dirs.cache_dir().join(ASSETS_DIR))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(CacheStorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn entry_stem(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    fn read_entry(dir: &Path, url: &str) -> Result<Option<AssetResponse>> {
        let stem = Self::entry_stem(url);
        let meta_path = dir.join(format!("{stem}.json"));
        let meta = match fs::read_to_string(&meta_path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheStorageError::ReadError {
                    path: meta_path,
                    source: e,
                })
            }
        };
        let mut response: AssetResponse = serde_json::from_str(&meta)?;

        let body_path = dir.join(format!("{stem}.body"));
        response.body = fs::read(&body_path).map_err(|e| CacheStorageError::ReadError {
            path: body_path,
            source: e,
        })?;
        Ok(Some(response))
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents).map_err(|e| CacheStorageError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;
    fs::rename(&temp_path, path).map_err(|e| CacheStorageError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

impl CacheStorage for DiskCacheStorage {
    fn keys(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CacheStorageError::ReadError {
                    path: self.root.clone(),
                    source: e,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheStorageError::ReadError {
                path: self.root.clone(),
                source: e,
            })?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn has(&self, name: &str) -> Result<bool> {
        Ok(self.cache_dir(name)?.is_dir())
    }

    fn open(&self, name: &str) -> Result<()> {
        let dir = self.cache_dir(name)?;
        fs::create_dir_all(&dir).map_err(|e| CacheStorageError::WriteError {
            path: dir,
            source: e,
        })
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.cache_dir(name)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheStorageError::DeleteError {
                path: dir,
                source: e,
            }),
        }
    }

    fn match_url(&self, url: &str) -> Result<Option<AssetResponse>> {
        for name in self.keys()? {
            let dir = self.cache_dir(&name)?;
            if let Some(response) = Self::read_entry(&dir, url)? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }

    fn put(&self, name: &str, url: &str, response: &AssetResponse) -> Result<()> {
        self.open(name)?;
        let dir = self.cache_dir(name)?;
        let stem = Self::entry_stem(url);

        // Body first: a metadata file without its body would be a broken hit.
        write_atomic(&dir.join(format!("{stem}.body")), &response.body)?;

        let mut stored = response.clone();
        stored.url = url.to_string();
        let meta = serde_json::to_vec_pretty(&stored)?;
        write_atomic(&dir.join(format!("{stem}.json")), &meta)
    }

    fn urls(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.cache_dir(name)?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CacheStorageError::ReadError {
                    path: dir,
                    source: e,
                })
            }
        };

        let mut urls = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| CacheStorageError::ReadError {
                    path: dir.clone(),
                    source: e,
                })?
                .path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let meta = fs::read_to_string(&path).map_err(|e| CacheStorageError::ReadError {
                path: path.clone(),
                source: e,
            })?;
            let response: AssetResponse = serde_json::from_str(&meta)?;
            urls.push(response.url);
        }
        urls.sort();
        Ok(urls)
    }
}
