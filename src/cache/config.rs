//! Cache configuration.
//!
//! Controls which result store backs lookups, via `on-this-day.toml`.

use std::{num::NonZeroUsize, path::PathBuf};

use serde::Deserialize;

const DEFAULT_CAPACITY: usize = 256;
const DEFAULT_DIRECTORY: &str = "cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Process-local LRU map.
    #[default]
    Memory,
    /// One JSON document per key, shared across runs.
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Store lookups at all.
    pub enabled: bool,
    pub backend: CacheBackend,
    /// Maximum entries kept by the memory backend.
    pub capacity: usize,
    /// Directory used by the file backend.
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::Memory,
            capacity: DEFAULT_CAPACITY,
            directory: PathBuf::from(DEFAULT_DIRECTORY),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            backend: settings.backend,
            capacity: settings.capacity,
            directory: settings.directory.clone(),
        }
    }
}

impl CacheConfig {
    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
