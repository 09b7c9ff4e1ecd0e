//! File-backed result store: one JSON document per cache key.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;

use crate::cache::ResultCache;
use crate::domain::content::ResultSet;
use crate::util::clock::Clock;

use super::atomic::write_atomic;

const SOURCE: &str = "on_this_day::transients";

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    #[serde(with = "time::serde::rfc3339")]
    expires_at: OffsetDateTime,
    value: ResultSet,
}

/// Entries survive restarts; unreadable or expired files count as misses.
///
/// Every write also sweeps expired and corrupt entries, so files for keys
/// that are never read again do not accumulate.
pub struct FileResultCache {
    directory: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileResultCache {
    pub fn new(directory: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory: directory.into(),
            clock,
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Cache keys only contain `[a-z0-9_+-]`; anything else is replaced.
        let file_name: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '+') {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.directory.join(format!("{file_name}.json"))
    }

    fn read_entry(path: &Path) -> Result<StoredEntry, io::Error> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(io::Error::other)
    }

    fn sweep_expired(&self, now: OffsetDateTime) {
        let dir = match fs::read_dir(&self.directory) {
            Ok(dir) => dir,
            Err(err) => {
                warn!(target = SOURCE, directory = %self.directory.display(), error = %err, "Cannot list cache entries");
                return;
            }
        };
        for path in dir.filter_map(Result::ok).map(|entry| entry.path()) {
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match Self::read_entry(&path) {
                Ok(entry) if entry.expires_at > now => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                _ => self.remove(&path),
            }
        }
    }

    fn remove(&self, path: &Path) {
        if let Err(err) = fs::remove_file(path)
            && err.kind() != io::ErrorKind::NotFound
        {
            warn!(target = SOURCE, path = %path.display(), error = %err, "Cannot remove expired entry");
        }
    }
}

impl ResultCache for FileResultCache {
    fn get(&self, key: &str) -> Option<ResultSet> {
        let path = self.entry_path(key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(target = SOURCE, path = %path.display(), error = %err, "Cannot read cache entry");
                return None;
            }
        };

        let entry: StoredEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(target = SOURCE, path = %path.display(), error = %err, "Discarding corrupt cache entry");
                self.remove(&path);
                return None;
            }
        };

        if entry.expires_at <= self.clock.now() {
            self.remove(&path);
            return None;
        }
        Some(entry.value)
    }

    fn set(&self, key: &str, value: ResultSet, ttl: Duration) {
        let path = self.entry_path(key);
        let now = self.clock.now();
        let entry = StoredEntry {
            expires_at: now + ttl,
            value,
        };
        let result = serde_json::to_vec(&entry)
            .map_err(io::Error::other)
            .and_then(|bytes| write_atomic(&path, &bytes));
        if let Err(err) = result {
            warn!(target = SOURCE, path = %path.display(), error = %err, "Cannot write cache entry");
            return;
        }
        self.sweep_expired(now);
    }
}
