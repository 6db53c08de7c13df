//! Explicit cache of loaded datasets.
//!
//! Loading is deterministic, so a dataset only needs re-parsing when its
//! source file changes. The cache is owned by whoever presents the data; it
//! is never process-global.

use crate::error::{DashboardError, Result};
use crate::loader::{load_with_report, LoadReport};
use crate::types::EnrichedRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Identity of a source file's contents as far as the filesystem can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|e| {
            DashboardError::data_format(format!("cannot open {}: {}", path.display(), e))
        })?;
        Ok(Fingerprint {
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

#[derive(Debug)]
struct CachedDataset {
    fingerprint: Fingerprint,
    records: Vec<EnrichedRecord>,
    report: LoadReport,
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, CachedDataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached records for `path`, loading them first if the file is new to the
    /// cache or changed since it was loaded.
    pub fn get_or_load<P: AsRef<Path>>(&mut self, path: P) -> Result<&[EnrichedRecord]> {
        self.get_or_load_with_report(path).map(|(records, _)| records)
    }

    pub fn get_or_load_with_report<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<(&[EnrichedRecord], &LoadReport)> {
        let key = cache_key(path.as_ref());
        let fingerprint = match Fingerprint::of(&key) {
            Ok(fp) => fp,
            Err(e) => {
                if self.entries.remove(&key).is_some() {
                    debug!(path = %key.display(), "source unreadable, dropped cached dataset");
                }
                return Err(e);
            }
        };

        let fresh = self
            .entries
            .get(&key)
            .map_or(false, |cached| cached.fingerprint == fingerprint);
        if fresh {
            debug!(path = %key.display(), "dataset cache hit");
        } else {
            if self.entries.remove(&key).is_some() {
                debug!(path = %key.display(), "source changed, reloading");
            }
            let (records, report) = load_with_report(&key)?;
            self.entries.insert(
                key.clone(),
                CachedDataset {
                    fingerprint,
                    records,
                    report,
                },
            );
        }

        let cached = &self.entries[&key];
        Ok((&cached.records, &cached.report))
    }

    /// Drop the entry for `path`. Returns whether anything was cached.
    pub fn invalidate<P: AsRef<Path>>(&mut self, path: P) -> bool {
        self.entries.remove(&cache_key(path.as_ref())).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical path of the source. When the file itself is gone, its parent
/// directory is canonicalized instead so the key still matches the entry.
fn cache_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}
