//! On-disk snapshot of the last fetch.
//!
//! A single JSON file holds `{ saved_at, payload }`. Reads are lazy about
//! expiry: a missing, unparseable, or stale file is a miss, and a miss just
//! means "go fetch". There is no locking; concurrent writers race and the
//! last one wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::event::{Meeting, Status};

const SNAPSHOT_FILE_NAME: &str = "snapshot.json";

/// How long a snapshot stays fresh unless configured otherwise
pub const DEFAULT_FRESHNESS_MINUTES: i64 = 30;

/// What a snapshot holds.
///
/// New snapshots store the fetched events so that status is recomputed
/// against the actual read time. `Status` snapshots are still accepted on
/// read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CachePayload {
    Events(Vec<Arc<Meeting>>),
    Status(Status),
}

#[derive(Debug, Deserialize)]
struct CacheEntry {
    saved_at: DateTime<Utc>,
    payload: CachePayload,
}

#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
    freshness: Duration,
}

impl SnapshotCache {
    /// Snapshot stored as `snapshot.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        SnapshotCache::new(dir.join(SNAPSHOT_FILE_NAME))
    }

    pub fn new(path: PathBuf) -> Self {
        SnapshotCache {
            path,
            freshness: Duration::minutes(DEFAULT_FRESHNESS_MINUTES),
        }
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the snapshot with `payload`, stamped with `now`.
    pub fn write(&self, payload: &CachePayload, now: DateTime<Utc>) -> CoreResult<()> {
        #[derive(Serialize)]
        struct EntryRef<'a> {
            saved_at: DateTime<Utc>,
            payload: &'a CachePayload,
        }

        let data = serde_json::to_vec(&EntryRef {
            saved_at: now,
            payload,
        })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_private(&self.path, &data)?;

        tracing::debug!(path = %self.path.display(), "Wrote snapshot");
        Ok(())
    }

    /// The stored payload, or `None` if there's nothing usable at `now`.
    pub fn read(&self, now: DateTime<Utc>) -> Option<CachePayload> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(_) => {
                tracing::debug!(path = %self.path.display(), "Snapshot miss: no file");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&data) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "Snapshot miss: unreadable");
                return None;
            }
        };

        if now - entry.saved_at > self.freshness {
            tracing::debug!(saved_at = %entry.saved_at, "Snapshot miss: stale");
            return None;
        }

        tracing::debug!(saved_at = %entry.saved_at, "Snapshot hit");
        Some(entry.payload)
    }

    /// Delete the snapshot. Deleting a snapshot that doesn't exist is fine.
    pub fn clear(&self) -> CoreResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write a file readable only by the current user.
pub(crate) fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)
}
