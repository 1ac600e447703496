//! Remember which meetings already produced a notification.
//!
//! Each notified meeting gets one small file in the store directory, named
//! by its fingerprint. The file's existence is what matters; its content
//! (summary and write time) is there for debugging and retention.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreResult;
use crate::event::{Meeting, Status};
use crate::snapshot::write_private;

/// Records older than this are removed by `cleanup`
pub const DEFAULT_RETENTION_HOURS: i64 = 24;

/// Bytes of the SHA-256 digest kept in a fingerprint
const FINGERPRINT_BYTES: usize = 8;

/// Stable identity of a meeting occurrence, derived from summary, start and end.
///
/// Returns 16 lowercase hex characters.
pub fn fingerprint(meeting: &Meeting) -> String {
    let mut hasher = Sha256::new();
    hasher.update(meeting.summary.as_bytes());
    hasher.update(b"|");
    hasher.update(meeting.start.to_rfc3339().as_bytes());
    hasher.update(b"|");
    hasher.update(meeting.end.to_rfc3339().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[derive(Debug, Serialize, Deserialize)]
struct NotificationRecord {
    summary: String,
    notified_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NotificationStore {
    dir: PathBuf,
}

impl NotificationStore {
    pub fn new(dir: PathBuf) -> Self {
        NotificationStore { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, meeting: &Meeting) -> PathBuf {
        self.dir.join(fingerprint(meeting))
    }

    pub fn has_been_notified(&self, meeting: &Meeting) -> bool {
        self.record_path(meeting).exists()
    }

    /// Record that `meeting` was notified at `now`. Calling it twice is harmless.
    pub fn mark_notified(&self, meeting: &Meeting, now: DateTime<Utc>) -> CoreResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let record = NotificationRecord {
            summary: meeting.summary.clone(),
            notified_at: now,
        };
        let data = serde_json::to_vec(&record)?;
        write_private(&self.record_path(meeting), &data)?;

        Ok(())
    }

    /// The next meeting, if it starts within `threshold` of `now` and hasn't
    /// been notified yet.
    pub fn should_notify(
        &self,
        status: &Status,
        threshold: Duration,
        now: DateTime<Utc>,
    ) -> Option<Arc<Meeting>> {
        let next = status.next.as_ref()?;

        let starts_in = next.start - now;
        if starts_in <= Duration::zero() || starts_in > threshold {
            return None;
        }

        if self.has_been_notified(next) {
            tracing::debug!(summary = %next.summary, "Already notified");
            return None;
        }

        Some(Arc::clone(next))
    }

    /// Remove records written more than `retention` before `now`.
    ///
    /// Best effort: unreadable entries and failed deletions are skipped.
    /// Returns how many records were removed.
    pub fn cleanup(&self, retention: Duration, now: DateTime<Utc>) -> usize {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return 0;
        };

        let cutoff = now - retention;
        let mut removed = 0;

        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            let Some(written_at) = record_written_at(&path) else {
                continue;
            };

            if written_at < cutoff && std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::debug!(removed, "Cleaned up old notification records");
        }
        removed
    }

    /// Forget every notification. A missing store directory is fine.
    pub fn clear(&self) -> CoreResult<()> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// When a record was written: the stored timestamp, or the file's
/// modification time if the content can't be parsed.
fn record_written_at(path: &Path) -> Option<DateTime<Utc>> {
    let record = std::fs::read(path)
        .ok()
        .and_then(|data| serde_json::from_slice::<NotificationRecord>(&data).ok());
    if let Some(record) = record {
        return Some(record.notified_at);
    }

    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}
