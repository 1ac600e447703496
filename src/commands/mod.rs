pub mod clear;
pub mod config;
pub mod notify;
pub mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use next_meeting_core::{
    CachePayload, Config, EventSource, Meeting, Status, TimeWindow, compute_status,
    filter_accepted,
};

/// Result of looking up the current status
#[derive(Debug)]
pub enum Lookup {
    Found(Status),
    /// The calendar couldn't be reached and there was no usable snapshot
    Offline,
}

#[derive(Debug, Clone, Copy)]
pub struct LookupOptions {
    /// Try the snapshot before fetching
    pub use_cache: bool,
    pub only_accepted: bool,
}

impl LookupOptions {
    pub fn new(config: &Config, all: bool) -> Self {
        LookupOptions {
            use_cache: true,
            only_accepted: config.only_accepted && !all,
        }
    }
}

/// Status at `now`, from a fresh snapshot if there is one, otherwise from
/// the source built by `make_source`.
///
/// The source is only built on a cache miss, so a warm cache works without
/// credentials. Failing to write the snapshot is only a warning.
pub async fn lookup_status<S, F>(
    config: &Config,
    options: LookupOptions,
    make_source: F,
    now: DateTime<Utc>,
) -> Result<Lookup>
where
    S: EventSource,
    F: FnOnce() -> Result<S>,
{
    let cache = config.snapshot_cache();

    if options.use_cache {
        if let Some(payload) = cache.read(now) {
            return Ok(Lookup::Found(status_from(payload, options.only_accepted, now)));
        }
    }

    let source = make_source()?;
    let window = TimeWindow::from_config(config, now);

    let meetings = match source.fetch_events(&window).await {
        Ok(meetings) => meetings,
        Err(e) if e.is_network() => {
            tracing::info!("Calendar unreachable: {}", e);
            return Ok(Lookup::Offline);
        }
        Err(e) => return Err(e).context("Failed to get meeting status"),
    };

    let payload = CachePayload::Events(meetings.into_iter().map(Arc::new).collect());
    if let Err(e) = cache.write(&payload, now) {
        tracing::warn!("Failed to cache results: {}", e);
    }

    Ok(Lookup::Found(status_from(payload, options.only_accepted, now)))
}

fn status_from(payload: CachePayload, only_accepted: bool, now: DateTime<Utc>) -> Status {
    match payload {
        CachePayload::Events(meetings) => {
            let meetings: Vec<Arc<Meeting>> = if only_accepted {
                filter_accepted(&meetings)
            } else {
                meetings
            };
            compute_status(&meetings, now)
        }
        CachePayload::Status(status) => status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use next_meeting_core::{FetchError, ResponseStatus};
    use std::cell::Cell;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 9, 14, 30, 0).unwrap()
    }

    fn test_config(dir: &TempDir) -> Config {
        Config {
            cache_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        }
    }

    fn meeting(summary: &str, start_min: i64, end_min: i64, status: ResponseStatus) -> Meeting {
        Meeting::new(
            summary,
            now() + Duration::minutes(start_min),
            now() + Duration::minutes(end_min),
        )
        .with_response(status)
    }

    enum FakeSource {
        Events(Vec<Meeting>),
        Offline,
        Broken,
    }

    impl EventSource for FakeSource {
        async fn fetch_events(&self, _window: &TimeWindow) -> Result<Vec<Meeting>, FetchError> {
            match self {
                FakeSource::Events(meetings) => Ok(meetings.clone()),
                FakeSource::Offline => Err(FetchError::Network("connection refused".into())),
                FakeSource::Broken => Err(FetchError::Api("500 Internal Server Error".into())),
            }
        }
    }

    fn summaries(lookup: &Lookup) -> (Option<String>, Option<String>) {
        match lookup {
            Lookup::Found(status) => (
                status.current.as_ref().map(|m| m.summary.clone()),
                status.next.as_ref().map(|m| m.summary.clone()),
            ),
            Lookup::Offline => panic!("unexpected offline"),
        }
    }

    #[tokio::test]
    async fn test_fetches_then_reuses_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let options = LookupOptions::new(&config, false);
        let fetches = Cell::new(0);

        let make_source = || {
            fetches.set(fetches.get() + 1);
            Ok(FakeSource::Events(vec![
                meeting("A", -30, 30, ResponseStatus::Accepted),
                meeting("B", 60, 120, ResponseStatus::Accepted),
            ]))
        };
        let first = lookup_status(&config, options, make_source, now()).await.unwrap();
        assert_eq!(summaries(&first), (Some("A".into()), Some("B".into())));
        assert_eq!(fetches.get(), 1);

        // Half an hour later the snapshot is still fresh, and status is
        // recomputed against the new time: A has ended.
        let later = now() + Duration::minutes(30);
        let make_source = || -> Result<FakeSource> {
            fetches.set(fetches.get() + 1);
            anyhow::bail!("should not fetch on a cache hit")
        };
        let second = lookup_status(&config, options, make_source, later).await.unwrap();
        assert_eq!(summaries(&second), (None, Some("B".into())));
        assert_eq!(fetches.get(), 1);
    }

    #[tokio::test]
    async fn test_filters_declined_meetings() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let source = FakeSource::Events(vec![
            meeting("Declined Now", -10, 20, ResponseStatus::Declined),
            meeting("Accepted Now", -30, 30, ResponseStatus::Accepted),
            meeting("Unanswered Next", 30, 60, ResponseStatus::NeedsAction),
            meeting("Tentative Next", 60, 90, ResponseStatus::Tentative),
        ]);

        let lookup = lookup_status(&config, LookupOptions::new(&config, false), || Ok(source), now())
            .await
            .unwrap();
        assert_eq!(
            summaries(&lookup),
            (Some("Accepted Now".into()), Some("Tentative Next".into()))
        );

        // --all reads the same snapshot without filtering
        let lookup = lookup_status(
            &config,
            LookupOptions::new(&config, true),
            || -> Result<FakeSource> { anyhow::bail!("should not fetch") },
            now(),
        )
        .await
        .unwrap();
        assert_eq!(
            summaries(&lookup),
            (Some("Declined Now".into()), Some("Unanswered Next".into()))
        );
    }

    #[tokio::test]
    async fn test_no_cache_refetches() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let options = LookupOptions::new(&config, false);

        let old = FakeSource::Events(vec![meeting("Old", 60, 120, ResponseStatus::Accepted)]);
        lookup_status(&config, options, || Ok(old), now()).await.unwrap();

        let fresh = FakeSource::Events(vec![meeting("Fresh", 60, 120, ResponseStatus::Accepted)]);
        let options = LookupOptions {
            use_cache: false,
            ..options
        };
        let lookup = lookup_status(&config, options, || Ok(fresh), now()).await.unwrap();
        assert_eq!(summaries(&lookup), (None, Some("Fresh".into())));
    }

    #[tokio::test]
    async fn test_network_error_is_offline_and_not_cached() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let lookup = lookup_status(
            &config,
            LookupOptions::new(&config, false),
            || Ok(FakeSource::Offline),
            now(),
        )
        .await
        .unwrap();

        assert!(matches!(lookup, Lookup::Offline));
        assert!(!config.snapshot_cache().path().exists());
    }

    #[tokio::test]
    async fn test_api_error_fails() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let result = lookup_status(
            &config,
            LookupOptions::new(&config, false),
            || Ok(FakeSource::Broken),
            now(),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unwritable_cache_still_returns_status() {
        let dir = TempDir::new().unwrap();
        // A file where the cache directory should be makes writes fail
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "").unwrap();
        let config = Config {
            cache_dir: Some(blocker),
            ..Config::default()
        };
        let source = FakeSource::Events(vec![meeting("A", -30, 30, ResponseStatus::Accepted)]);

        let lookup = lookup_status(&config, LookupOptions::new(&config, false), || Ok(source), now())
            .await
            .unwrap();

        assert_eq!(summaries(&lookup), (Some("A".into()), None));
    }

    #[test]
    fn test_status_snapshot_is_used_as_is() {
        let current = Arc::new(meeting("Declined", -10, 10, ResponseStatus::Declined));
        let status = Status {
            current: Some(current),
            next: None,
        };

        let result = status_from(CachePayload::Status(status.clone()), true, now());

        assert_eq!(result, status);
    }
}
