//! Where meetings come from.
//!
//! An `EventSource` returns the timed meetings in a window. Sources are
//! expected to expand recurring events and drop all-day ones themselves.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::config::{Config, MAX_HOURS};
use crate::event::Meeting;

/// Failure to fetch events.
///
/// `Network` means we couldn't reach the calendar at all, which callers
/// show as "offline" rather than as an error.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Calendar API error: {0}")]
    Api(String),
}

impl FetchError {
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

/// Half-open range of time to fetch meetings for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn around(now: DateTime<Utc>, behind: Duration, ahead: Duration) -> Self {
        TimeWindow {
            from: now - behind,
            to: now + ahead,
        }
    }

    /// Window configured by `lookbehind_hours` / `lookahead_hours`
    pub fn from_config(config: &Config, now: DateTime<Utc>) -> Self {
        Self::around(
            now,
            Duration::hours(config.lookbehind_hours.clamp(0, MAX_HOURS)),
            Duration::hours(config.lookahead_hours.clamp(0, MAX_HOURS)),
        )
    }
}

#[allow(async_fn_in_trait)]
pub trait EventSource {
    async fn fetch_events(&self, window: &TimeWindow) -> Result<Vec<Meeting>, FetchError>;
}
