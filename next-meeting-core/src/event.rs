//! Meeting and status types.
//!
//! A `Meeting` is one timed calendar event occurrence as handed over by an
//! event source. Meetings are shared as `Arc<Meeting>` so that a `Status`
//! points at the exact same values the caller passed in.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The user's own response to a meeting invitation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    Accepted,
    Declined,
    Tentative,
    NeedsAction,
    /// No response recorded, or a value we don't recognize
    #[default]
    #[serde(rename = "", other)]
    Unknown,
}

impl ResponseStatus {
    /// Parse the response status string used by calendar APIs
    /// ("accepted", "declined", "tentative", "needsAction").
    /// Anything else maps to `Unknown`.
    pub fn from_api_str(s: &str) -> Self {
        match s {
            "accepted" => ResponseStatus::Accepted,
            "declined" => ResponseStatus::Declined,
            "tentative" => ResponseStatus::Tentative,
            "needsAction" => ResponseStatus::NeedsAction,
            _ => ResponseStatus::Unknown,
        }
    }

    /// Whether the user said they'd attend (accepted or tentative)
    pub fn is_attending(&self) -> bool {
        matches!(self, ResponseStatus::Accepted | ResponseStatus::Tentative)
    }
}

/// A single calendar event occurrence.
///
/// `start <= end` is not guaranteed; a meeting with `end < start` is valid
/// input and simply never counts as in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub attendee_count: usize,
    #[serde(default)]
    pub response_status: ResponseStatus,
}

impl Meeting {
    pub fn new(summary: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Meeting {
            summary: summary.into(),
            start,
            end,
            location: None,
            attendee_count: 0,
            response_status: ResponseStatus::Accepted,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_attendees(mut self, count: usize) -> Self {
        self.attendee_count = count;
        self
    }

    pub fn with_response(mut self, status: ResponseStatus) -> Self {
        self.response_status = status;
        self
    }

    /// `end - start`; negative for inverted meetings
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// In progress at `now`, using the half-open interval `[start, end)`
    pub fn is_current_at(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now < self.end
    }

    /// Starts strictly after `now`
    pub fn is_upcoming_at(&self, now: DateTime<Utc>) -> bool {
        now < self.start
    }
}

impl fmt::Display for Meeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.summary.is_empty() {
            write!(f, "(No title)")
        } else {
            write!(f, "{}", self.summary)
        }
    }
}

/// What's happening now and what's coming up.
///
/// Both fields are optional; an empty status means "no meetings".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub current: Option<Arc<Meeting>>,
    pub next: Option<Arc<Meeting>>,
}

impl Status {
    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.next.is_none()
    }
}
