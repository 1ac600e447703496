//! One-line rendering of a meeting status.

use chrono::{DateTime, Duration, Utc};
use next_meeting_core::{Meeting, Status};

pub const NO_MEETINGS: &str = "📭 No meetings";
pub const OFFLINE: &str = "📡 Calendar Offline";

const SEPARATOR: &str = " │ ";

/// "1h 5m", "42m", or "overdue" for negative durations
pub fn format_duration(d: Duration) -> String {
    if d < Duration::zero() {
        return "overdue".to_string();
    }

    let hours = d.num_hours();
    let minutes = d.num_minutes() % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// e.g. "🔴 Standup (12m left) │ 🕐 Planning in 1h 5m"
pub fn status_line(status: &Status, now: DateTime<Utc>) -> String {
    let mut parts = Vec::new();

    if let Some(current) = &status.current {
        let remaining = current.end - now;
        if remaining < Duration::minutes(1) {
            parts.push(format!("🔴 {} finishing now", current.summary));
        } else {
            parts.push(format!("🔴 {} ({} left)", current.summary, format_duration(remaining)));
        }
    }

    if let Some(next) = &status.next {
        let starts_in = next.start - now;
        if starts_in < Duration::minutes(1) {
            parts.push(format!("🕐 {} starting now", next.summary));
        } else {
            parts.push(format!("🕐 {} in {}", next.summary, format_duration(starts_in)));
        }
    }

    if parts.is_empty() {
        NO_MEETINGS.to_string()
    } else {
        parts.join(SEPARATOR)
    }
}

/// Title and body for an upcoming-meeting notification
pub fn notification_text(meeting: &Meeting, now: DateTime<Utc>) -> (String, String) {
    let starts_in = meeting.start - now;
    let body = if starts_in < Duration::minutes(1) {
        "Upcoming meeting starting now".to_string()
    } else {
        format!("Upcoming meeting in {}", format_duration(starts_in))
    };

    (meeting.to_string(), body)
}
