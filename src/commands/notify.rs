use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use next_meeting_core::{Config, NotificationStore, Status, minutes_setting};

use super::{Lookup, LookupOptions, lookup_status};
use crate::google::GoogleCalendar;
use crate::render;

/// Print a notification for the next meeting if it's due and hasn't been
/// announced yet. Delivering it is up to whatever reads our output.
pub async fn run(config: &Config, threshold_minutes: Option<i64>, all: bool) -> Result<()> {
    let threshold = notify_threshold(config, threshold_minutes)?;
    let now = Utc::now();
    let store = config.notification_store();
    store.cleanup(config.notify_retention(), now);

    let lookup = lookup_status(
        config,
        LookupOptions::new(config, all),
        || GoogleCalendar::from_config(config),
        now,
    )
    .await?;

    let Lookup::Found(status) = lookup else {
        tracing::info!("Calendar offline, nothing to notify");
        return Ok(());
    };

    if let Some((title, body)) = take_notification(&store, &status, threshold, now) {
        println!("{}", title);
        println!("{}", body);
    }

    Ok(())
}

/// `--threshold` if given, otherwise the configured threshold
fn notify_threshold(config: &Config, threshold_minutes: Option<i64>) -> Result<Duration> {
    match threshold_minutes {
        Some(minutes) => Ok(minutes_setting("--threshold", minutes)?),
        None => Ok(config.notify_threshold()),
    }
}

/// Title and body of the notification that's due, marking it as sent.
fn take_notification(
    store: &NotificationStore,
    status: &Status,
    threshold: Duration,
    now: DateTime<Utc>,
) -> Option<(String, String)> {
    let meeting = store.should_notify(status, threshold, now)?;

    if let Err(e) = store.mark_notified(&meeting, now) {
        tracing::warn!("Failed to record notification for '{}': {}", meeting.summary, e);
    }

    Some(render::notification_text(&meeting, now))
}
