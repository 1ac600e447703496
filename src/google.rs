//! Google Calendar event source.
//!
//! Talks to the Calendar v3 REST API with a bearer token. Getting and
//! refreshing that token is someone else's job: we read it from
//! `NEXT_MEETING_ACCESS_TOKEN` or from the configured token file.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use next_meeting_core::{Config, EventSource, FetchError, Meeting, ResponseStatus, TimeWindow};
use serde::Deserialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const TOKEN_ENV_VAR: &str = "NEXT_MEETING_ACCESS_TOKEN";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct GoogleCalendar {
    client: reqwest::Client,
    base_url: String,
    calendar_id: String,
    access_token: String,
}

#[derive(Deserialize)]
struct TokenFile {
    access_token: String,
}

impl GoogleCalendar {
    pub fn new(base_url: &str, calendar_id: &str, access_token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(GoogleCalendar {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
            access_token: access_token.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let token = load_access_token(&config.token_path()?)?;
        Self::new(DEFAULT_BASE_URL, &config.calendar_id, &token)
    }

    fn events_url(&self) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Api(format!("Invalid API URL '{}': {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| FetchError::Api(format!("Invalid API URL '{}'", self.base_url)))?
            .extend(["calendars", self.calendar_id.as_str(), "events"]);

        Ok(url)
    }

    async fn fetch_page(
        &self,
        url: &Url,
        window: &TimeWindow,
        page_token: Option<&str>,
    ) -> Result<EventsPage, FetchError> {
        let time_min = window.from.to_rfc3339();
        let time_max = window.to.to_rfc3339();

        let mut query = vec![
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("showDeleted", "false"),
            ("timeMin", time_min.as_str()),
            ("timeMax", time_max.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Api(format!("{}: {}", status, body.trim())));
        }

        response
            .json::<EventsPage>()
            .await
            .map_err(|e| FetchError::Api(format!("Unexpected response: {}", e)))
    }
}

impl EventSource for GoogleCalendar {
    async fn fetch_events(&self, window: &TimeWindow) -> Result<Vec<Meeting>, FetchError> {
        let url = self.events_url()?;
        tracing::debug!(from = %window.from, to = %window.to, calendar = %self.calendar_id, "Fetching events");

        let mut meetings = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(&url, window, page_token.as_deref()).await?;
            meetings.extend(page.items.into_iter().filter_map(to_meeting));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::debug!(count = meetings.len(), "Fetched meetings");
        Ok(meetings)
    }
}

/// Connection failures and timeouts mean we're offline; anything else is
/// the API's fault.
fn classify(e: reqwest::Error) -> FetchError {
    if e.is_connect() || e.is_timeout() {
        FetchError::Network(e.to_string())
    } else {
        FetchError::Api(e.to_string())
    }
}

fn load_access_token(token_path: &Path) -> Result<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if !token.trim().is_empty() {
            return Ok(token.trim().to_string());
        }
    }

    read_token_file(token_path)
}

/// The `access_token` field of a JSON token file
fn read_token_file(token_path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(token_path).with_context(|| {
        format!(
            "No access token found. Set {} or write {{\"access_token\": \"...\"}} to {}",
            TOKEN_ENV_VAR,
            token_path.display()
        )
    })?;

    let token: TokenFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid token file {}", token_path.display()))?;

    Ok(token.access_token)
}

// =============================================================================
// API types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    status: String,
    location: Option<String>,
    start: Option<GoogleDateTime>,
    end: Option<GoogleDateTime>,
    #[serde(default)]
    attendees: Vec<GoogleAttendee>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleDateTime {
    /// Absent for all-day events, which only carry `date`
    date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleAttendee {
    #[serde(default, rename = "self")]
    is_self: bool,
    #[serde(default)]
    response_status: String,
}

fn parse_date_time(value: &Option<GoogleDateTime>) -> Option<DateTime<Utc>> {
    let raw = value.as_ref()?.date_time.as_deref()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Convert an API event, skipping cancelled, all-day and unparseable ones.
fn to_meeting(event: GoogleEvent) -> Option<Meeting> {
    if event.status == "cancelled" {
        return None;
    }

    let start = parse_date_time(&event.start)?;
    let end = parse_date_time(&event.end)?;

    // Events without a "self" attendee are on the user's own calendar
    // without invitations, so there's nothing to accept.
    let response_status = event
        .attendees
        .iter()
        .find(|a| a.is_self)
        .map(|a| ResponseStatus::from_api_str(&a.response_status))
        .unwrap_or(ResponseStatus::Accepted);

    let location = event.location.filter(|l| !l.is_empty());

    Some(Meeting {
        summary: event.summary,
        start,
        end,
        location,
        attendee_count: event.attendees.len(),
        response_status,
    })
}
