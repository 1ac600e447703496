//! next-meeting configuration.

use std::path::{Path, PathBuf};

use chrono::Duration;
use config::{Config as ConfigLoader, File};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::notify::{DEFAULT_RETENTION_HOURS, NotificationStore};
use crate::snapshot::{DEFAULT_FRESHNESS_MINUTES, SnapshotCache};

const APP_DIR: &str = "next-meeting";
const NOTIFY_DIR: &str = "notified";

/// Largest accepted value for the `*_hours` settings (one year)
pub const MAX_HOURS: i64 = 24 * 366;

/// Largest accepted value for the `*_minutes` settings (one year)
pub const MAX_MINUTES: i64 = MAX_HOURS * 60;

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_lookbehind_hours() -> i64 {
    2
}

fn default_lookahead_hours() -> i64 {
    24
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl_minutes() -> i64 {
    DEFAULT_FRESHNESS_MINUTES
}

fn default_notify_threshold_minutes() -> i64 {
    10
}

fn default_notify_retention_hours() -> i64 {
    DEFAULT_RETENTION_HOURS
}

/// Configuration at ~/.config/next-meeting/config.toml
///
/// Every field has a default, so a missing or empty file is valid.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Calendar to read ("primary" is the user's main calendar)
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    /// How far back to fetch, so meetings already in progress are seen
    #[serde(default = "default_lookbehind_hours")]
    pub lookbehind_hours: i64,

    #[serde(default = "default_lookahead_hours")]
    pub lookahead_hours: i64,

    /// Ignore meetings that weren't accepted or tentatively accepted
    #[serde(default = "default_true")]
    pub only_accepted: bool,

    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: i64,

    #[serde(default = "default_notify_threshold_minutes")]
    pub notify_threshold_minutes: i64,

    #[serde(default = "default_notify_retention_hours")]
    pub notify_retention_hours: i64,

    /// Where the snapshot and notification records live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// JSON file holding `{"access_token": "..."}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            calendar_id: default_calendar_id(),
            lookbehind_hours: default_lookbehind_hours(),
            lookahead_hours: default_lookahead_hours(),
            only_accepted: true,
            cache_ttl_minutes: default_cache_ttl_minutes(),
            notify_threshold_minutes: default_notify_threshold_minutes(),
            notify_retention_hours: default_notify_retention_hours(),
            cache_dir: None,
            token_file: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> CoreResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CoreError::Config("Could not determine config directory".into()))?;

        Ok(config_dir.join(APP_DIR))
    }

    pub fn config_path() -> CoreResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load the config file, creating a commented default one on first run.
    pub fn load() -> CoreResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit path. A missing file gives the defaults.
    pub fn load_from(path: &Path) -> CoreResult<Self> {
        let config: Config = ConfigLoader::builder()
            .add_source(File::from(path).required(false))
            .build()
            .map_err(|e| CoreError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CoreResult<()> {
        hours_setting("lookbehind_hours", self.lookbehind_hours)?;
        hours_setting("lookahead_hours", self.lookahead_hours)?;
        minutes_setting("cache_ttl_minutes", self.cache_ttl_minutes)?;
        minutes_setting("notify_threshold_minutes", self.notify_threshold_minutes)?;
        hours_setting("notify_retention_hours", self.notify_retention_hours)?;
        Ok(())
    }

    /// Resolved settings as TOML, in the same format as the config file.
    pub fn to_toml(&self) -> CoreResult<String> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CoreResult<()> {
        let contents = format!(
            "\
# next-meeting configuration

# Calendar to read:
# calendar_id = \"{}\"

# Fetch window around now, in hours:
# lookbehind_hours = {}
# lookahead_hours = {}

# Only show meetings you accepted (or tentatively accepted):
# only_accepted = true

# How long a fetched snapshot is reused, in minutes:
# cache_ttl_minutes = {}

# Notify this many minutes before a meeting starts:
# notify_threshold_minutes = {}

# Forget sent notifications after this many hours:
# notify_retention_hours = {}

# Where the snapshot and notification records live:
# cache_dir = \"~/.cache/next-meeting\"

# File holding the Google Calendar access token:
# token_file = \"~/.config/next-meeting/token.json\"
",
            default_calendar_id(),
            default_lookbehind_hours(),
            default_lookahead_hours(),
            default_cache_ttl_minutes(),
            default_notify_threshold_minutes(),
            default_notify_retention_hours(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoreError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CoreError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Directory for the snapshot and notification records, with `~` expanded.
    ///
    /// Falls back to the OS temp directory when there's no cache directory.
    pub fn data_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => expand_tilde(dir),
            None => dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR),
        }
    }

    pub fn token_path(&self) -> CoreResult<PathBuf> {
        match &self.token_file {
            Some(path) => Ok(expand_tilde(path)),
            None => Ok(Self::config_dir()?.join("token.json")),
        }
    }

    pub fn snapshot_cache(&self) -> SnapshotCache {
        SnapshotCache::in_dir(&self.data_dir())
            .with_freshness(Duration::minutes(self.cache_ttl_minutes.clamp(0, MAX_MINUTES)))
    }

    pub fn notification_store(&self) -> NotificationStore {
        NotificationStore::new(self.data_dir().join(NOTIFY_DIR))
    }

    pub fn notify_threshold(&self) -> Duration {
        Duration::minutes(self.notify_threshold_minutes.clamp(0, MAX_MINUTES))
    }

    pub fn notify_retention(&self) -> Duration {
        Duration::hours(self.notify_retention_hours.clamp(0, MAX_HOURS))
    }
}

/// A minutes setting as a duration, rejecting values outside `0..=MAX_MINUTES`.
pub fn minutes_setting(name: &str, value: i64) -> CoreResult<Duration> {
    check_range(name, value, MAX_MINUTES)?;
    Duration::try_minutes(value)
        .ok_or_else(|| CoreError::Config(format!("{name} is out of range (got {value})")))
}

/// An hours setting as a duration, rejecting values outside `0..=MAX_HOURS`.
pub fn hours_setting(name: &str, value: i64) -> CoreResult<Duration> {
    check_range(name, value, MAX_HOURS)?;
    Duration::try_hours(value)
        .ok_or_else(|| CoreError::Config(format!("{name} is out of range (got {value})")))
}

fn check_range(name: &str, value: i64, max: i64) -> CoreResult<()> {
    if value < 0 {
        return Err(CoreError::Config(format!("{name} must not be negative (got {value})")));
    }
    if value > max {
        return Err(CoreError::Config(format!("{name} must be at most {max} (got {value})")));
    }
    Ok(())
}

fn expand_tilde(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_default_file_parses_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        Config::create_default_config(&path).unwrap();
        let config = Config::load_from(&path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "calendar_id = \"team@example.com\"\nonly_accepted = false\ncache_ttl_minutes = 5\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.calendar_id, "team@example.com");
        assert!(!config.only_accepted);
        assert_eq!(config.cache_ttl_minutes, 5);
        assert_eq!(config.lookahead_hours, 24);
        assert_eq!(config.notify_threshold(), Duration::minutes(10));
        assert_eq!(config.notify_retention(), Duration::hours(24));
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "lookahead_hours = -1\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_oversized_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        for contents in [
            "cache_ttl_minutes = 9223372036854775807\n",
            "lookahead_hours = 1000000000000\n",
            "lookbehind_hours = 8785\n",
            "notify_threshold_minutes = 527041\n",
            "notify_retention_hours = 9223372036854775807\n",
        ] {
            std::fs::write(&path, contents).unwrap();
            let err = Config::load_from(&path).unwrap_err();
            assert!(matches!(err, CoreError::Config(_)), "accepted {contents:?}");
        }
    }

    #[test]
    fn test_largest_values_are_usable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "lookbehind_hours = {MAX_HOURS}\nlookahead_hours = {MAX_HOURS}\n\
                 cache_ttl_minutes = {MAX_MINUTES}\nnotify_threshold_minutes = {MAX_MINUTES}\n\
                 notify_retention_hours = {MAX_HOURS}\n"
            ),
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.notify_threshold(), Duration::minutes(MAX_MINUTES));
        assert_eq!(config.notify_retention(), Duration::hours(MAX_HOURS));
        let _ = config.snapshot_cache();
    }

    #[test]
    fn test_unvalidated_values_are_clamped() {
        let config = Config {
            cache_ttl_minutes: i64::MAX,
            notify_threshold_minutes: i64::MIN,
            notify_retention_hours: i64::MAX,
            ..Config::default()
        };

        assert_eq!(config.notify_threshold(), Duration::zero());
        assert_eq!(config.notify_retention(), Duration::hours(MAX_HOURS));
        let _ = config.snapshot_cache();
    }

    #[test]
    fn test_minutes_setting() {
        assert_eq!(minutes_setting("threshold", 0).unwrap(), Duration::zero());
        assert_eq!(minutes_setting("threshold", 15).unwrap(), Duration::minutes(15));
        assert!(minutes_setting("threshold", -1).is_err());
        assert!(minutes_setting("threshold", i64::MAX).is_err());
        assert!(hours_setting("window", MAX_HOURS + 1).is_err());
    }

    #[test]
    fn test_to_toml_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            calendar_id: "team@example.com".to_string(),
            lookahead_hours: 48,
            only_accepted: false,
            cache_dir: Some(PathBuf::from("/tmp/nm-cache")),
            ..Config::default()
        };

        let contents = config.to_toml().unwrap();
        assert!(!contents.contains("token_file"));
        std::fs::write(&path, contents).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_stores_live_under_cache_dir() {
        let config = Config {
            cache_dir: Some(PathBuf::from("/tmp/nm-test")),
            ..Config::default()
        };

        assert_eq!(config.data_dir(), PathBuf::from("/tmp/nm-test"));
        assert_eq!(
            config.snapshot_cache().path(),
            Path::new("/tmp/nm-test/snapshot.json")
        );
        assert_eq!(
            config.notification_store().dir(),
            Path::new("/tmp/nm-test/notified")
        );
    }
}
