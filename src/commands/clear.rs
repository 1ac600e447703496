use anyhow::{Context, Result};
use next_meeting_core::Config;
use owo_colors::OwoColorize;

pub fn cache(config: &Config) -> Result<()> {
    let cache = config.snapshot_cache();
    cache.clear().context("Error clearing cache")?;

    println!("{} Cache cleared ({})", "✓".green(), cache.path().display());
    Ok(())
}

pub fn notifications(config: &Config) -> Result<()> {
    let store = config.notification_store();
    store.clear().context("Error clearing notifications")?;

    println!("{} Notifications cleared ({})", "✓".green(), store.dir().display());
    Ok(())
}
