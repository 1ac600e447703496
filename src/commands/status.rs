use anyhow::Result;
use chrono::Utc;
use next_meeting_core::Config;

use super::{Lookup, LookupOptions, lookup_status};
use crate::google::GoogleCalendar;
use crate::render;

pub async fn run(config: &Config, no_cache: bool, all: bool) -> Result<()> {
    let now = Utc::now();
    let options = LookupOptions {
        use_cache: !no_cache,
        ..LookupOptions::new(config, all)
    };

    let lookup = lookup_status(config, options, || GoogleCalendar::from_config(config), now).await?;

    match lookup {
        Lookup::Found(status) => println!("{}", render::status_line(&status, now)),
        Lookup::Offline => println!("{}", render::OFFLINE),
    }

    Ok(())
}
