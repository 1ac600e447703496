use anyhow::Result;
use next_meeting_core::Config;
use owo_colors::OwoColorize;

pub fn run(config: &Config) -> Result<()> {
    let config_path = Config::config_path()?;
    println!("{} {}", "Config file:".dimmed(), config_path.display());
    println!();

    println!("{}", "# Resolved settings".dimmed());
    print!("{}", config.to_toml()?);
    println!();

    let paths = [
        ("snapshot", config.snapshot_cache().path().display().to_string()),
        ("notifications", config.notification_store().dir().display().to_string()),
        ("token_file", config.token_path()?.display().to_string()),
    ];

    for (key, value) in paths {
        println!("  {:<14} {}", key.dimmed(), value);
    }

    Ok(())
}
