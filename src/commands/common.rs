//! Shared setup for commands: configuration, client and driver.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::client::HttpStagingClient;
use crate::config::Config;
use crate::monitor::Progress;
use crate::staging::StagingDriver;

/// Options accepted by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub repository: Option<String>,
    pub profile: Option<String>,
}

/// Load configuration and apply command-line overrides on top.
pub fn load_config(args: &GlobalArgs) -> Result<Config> {
    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(repository) = &args.repository {
        config.repository = repository.clone();
    }
    if let Some(profile) = &args.profile {
        config.profile = Some(profile.clone());
    }
    Ok(config)
}

pub fn client(config: &Config) -> Result<HttpStagingClient> {
    HttpStagingClient::from_config(config)
        .with_context(|| format!("Failed to set up client for {}", config.repository))
}

/// Driver for the configured profile, printing progress to stdout.
pub fn driver(args: &GlobalArgs) -> Result<StagingDriver<HttpStagingClient>> {
    let config = load_config(args)?;
    let profile = config.profile_name()?.to_string();
    let client = client(&config)?;

    let driver = StagingDriver::connect(client, &profile)
        .with_context(|| format!("Failed to select staging profile {profile}"))?
        .configured(&config)
        .with_progress(print_progress);
    Ok(driver)
}

pub fn print_progress(progress: &Progress) {
    match progress {
        Progress::Activity { .. } => println!("{} {}", "→".cyan().bold(), progress),
        Progress::Event { event, .. } if event.is_failure() => {
            println!("  {}", event.to_string().red())
        }
        Progress::Event { event, .. } => println!("  {}", event.to_string().dimmed()),
    }
}

/// Shorten a description for tabular output.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}

/// Compact elapsed time, e.g. `2m 30s`.
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
