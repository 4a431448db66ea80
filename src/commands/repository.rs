//! Repository commands: inspect, create and drop staging repositories.

use anyhow::{Context, Result};
use colored::Colorize;

use super::common::{self, truncate, GlobalArgs};
use crate::client::StagingClient;
use crate::models::{StagingRepositoryProfile, StagingType};

/// List the staging profiles visible to the configured account.
pub fn profiles(args: &GlobalArgs) -> Result<()> {
    let config = common::load_config(args)?;
    let client = common::client(&config)?;
    let profiles = client
        .list_profiles()
        .context("Failed to list staging profiles")?;

    if profiles.is_empty() {
        println!("{} No staging profiles", "─".dimmed());
        return Ok(());
    }

    println!("{:<24} {:<40} {}", "ID".bold(), "NAME".bold(), "TARGET".bold());
    for profile in &profiles {
        println!(
            "{:<24} {:<40} {}",
            profile.id, profile.name, profile.repository_target_id
        );
    }
    Ok(())
}

fn colored_state(state: StagingType) -> String {
    let label = format!("{state:<9}");
    match state {
        StagingType::Open => label.cyan().to_string(),
        StagingType::Closed => label.yellow().to_string(),
        StagingType::Released => label.green().to_string(),
        StagingType::Dropped => label.dimmed().to_string(),
    }
}

fn print_repositories(repos: &[StagingRepositoryProfile]) {
    for repo in repos {
        println!(
            "{:<28} {} {}",
            repo.repository_id,
            colored_state(repo.staging_type),
            truncate(&repo.description, 60)
        );
    }
}

/// List the repositories of the configured profile.
pub fn list(args: &GlobalArgs) -> Result<()> {
    let driver = common::driver(args)?;
    let repos = driver
        .repositories()
        .context("Failed to list staging repositories")?;

    if repos.is_empty() {
        println!(
            "{} No staging repositories for {}",
            "─".dimmed(),
            driver.profile().name
        );
        return Ok(());
    }

    print_repositories(&repos);
    Ok(())
}

pub fn create(args: &GlobalArgs, description: &str) -> Result<()> {
    let driver = common::driver(args)?;
    let repo = driver
        .create_stage(description)
        .context("Failed to create staging repository")?;
    println!("{} Created {}", "✓".green().bold(), repo.repository_id.bold());
    Ok(())
}

/// Reuse the open repository with this description, or create it.
pub fn open(args: &GlobalArgs, description: &str) -> Result<()> {
    let driver = common::driver(args)?;
    let repo = driver.open_or_create(description)?;
    println!("{} {}", "✓".green().bold(), repo);
    Ok(())
}

pub fn prepare(args: &GlobalArgs, description: &str) -> Result<()> {
    let driver = common::driver(args)?;
    let repo = driver
        .prepare(description)
        .with_context(|| format!("Failed to prepare a repository for {description:?}"))?;
    println!("{} Prepared {}", "✓".green().bold(), repo.repository_id.bold());
    Ok(())
}

pub fn drop(args: &GlobalArgs, repository_id: &str) -> Result<()> {
    let driver = common::driver(args)?;
    let repo = driver.find_repository(repository_id)?;

    println!("{} Dropping {}...", "→".cyan().bold(), repository_id);
    let response = driver.drop_stage(&repo)?;
    if response.is_success() {
        println!("{} Dropped {}", "✓".green().bold(), repository_id);
    } else {
        println!(
            "{} Drop of {} returned HTTP {}: {}",
            "✗".red().bold(),
            repository_id,
            response.status,
            response.body
        );
    }
    Ok(())
}

pub fn drop_all(args: &GlobalArgs, filter: Option<&str>) -> Result<()> {
    let driver = common::driver(args)?;
    let dropped = driver.drop_all(filter)?;

    if dropped.is_empty() {
        println!("{} Nothing to drop", "─".dimmed());
    } else {
        print_repositories(&dropped);
        println!("{} Dropped {} repositories", "✓".green().bold(), dropped.len());
    }
    Ok(())
}

/// Print the compacted activity log of a repository.
pub fn log(args: &GlobalArgs, repository_id: &str) -> Result<()> {
    let driver = common::driver(args)?;
    let repo = driver.find_repository(repository_id)?;
    let activities = driver
        .activity_log(&repo)
        .with_context(|| format!("Failed to fetch activity log of {repository_id}"))?;

    if activities.is_empty() {
        println!("{} No activity for {}", "─".dimmed(), repository_id);
        return Ok(());
    }

    for activity in &activities {
        match activity.duration() {
            Some(elapsed) => println!(
                "{} {} {}",
                "→".cyan().bold(),
                activity,
                format!("({})", common::format_elapsed(elapsed)).dimmed()
            ),
            None => println!("{} {}", "→".cyan().bold(), activity),
        }
        for event in activity.suppress_evaluate_log() {
            if event.is_failure() {
                println!("  {}", event.to_string().red());
            } else {
                println!("  {event}");
            }
        }
    }
    Ok(())
}
