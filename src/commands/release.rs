//! Release commands: upload, close, promote and the combined flows.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use super::common::{self, GlobalArgs};

pub fn upload(args: &GlobalArgs, repository_id: &str, bundle_dir: &Path) -> Result<()> {
    let driver = common::driver(args)?;
    let repo = driver.find_repository(repository_id)?;

    println!(
        "{} Uploading {} to {}...",
        "→".cyan().bold(),
        bundle_dir.display(),
        repository_id
    );
    driver
        .upload_bundle(&repo, bundle_dir)
        .with_context(|| format!("Failed to upload {}", bundle_dir.display()))?;
    println!("{} Uploaded bundle to {}", "✓".green().bold(), repository_id);
    Ok(())
}

pub fn close(args: &GlobalArgs, repository_id: &str) -> Result<()> {
    let mut driver = common::driver(args)?;
    let repo = driver.find_repository(repository_id)?;

    let closed = driver.close_stage(&repo)?;
    println!("{} Closed {}", "✓".green().bold(), closed.repository_id);
    Ok(())
}

pub fn promote(args: &GlobalArgs, repository_id: &str) -> Result<()> {
    let mut driver = common::driver(args)?;
    let repo = driver.find_repository(repository_id)?;

    let released = driver.promote_stage(&repo)?;
    println!("{} Released {}", "✓".green().bold(), released.repository_id);
    Ok(())
}

/// Close and promote one repository.
pub fn release(args: &GlobalArgs, repository_id: &str) -> Result<()> {
    let mut driver = common::driver(args)?;
    let repo = driver.find_repository(repository_id)?;

    let released = driver.close_and_promote(&repo)?;
    println!("{} Released {}", "✓".green().bold(), released.repository_id);
    Ok(())
}

pub fn release_all(args: &GlobalArgs, filter: Option<&str>) -> Result<()> {
    let mut driver = common::driver(args)?;
    let released = driver.release_all(filter)?;

    if released.is_empty() {
        println!("{} Nothing to release", "─".dimmed());
        return Ok(());
    }
    for repo in &released {
        println!("{} Released {}", "✓".green().bold(), repo.repository_id);
    }
    Ok(())
}

/// Prepare, upload, close and promote in one go.
pub fn bundle_release(args: &GlobalArgs, description: &str, bundle_dir: &Path) -> Result<()> {
    let mut driver = common::driver(args)?;

    println!(
        "{} Releasing {} as {:?}...",
        "→".cyan().bold(),
        bundle_dir.display(),
        description
    );
    let released = driver.bundle_release(description, bundle_dir)?;
    println!("{} Released {}", "✓".green().bold(), released.repository_id);
    Ok(())
}
