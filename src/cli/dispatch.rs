use anyhow::Result;
use stagectl::commands::common::GlobalArgs;
use stagectl::commands::{release, repository};

use super::types::Commands;

pub fn dispatch(global: &GlobalArgs, command: Commands) -> Result<()> {
    match command {
        Commands::Profiles => repository::profiles(global),
        Commands::List => repository::list(global),
        Commands::Create { description } => repository::create(global, &description),
        Commands::Open { description } => repository::open(global, &description),
        Commands::Prepare { description } => repository::prepare(global, &description),
        Commands::Upload {
            repository_id,
            bundle_dir,
        } => release::upload(global, &repository_id, &bundle_dir),
        Commands::Close { repository_id } => release::close(global, &repository_id),
        Commands::Promote { repository_id } => release::promote(global, &repository_id),
        Commands::Release { repository_id } => release::release(global, &repository_id),
        Commands::Drop { repository_id } => repository::drop(global, &repository_id),
        Commands::BundleRelease {
            description,
            bundle_dir,
        } => release::bundle_release(global, &description, &bundle_dir),
        Commands::ReleaseAll { filter } => release::release_all(global, filter.as_deref()),
        Commands::DropAll { filter } => repository::drop_all(global, filter.as_deref()),
        Commands::Log { repository_id } => repository::log(global, &repository_id),
    }
}
