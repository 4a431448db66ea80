use std::path::Path;

use tracing::{info, warn};

use super::StagingDriver;
use crate::client::StagingClient;
use crate::error::{Result, StagingError};
use crate::models::{StagingActivity, StagingRepositoryProfile, StagingType};

pub(super) fn matches_filter(repo: &StagingRepositoryProfile, filter: Option<&str>) -> bool {
    filter.map_or(true, |f| repo.description.contains(f))
}

impl<C: StagingClient> StagingDriver<C> {
    /// Every repository that belongs to the driver's profile.
    pub fn repositories(&self) -> Result<Vec<StagingRepositoryProfile>> {
        Ok(self
            .client
            .list_repository_profiles()?
            .into_iter()
            .filter(|r| r.belongs_to(&self.profile))
            .collect())
    }

    pub fn find_repository(&self, repository_id: &str) -> Result<StagingRepositoryProfile> {
        self.repositories()?
            .into_iter()
            .find(|r| r.repository_id == repository_id)
            .ok_or_else(|| StagingError::RepositoryNotFound(repository_id.to_string()))
    }

    /// Full activity log of `repo`.
    pub fn activity_log(&self, repo: &StagingRepositoryProfile) -> Result<Vec<StagingActivity>> {
        self.client.fetch_activity_log(repo)
    }

    /// Reuse the open repository described as `description`, or create one.
    pub fn open_or_create(&self, description: &str) -> Result<StagingRepositoryProfile> {
        let mut open: Vec<_> = self
            .repositories()?
            .into_iter()
            .filter(|r| r.is_open() && r.description == description)
            .collect();

        match open.len() {
            0 => self.create_stage(description),
            1 => {
                let repo = open.remove(0);
                info!("Reusing staging repository {repo}");
                Ok(repo)
            }
            count => Err(StagingError::AmbiguousRepository {
                description: description.to_string(),
                count,
            }),
        }
    }

    /// Drop every unreleased repository described as `description`, then create a fresh one.
    pub fn prepare(&self, description: &str) -> Result<StagingRepositoryProfile> {
        for repo in self.repositories()? {
            if repo.description != description || repo.staging_type.is_terminal() {
                continue;
            }
            self.drop_stage(&repo)?;
        }
        self.create_stage(description)
    }

    /// Prepare a repository, upload `bundle_dir` into it, then close and promote it.
    pub fn bundle_release(
        &mut self,
        description: &str,
        bundle_dir: &Path,
    ) -> Result<StagingRepositoryProfile> {
        let repo = self.prepare(description)?;
        self.upload_bundle(&repo, bundle_dir)?;
        self.close_and_promote(&repo)
    }

    /// Close and promote every open or closed repository of the profile.
    ///
    /// Each repository is watched with a fresh monitor. Stops at the first failure.
    pub fn release_all(&mut self, filter: Option<&str>) -> Result<Vec<StagingRepositoryProfile>> {
        let pending: Vec<_> = self
            .repositories()?
            .into_iter()
            .filter(|r| !r.staging_type.is_terminal() && matches_filter(r, filter))
            .collect();

        let mut released = Vec::with_capacity(pending.len());
        for repo in &pending {
            self.reset_monitor();
            released.push(self.close_and_promote(repo)?);
        }
        Ok(released)
    }

    /// Drop every open or closed repository of the profile.
    ///
    /// Returns the repositories the server accepted the drop for.
    pub fn drop_all(&self, filter: Option<&str>) -> Result<Vec<StagingRepositoryProfile>> {
        let mut dropped = Vec::new();
        for repo in self.repositories()? {
            if repo.staging_type.is_terminal() || !matches_filter(&repo, filter) {
                continue;
            }
            let response = self.drop_stage(&repo)?;
            if response.is_success() {
                dropped.push(repo.advance(StagingType::Dropped)?);
            } else {
                warn!("Skipping {}: drop was rejected", repo.repository_id);
            }
        }
        Ok(dropped)
    }
}
