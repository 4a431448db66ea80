//! Access to the remote staging suite.
//!
//! [`StagingClient`] is the contract the lifecycle driver depends on;
//! [`HttpStagingClient`] implements it over the Nexus staging REST API.

mod http;
pub mod upload;
pub mod wire;

use std::path::Path;

use crate::error::Result;
use crate::models::{StagingActivity, StagingProfile, StagingRepositoryProfile};

pub use http::HttpStagingClient;

/// Status and body of a response, kept raw so callers can check preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_created(&self) -> bool {
        self.status == 201
    }
}

/// Requests the lifecycle driver issues against the staging suite.
pub trait StagingClient {
    fn list_repository_profiles(&self) -> Result<Vec<StagingRepositoryProfile>>;

    fn list_profiles(&self) -> Result<Vec<StagingProfile>>;

    /// Open a new staging repository; the server assigns its id.
    fn start_staging(
        &self,
        profile: &StagingProfile,
        description: &str,
    ) -> Result<StagingRepositoryProfile>;

    fn finish_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse>;

    fn promote_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse>;

    fn drop_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse>;

    /// Full activity log of the repository, oldest first.
    fn fetch_activity_log(&self, repo: &StagingRepositoryProfile) -> Result<Vec<StagingActivity>>;

    /// Upload every file under `bundle_dir` into the repository.
    ///
    /// A conflicting prior upload surfaces as an HTTP 409 error.
    fn upload_bundle(&self, bundle_dir: &Path, repo: &StagingRepositoryProfile) -> Result<()>;
}

impl<C: StagingClient + ?Sized> StagingClient for &C {
    fn list_repository_profiles(&self) -> Result<Vec<StagingRepositoryProfile>> {
        (**self).list_repository_profiles()
    }

    fn list_profiles(&self) -> Result<Vec<StagingProfile>> {
        (**self).list_profiles()
    }

    fn start_staging(
        &self,
        profile: &StagingProfile,
        description: &str,
    ) -> Result<StagingRepositoryProfile> {
        (**self).start_staging(profile, description)
    }

    fn finish_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        (**self).finish_staging(profile, repo)
    }

    fn promote_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        (**self).promote_staging(profile, repo)
    }

    fn drop_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        (**self).drop_staging(profile, repo)
    }

    fn fetch_activity_log(&self, repo: &StagingRepositoryProfile) -> Result<Vec<StagingActivity>> {
        (**self).fetch_activity_log(repo)
    }

    fn upload_bundle(&self, bundle_dir: &Path, repo: &StagingRepositoryProfile) -> Result<()> {
        (**self).upload_bundle(bundle_dir, repo)
    }
}
