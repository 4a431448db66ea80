use std::fmt;

use super::types::{StagingProfile, StagingRepositoryProfile, StagingType};

impl StagingRepositoryProfile {
    /// A freshly started repository under `profile`.
    pub fn new(
        profile: &StagingProfile,
        repository_id: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            staging_type: StagingType::Open,
            repository_id: repository_id.into(),
            description: description.into(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.staging_type == StagingType::Open
    }

    pub fn is_closed(&self) -> bool {
        self.staging_type == StagingType::Closed
    }

    pub fn is_released(&self) -> bool {
        self.staging_type == StagingType::Released
    }

    pub fn belongs_to(&self, profile: &StagingProfile) -> bool {
        self.profile_id == profile.id
    }
}

impl fmt::Display for StagingRepositoryProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] status:{}, profile:{}({}) description: {}",
            self.repository_id,
            self.staging_type,
            self.profile_name,
            self.profile_id,
            self.description
        )
    }
}

impl fmt::Display for StagingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id:{}, target:{})",
            self.name, self.id, self.repository_target_id
        )
    }
}
