use serde::{Deserialize, Serialize};

/// Account-level publishing target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingProfile {
    pub id: String,
    pub name: String,
    /// Where promoted artifacts end up
    pub repository_target_id: String,
}

/// Lifecycle state of a staging repository as reported by the server.
///
/// State machine transitions:
/// - `Open` -> `Closed` | `Dropped`
/// - `Closed` -> `Released` | `Dropped`
/// - `Released` is a terminal state
/// - `Dropped` is a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StagingType {
    Open,
    Closed,
    Released,
    Dropped,
}

impl std::fmt::Display for StagingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StagingType::Open => write!(f, "open"),
            StagingType::Closed => write!(f, "closed"),
            StagingType::Released => write!(f, "released"),
            StagingType::Dropped => write!(f, "dropped"),
        }
    }
}

/// One staging repository created under a profile.
///
/// Treated as a value: transitions produce a new copy and leave the old one
/// untouched. `repository_id` is assigned by the server at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingRepositoryProfile {
    pub profile_id: String,
    pub profile_name: String,
    #[serde(rename = "type")]
    pub staging_type: StagingType,
    pub repository_id: String,
    #[serde(default)]
    pub description: String,
}
