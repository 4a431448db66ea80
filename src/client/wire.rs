//! JSON payloads exchanged with the staging REST API.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StagingError};
use crate::models::{StagingActivity, StagingProfile, StagingRepositoryProfile};

/// Every payload travels as `{"data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub staged_repository_id: String,
    #[serde(default)]
    pub description: String,
}

/// Body of finish, promote and drop requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub staged_repository_id: String,
    pub target_repository_id: String,
    pub description: String,
}

impl TransitionRequest {
    pub fn new(profile: &StagingProfile, repo: &StagingRepositoryProfile) -> Data<Self> {
        Data::new(Self {
            staged_repository_id: repo.repository_id.clone(),
            target_repository_id: profile.repository_target_id.clone(),
            description: repo.description.clone(),
        })
    }
}

/// The activity endpoint answers with a bare array on some server versions.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ActivityLog {
    Wrapped(Data<Vec<StagingActivity>>),
    Bare(Vec<StagingActivity>),
}

impl ActivityLog {
    pub fn into_activities(self) -> Vec<StagingActivity> {
        match self {
            ActivityLog::Wrapped(data) => data.data,
            ActivityLog::Bare(activities) => activities,
        }
    }
}

pub fn decode<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| StagingError::Decode {
        context: context.to_string(),
        source,
    })
}
