//! Error types for staging operations.

use std::time::Duration;

use thiserror::Error;

use crate::models::{FailureReport, StagingType};

pub type Result<T, E = StagingError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum StagingError {
    /// The remote side has not reached a terminal state yet.
    #[error("{activity} is still in progress")]
    StageInProgress { activity: String },

    /// A staging rule failed on the remote side.
    #[error("Staging rules failed during {}", report.activity)]
    StageFailure { report: FailureReport },

    #[error("Bundle already exists in {repository_id}: {message}")]
    BundleAlreadyExists {
        repository_id: String,
        message: String,
    },

    /// A transition request came back with an unexpected status.
    #[error("Failed to {operation}: HTTP {status} - {body}")]
    Precondition {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{method} {url} returned HTTP {status}: {body}")]
    Http {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Staging profile {0} is not found")]
    ProfileNotFound(String),

    #[error("Staging repository {0} is not found")]
    RepositoryNotFound(String),

    #[error("Found {count} open staging repositories described as {description:?}")]
    AmbiguousRepository { description: String, count: usize },

    #[error("Invalid staging transition for {repository_id}: {from} -> {to}")]
    InvalidTransition {
        repository_id: String,
        from: StagingType,
        to: StagingType,
    },

    #[error("Gave up waiting for {operation} after {attempts} attempts ({}s): {last}", waited.as_secs())]
    WaitExhausted {
        operation: String,
        attempts: u32,
        waited: Duration,
        last: Box<StagingError>,
    },
}

impl StagingError {
    /// Whether a single request failing this way is worth sending again.
    ///
    /// Covers connection and timeout failures, 408, 429 and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            StagingError::Http { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            StagingError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            StagingError::StageInProgress { .. } => true,
            _ => false,
        }
    }

    /// Whether the server rejected the request because the resource already exists.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StagingError::Http { status: 409, .. })
    }

    pub fn failure_report(&self) -> Option<&FailureReport> {
        match self {
            StagingError::StageFailure { report } => Some(report),
            StagingError::WaitExhausted { last, .. } => last.failure_report(),
            _ => None,
        }
    }
}
