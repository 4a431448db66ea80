use crate::error::{Result, StagingError};

use super::types::{StagingRepositoryProfile, StagingType};

impl StagingType {
    /// Check if moving from the current state to `next` keeps the lifecycle moving forward.
    ///
    /// Staying in the same state is a valid no-op.
    pub fn can_transition_to(&self, next: &StagingType) -> bool {
        if self == next {
            return true;
        }

        match self {
            StagingType::Open => matches!(next, StagingType::Closed | StagingType::Dropped),
            StagingType::Closed => matches!(next, StagingType::Released | StagingType::Dropped),
            StagingType::Released => false, // Terminal state
            StagingType::Dropped => false,  // Terminal state
        }
    }

    /// Returns the list of states this state can move to.
    pub fn valid_transitions(&self) -> Vec<StagingType> {
        match self {
            StagingType::Open => vec![StagingType::Closed, StagingType::Dropped],
            StagingType::Closed => vec![StagingType::Released, StagingType::Dropped],
            StagingType::Released => vec![],
            StagingType::Dropped => vec![],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl StagingRepositoryProfile {
    /// Return a copy of this repository in state `next`.
    ///
    /// Fails without touching `self` when `next` would move the lifecycle backward.
    pub fn advance(&self, next: StagingType) -> Result<Self> {
        if !self.staging_type.can_transition_to(&next) {
            return Err(StagingError::InvalidTransition {
                repository_id: self.repository_id.clone(),
                from: self.staging_type,
                to: next,
            });
        }

        Ok(Self {
            staging_type: next,
            ..self.clone()
        })
    }

    pub fn to_closed(&self) -> Result<Self> {
        self.advance(StagingType::Closed)
    }

    pub fn to_released(&self) -> Result<Self> {
        self.advance(StagingType::Released)
    }

    pub fn to_dropped(&self) -> Result<Self> {
        self.advance(StagingType::Dropped)
    }
}
