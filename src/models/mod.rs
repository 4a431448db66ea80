pub mod activity;
pub mod profile;

pub use activity::{ActivityEvent, FailureReport, Property, StagingActivity};
pub use profile::{StagingProfile, StagingRepositoryProfile, StagingType};
