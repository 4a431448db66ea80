mod methods;
mod transitions;
mod types;


pub use types::{StagingProfile, StagingRepositoryProfile, StagingType};
