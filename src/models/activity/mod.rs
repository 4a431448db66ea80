//! Activity log records reported by the staging suite.
//!
//! An activity is one operation on a staging repository (open, close,
//! release, ...) and carries the ordered rule-evaluation events the server
//! produced while running it.

mod display;
mod methods;
mod types;


pub use types::{
    ActivityEvent, FailureReport, Property, StagingActivity, EVENT_REPOSITORY_CLOSED,
    EVENT_REPOSITORY_RELEASED, EVENT_RULE_EVALUATE, EVENT_RULE_FAILED, OTHER_RULE_TYPE,
    TYPE_ID_PROPERTY,
};
