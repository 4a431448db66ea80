use serde::{Deserialize, Serialize};

/// Event emitted when a rule fails.
pub const EVENT_RULE_FAILED: &str = "ruleFailed";

/// Event emitted when the server starts evaluating a rule.
pub const EVENT_RULE_EVALUATE: &str = "ruleEvaluate";

/// Terminal event of a successful close.
pub const EVENT_REPOSITORY_CLOSED: &str = "repositoryClosed";

/// Terminal event of a successful release.
pub const EVENT_REPOSITORY_RELEASED: &str = "repositoryReleased";

/// Property naming the rule an event belongs to.
pub const TYPE_ID_PROPERTY: &str = "typeId";

/// Rule type reported for events without a `typeId` property.
pub const OTHER_RULE_TYPE: &str = "other";

/// A single name/value pair attached to an event.
///
/// Kept as a list rather than a map: names may repeat and order is part of
/// what gets displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One rule-evaluation outcome.
///
/// Equality and hashing cover every field, so two events with the same
/// timestamp, name, severity and properties (in the same order) are the
/// same event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: String,
    pub name: String,
    /// 0 on success, anything else is a failure
    #[serde(default)]
    pub severity: i32,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// A named, time-bounded sequence of events on a staging repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingActivity {
    pub name: String,
    pub started: String,
    /// Empty while the activity is still running
    #[serde(default)]
    pub stopped: String,
    /// Evaluation order, as received
    #[serde(default)]
    pub events: Vec<ActivityEvent>,
}

/// Failing events of one activity, kept for display after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub activity: String,
    pub events: Vec<ActivityEvent>,
}
