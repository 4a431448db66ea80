use chrono::DateTime;

use super::types::{
    ActivityEvent, FailureReport, Property, StagingActivity, EVENT_REPOSITORY_CLOSED,
    EVENT_REPOSITORY_RELEASED, EVENT_RULE_EVALUATE, EVENT_RULE_FAILED, OTHER_RULE_TYPE,
    TYPE_ID_PROPERTY,
};

impl ActivityEvent {
    pub fn new(
        timestamp: impl Into<String>,
        name: impl Into<String>,
        severity: i32,
        properties: Vec<Property>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            name: name.into(),
            severity,
            properties,
        }
    }

    /// First value recorded under `name`, if any.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn rule_type(&self) -> &str {
        self.property(TYPE_ID_PROPERTY).unwrap_or(OTHER_RULE_TYPE)
    }

    pub fn is_failure(&self) -> bool {
        self.name == EVENT_RULE_FAILED
    }

    pub fn is_evaluate(&self) -> bool {
        self.name == EVENT_RULE_EVALUATE
    }
}

impl StagingActivity {
    pub fn new(
        name: impl Into<String>,
        started: impl Into<String>,
        stopped: impl Into<String>,
        events: Vec<ActivityEvent>,
    ) -> Self {
        Self {
            name: name.into(),
            started: started.into(),
            stopped: stopped.into(),
            events,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.stopped.is_empty()
    }

    /// True when any event reports a nonzero severity.
    pub fn contains_error(&self) -> bool {
        self.events.iter().any(|e| e.severity != 0)
    }

    /// True when the log holds a `repositoryClosed` event for `repository_id`.
    pub fn is_close_succeeded(&self, repository_id: &str) -> bool {
        self.has_terminal_event(EVENT_REPOSITORY_CLOSED, repository_id)
    }

    /// True when the log holds a `repositoryReleased` event for `repository_id`.
    pub fn is_release_succeeded(&self, repository_id: &str) -> bool {
        self.has_terminal_event(EVENT_REPOSITORY_RELEASED, repository_id)
    }

    fn has_terminal_event(&self, event_name: &str, repository_id: &str) -> bool {
        self.events
            .iter()
            .any(|e| e.name == event_name && e.property("id") == Some(repository_id))
    }

    /// Events with "evaluating rule X" lines folded into X's outcome.
    ///
    /// A `ruleEvaluate` event is dropped when the next event has the same
    /// rule type. The last event has no successor and is always kept, so a
    /// trailing evaluate line survives.
    pub fn suppress_evaluate_log(&self) -> Vec<&ActivityEvent> {
        self.events
            .iter()
            .enumerate()
            .filter(|(i, event)| match self.events.get(i + 1) {
                Some(next) if event.is_evaluate() => next.rule_type() != event.rule_type(),
                _ => true,
            })
            .map(|(_, event)| event)
            .collect()
    }

    pub fn failure_report(&self) -> FailureReport {
        FailureReport {
            activity: self.name.clone(),
            events: self
                .suppress_evaluate_log()
                .into_iter()
                .filter(|e| e.is_failure())
                .cloned()
                .collect(),
        }
    }

    /// Wall-clock duration, when both timestamps parse as RFC 3339.
    pub fn duration(&self) -> Option<chrono::Duration> {
        let started = DateTime::parse_from_rfc3339(&self.started).ok()?;
        let stopped = DateTime::parse_from_rfc3339(&self.stopped).ok()?;
        Some(stopped.signed_duration_since(started))
    }
}

impl FailureReport {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn rule_types(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.rule_type()).collect()
    }
}
