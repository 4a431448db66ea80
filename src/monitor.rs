//! Incremental progress reporting over the activity log.
//!
//! The activity endpoint always returns the full log. The monitor remembers
//! what it already surfaced so each poll only yields new activities and new
//! events.

use std::collections::HashSet;
use std::fmt;

use crate::models::{ActivityEvent, StagingActivity};

/// A line of progress worth showing to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// First sighting of an activity
    Activity {
        name: String,
        started: String,
        stopped: String,
    },
    /// First sighting of an event within an activity
    Event {
        activity: String,
        event: ActivityEvent,
    },
}

impl Progress {
    pub fn is_activity(&self) -> bool {
        matches!(self, Progress::Activity { .. })
    }

    pub fn is_failure(&self) -> bool {
        match self {
            Progress::Event { event, .. } => event.is_failure(),
            Progress::Activity { .. } => false,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Activity {
                name,
                started,
                stopped,
            } => {
                if stopped.is_empty() {
                    write!(f, "Activity {name} started:{started}")
                } else {
                    write!(f, "Activity {name} started:{started}, stopped:{stopped}")
                }
            }
            Progress::Event { event, .. } => write!(f, "{event}"),
        }
    }
}

/// Remembers reported activities (by start time) and events (by content).
///
/// Sets only grow; a new session starts with a new monitor.
#[derive(Debug, Default)]
pub struct ActivityMonitor {
    reported_activities: HashSet<String>,
    reported_events: HashSet<ActivityEvent>,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the progress lines not yet reported, in log order.
    ///
    /// Events of an already-reported activity are still checked, so a
    /// long-running activity surfaces its events incrementally.
    pub fn report(&mut self, activities: &[StagingActivity]) -> Vec<Progress> {
        let mut progress = Vec::new();

        for activity in activities {
            if self.reported_activities.insert(activity.started.clone()) {
                progress.push(Progress::Activity {
                    name: activity.name.clone(),
                    started: activity.started.clone(),
                    stopped: activity.stopped.clone(),
                });
            }

            for event in &activity.events {
                if !self.reported_events.contains(event) {
                    self.reported_events.insert(event.clone());
                    progress.push(Progress::Event {
                        activity: activity.name.clone(),
                        event: event.clone(),
                    });
                }
            }
        }

        progress
    }

    pub fn reported_activity_count(&self) -> usize {
        self.reported_activities.len()
    }

    pub fn reported_event_count(&self) -> usize {
        self.reported_events.len()
    }
}
