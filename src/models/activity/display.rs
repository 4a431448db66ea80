use std::fmt;

use super::types::{ActivityEvent, FailureReport, StagingActivity, TYPE_ID_PROPERTY};

impl ActivityEvent {
    /// Short label for the event kind: `ruleFailed` -> `Failed`, `rulesPassed` -> `Passed`.
    pub fn label(&self) -> String {
        let stripped = self
            .name
            .strip_prefix("rules")
            .or_else(|| self.name.strip_prefix("rule"))
            .filter(|rest| !rest.is_empty());

        match stripped {
            Some(rest) => {
                let mut chars = rest.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            None => self.name.clone(),
        }
    }

    /// Rule type first, then the remaining properties as `name:value`.
    pub fn describe_properties(&self) -> String {
        let front = self
            .properties
            .iter()
            .find(|p| p.name == TYPE_ID_PROPERTY)
            .map(|p| p.value.clone());
        let rest = self
            .properties
            .iter()
            .filter(|p| p.name != TYPE_ID_PROPERTY)
            .map(|p| format!("{}:{}", p.name, p.value));

        front.into_iter().chain(rest).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for ActivityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}: {}", self.label(), self.describe_properties())
    }
}

impl fmt::Display for StagingActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_in_progress() {
            write!(f, "Activity {} started:{} (in progress)", self.name, self.started)
        } else {
            write!(
                f,
                "Activity {} started:{}, stopped:{}",
                self.name, self.started, self.stopped
            )
        }
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activity {} failed", self.activity)?;
        for event in &self.events {
            write!(f, "\n  {}: {}", event.rule_type(), event.describe_properties())?;
        }
        Ok(())
    }
}
