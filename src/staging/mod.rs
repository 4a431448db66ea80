//! Staging repository lifecycle.
//!
//! A [`StagingDriver`] owns one profile, one [`StagingClient`] and one
//! [`ActivityMonitor`]. It moves repositories through
//! `open -> closed -> released` (or `dropped`) and polls the activity log
//! until the server confirms each asynchronous transition.

mod bulk;
mod lifecycle;


use tracing::{info, warn};

use crate::client::StagingClient;
use crate::config::Config;
use crate::error::{Result, StagingError};
use crate::models::StagingProfile;
use crate::monitor::{ActivityMonitor, Progress};
use crate::retry::{RetryPolicy, Sleeper, ThreadSleeper};

/// Receives each new progress line surfaced while polling.
pub type ProgressHandler = Box<dyn Fn(&Progress)>;

pub struct StagingDriver<C: StagingClient> {
    client: C,
    profile: StagingProfile,
    monitor: ActivityMonitor,
    poll: RetryPolicy,
    upload: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
    on_progress: ProgressHandler,
}

fn log_progress(progress: &Progress) {
    if progress.is_failure() {
        warn!("{progress}");
    } else {
        info!("{progress}");
    }
}

impl<C: StagingClient> StagingDriver<C> {
    pub fn new(client: C, profile: StagingProfile) -> Self {
        Self {
            client,
            profile,
            monitor: ActivityMonitor::new(),
            poll: RetryPolicy::poll_default(),
            upload: RetryPolicy::upload_default(),
            sleeper: Box::new(ThreadSleeper),
            on_progress: Box::new(log_progress),
        }
    }

    /// Look up the profile by name (or id) and build a driver for it.
    pub fn connect(client: C, profile_name: &str) -> Result<Self> {
        let profile = client
            .list_profiles()?
            .into_iter()
            .find(|p| p.name == profile_name || p.id == profile_name)
            .ok_or_else(|| StagingError::ProfileNotFound(profile_name.to_string()))?;
        info!("Using staging profile {profile}");
        Ok(Self::new(client, profile))
    }

    /// Apply the poll and upload policies from `config`.
    pub fn configured(self, config: &Config) -> Self {
        self.with_poll_policy(config.poll.to_policy())
            .with_upload_policy(config.upload.to_policy())
    }

    pub fn with_poll_policy(mut self, policy: RetryPolicy) -> Self {
        self.poll = policy;
        self
    }

    pub fn with_upload_policy(mut self, policy: RetryPolicy) -> Self {
        self.upload = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Replace the default progress output (tracing at info level).
    pub fn with_progress(mut self, handler: impl Fn(&Progress) + 'static) -> Self {
        self.on_progress = Box::new(handler);
        self
    }

    pub fn profile(&self) -> &StagingProfile {
        &self.profile
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn monitor(&self) -> &ActivityMonitor {
        &self.monitor
    }

    /// Forget everything reported so far; the next poll starts a new session.
    pub fn reset_monitor(&mut self) {
        self.monitor = ActivityMonitor::new();
    }
}
