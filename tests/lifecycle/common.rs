//! In-memory staging suite used to drive `StagingDriver` without a server.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use stagectl::client::{RawResponse, StagingClient};
use stagectl::models::{
    ActivityEvent, Property, StagingActivity, StagingProfile, StagingRepositoryProfile,
    StagingType,
};
use stagectl::monitor::Progress;
use stagectl::retry::Sleeper;
use stagectl::{Result, StagingError};

pub const PROFILE_ID: &str = "12a4567b89";

pub fn profile() -> StagingProfile {
    StagingProfile {
        id: PROFILE_ID.to_string(),
        name: "org.example".to_string(),
        repository_target_id: "abc123".to_string(),
    }
}

pub fn repository(id: &str, state: StagingType, description: &str) -> StagingRepositoryProfile {
    StagingRepositoryProfile {
        staging_type: state,
        ..StagingRepositoryProfile::new(&profile(), id, description)
    }
}

pub fn event(name: &str, severity: i32, props: &[(&str, &str)]) -> ActivityEvent {
    ActivityEvent::new(
        "2024-03-01T10:00:01.000Z",
        name,
        severity,
        props.iter().map(|(k, v)| Property::new(*k, *v)).collect(),
    )
}

pub fn activity(name: &str, started: &str, events: Vec<ActivityEvent>) -> StagingActivity {
    StagingActivity::new(name, started, "", events)
}

/// Scripted fake: every call is recorded, answers come from per-call queues.
#[derive(Default)]
pub struct FakeClient {
    pub profiles: Vec<StagingProfile>,
    pub repositories: RefCell<Vec<StagingRepositoryProfile>>,
    /// Activity logs served per repository; the last one repeats once the queue drains
    pub activity_logs: RefCell<HashMap<String, VecDeque<Vec<StagingActivity>>>>,
    pub finish_status: Cell<u16>,
    pub promote_status: Cell<u16>,
    pub drop_status: Cell<u16>,
    /// Upload answers in order: `None` succeeds, `Some(status)` fails with that status
    pub upload_results: RefCell<VecDeque<Option<u16>>>,
    pub calls: RefCell<Vec<String>>,
    pub transition_bodies: RefCell<Vec<(String, String, String)>>,
    next_id: Cell<u32>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            profiles: vec![profile()],
            finish_status: Cell::new(201),
            promote_status: Cell::new(201),
            drop_status: Cell::new(201),
            next_id: Cell::new(1001),
            ..Self::default()
        }
    }

    pub fn with_repositories(self, repos: Vec<StagingRepositoryProfile>) -> Self {
        *self.repositories.borrow_mut() = repos;
        self
    }

    pub fn script_activity(&self, repository_id: &str, polls: Vec<Vec<StagingActivity>>) {
        self.activity_logs
            .borrow_mut()
            .insert(repository_id.to_string(), polls.into());
    }

    pub fn script_uploads(&self, results: Vec<Option<u16>>) {
        *self.upload_results.borrow_mut() = results.into();
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }

    fn transition(
        &self,
        call: &str,
        status: u16,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> RawResponse {
        self.record(call);
        self.transition_bodies.borrow_mut().push((
            repo.repository_id.clone(),
            profile.repository_target_id.clone(),
            repo.description.clone(),
        ));
        RawResponse::new(status, format!("{call} answered {status}"))
    }

    fn set_state(&self, repository_id: &str, state: StagingType) {
        for repo in self.repositories.borrow_mut().iter_mut() {
            if repo.repository_id == repository_id {
                repo.staging_type = state;
            }
        }
    }
}

impl StagingClient for FakeClient {
    fn list_repository_profiles(&self) -> Result<Vec<StagingRepositoryProfile>> {
        self.record("list_repository_profiles");
        Ok(self.repositories.borrow().clone())
    }

    fn list_profiles(&self) -> Result<Vec<StagingProfile>> {
        self.record("list_profiles");
        Ok(self.profiles.clone())
    }

    fn start_staging(
        &self,
        profile: &StagingProfile,
        description: &str,
    ) -> Result<StagingRepositoryProfile> {
        self.record("start_staging");
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let repo = StagingRepositoryProfile::new(profile, format!("orgexample-{id}"), description);
        self.repositories.borrow_mut().push(repo.clone());
        Ok(repo)
    }

    fn finish_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        Ok(self.transition("finish_staging", self.finish_status.get(), profile, repo))
    }

    fn promote_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        Ok(self.transition("promote_staging", self.promote_status.get(), profile, repo))
    }

    fn drop_staging(
        &self,
        profile: &StagingProfile,
        repo: &StagingRepositoryProfile,
    ) -> Result<RawResponse> {
        let response = self.transition("drop_staging", self.drop_status.get(), profile, repo);
        if response.is_success() {
            self.set_state(&repo.repository_id, StagingType::Dropped);
        }
        Ok(response)
    }

    fn fetch_activity_log(&self, repo: &StagingRepositoryProfile) -> Result<Vec<StagingActivity>> {
        self.record("fetch_activity_log");
        let mut logs = self.activity_logs.borrow_mut();
        let Some(queue) = logs.get_mut(&repo.repository_id) else {
            return Ok(Vec::new());
        };
        let log = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };
        Ok(log)
    }

    fn upload_bundle(&self, bundle_dir: &Path, repo: &StagingRepositoryProfile) -> Result<()> {
        self.record("upload_bundle");
        match self.upload_results.borrow_mut().pop_front().flatten() {
            None => Ok(()),
            Some(status) => Err(StagingError::Http {
                method: "PUT".to_string(),
                url: format!(
                    "https://nexus.example.com/staging/deployByRepositoryId/{}/{}",
                    repo.repository_id,
                    bundle_dir.display()
                ),
                status,
                body: format!("HTTP {status}"),
            }),
        }
    }
}

/// Records requested sleeps instead of blocking.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    pub slept: Rc<RefCell<Vec<Duration>>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

impl RecordingSleeper {
    pub fn count(&self) -> usize {
        self.slept.borrow().len()
    }

    pub fn total(&self) -> Duration {
        self.slept.borrow().iter().sum()
    }
}

/// Collects progress lines reported by the driver.
#[derive(Clone, Default)]
pub struct ProgressLog {
    pub lines: Rc<RefCell<Vec<Progress>>>,
}

impl ProgressLog {
    pub fn handler(&self) -> impl Fn(&Progress) + 'static {
        let lines = Rc::clone(&self.lines);
        move |progress: &Progress| lines.borrow_mut().push(progress.clone())
    }

    pub fn activity_lines(&self) -> usize {
        self.lines.borrow().iter().filter(|p| p.is_activity()).count()
    }

    pub fn event_lines(&self) -> usize {
        self.lines.borrow().iter().filter(|p| !p.is_activity()).count()
    }
}
