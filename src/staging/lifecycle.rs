use std::path::Path;
use std::time::Duration;

use tracing::{error, info, warn};

use super::StagingDriver;
use crate::client::{RawResponse, StagingClient};
use crate::error::{Result, StagingError};
use crate::models::{StagingActivity, StagingRepositoryProfile};
use crate::retry::{ErrorClass, Outcome, Retry, RetryContext, RetryError};

/// Seconds with one decimal, so sub-second waits do not print as `0s`.
pub(super) fn format_wait(wait: Duration) -> String {
    format!("{:.1}s", wait.as_secs_f64())
}

/// Decide whether a poll is done by looking at the most recent activity only.
pub(super) fn classify_latest(
    activities: &[StagingActivity],
    operation: &str,
    is_done: &dyn Fn(&StagingActivity) -> bool,
) -> Outcome<StagingError> {
    let Some(latest) = activities.last() else {
        return Outcome::Retryable(StagingError::StageInProgress {
            activity: operation.to_string(),
        });
    };

    if is_done(latest) {
        Outcome::Succeeded
    } else if latest.contains_error() {
        Outcome::NonRetryable(StagingError::StageFailure {
            report: latest.failure_report(),
        })
    } else {
        Outcome::Retryable(StagingError::StageInProgress {
            activity: latest.name.clone(),
        })
    }
}

impl<C: StagingClient> StagingDriver<C> {
    /// Open a new staging repository. Not retried: a start is not idempotent.
    pub fn create_stage(&self, description: &str) -> Result<StagingRepositoryProfile> {
        let repo = self.client.start_staging(&self.profile, description)?;
        info!("Created staging repository {repo}");
        Ok(repo)
    }

    /// Close `repo` and wait until the server reports it closed.
    pub fn close_stage(
        &mut self,
        repo: &StagingRepositoryProfile,
    ) -> Result<StagingRepositoryProfile> {
        let closed = repo.to_closed()?;

        info!("Closing {}", repo.repository_id);
        let response = self.client.finish_staging(&self.profile, repo)?;
        if !response.is_success() {
            return Err(precondition("close repository", repo, response));
        }

        let id = repo.repository_id.as_str();
        self.wait_for_stage_completion("close", repo, &|a: &StagingActivity| {
            a.is_close_succeeded(id)
        })?;
        info!("Closed {}", repo.repository_id);
        Ok(closed)
    }

    /// Promote a closed `repo` and wait until the server reports it released.
    ///
    /// The promote request must be answered with 201 Created; any other status
    /// fails before the activity log is ever queried.
    pub fn promote_stage(
        &mut self,
        repo: &StagingRepositoryProfile,
    ) -> Result<StagingRepositoryProfile> {
        let released = repo.to_released()?;

        info!("Promoting {}", repo.repository_id);
        let response = self.client.promote_staging(&self.profile, repo)?;
        if !response.is_created() {
            return Err(precondition("promote repository", repo, response));
        }

        let id = repo.repository_id.as_str();
        self.wait_for_stage_completion("promote", repo, &|a: &StagingActivity| {
            a.is_release_succeeded(id)
        })?;
        info!("Released {}", repo.repository_id);
        Ok(released)
    }

    /// Send a drop request and return the raw answer without polling.
    pub fn drop_stage(&self, repo: &StagingRepositoryProfile) -> Result<RawResponse> {
        repo.to_dropped()?;

        info!("Dropping {}", repo.repository_id);
        let response = self.client.drop_staging(&self.profile, repo)?;
        if !response.is_success() {
            warn!(
                "Drop of {} returned HTTP {}: {}",
                repo.repository_id, response.status, response.body
            );
        }
        Ok(response)
    }

    /// Close (unless already closed) and then promote.
    pub fn close_and_promote(
        &mut self,
        repo: &StagingRepositoryProfile,
    ) -> Result<StagingRepositoryProfile> {
        let closed = if repo.is_closed() {
            repo.clone()
        } else {
            self.close_stage(repo)?
        };
        self.promote_stage(&closed)
    }

    /// Upload a local bundle directory into `repo`.
    ///
    /// Transient failures are retried under the upload policy. A conflict
    /// means the artifacts are already there and is never retried.
    pub fn upload_bundle(&self, repo: &StagingRepositoryProfile, bundle_dir: &Path) -> Result<()> {
        let repository_id = repo.repository_id.clone();
        let observer = |ctx: &RetryContext<'_, StagingError>| {
            warn!(
                "Upload to {} failed (attempt {}): {}. Retrying in {}",
                repository_id,
                ctx.attempt,
                ctx.last_error,
                format_wait(ctx.next_wait)
            );
        };

        let result = Retry::new(self.upload.clone())
            .classify_error(|e: StagingError| {
                if e.is_conflict() {
                    ErrorClass::NonRetryable(StagingError::BundleAlreadyExists {
                        repository_id: repository_id.clone(),
                        message: e.to_string(),
                    })
                } else if e.is_transient() {
                    ErrorClass::Retryable(e)
                } else {
                    ErrorClass::NonRetryable(e)
                }
            })
            .observer(&observer)
            .sleeper(self.sleeper.as_ref())
            .run(|| self.client.upload_bundle(bundle_dir, repo))
            .map_err(RetryError::into_inner);
        result
    }

    /// Poll the activity log until `is_done` holds for the latest activity.
    ///
    /// Every poll fetches the full log and passes it through the monitor so
    /// only new activities and events are reported.
    fn wait_for_stage_completion(
        &mut self,
        operation: &str,
        repo: &StagingRepositoryProfile,
        is_done: &dyn Fn(&StagingActivity) -> bool,
    ) -> Result<()> {
        let client = &self.client;
        let monitor = &mut self.monitor;
        let on_progress = &self.on_progress;
        let repository_id = repo.repository_id.as_str();

        let observer = |ctx: &RetryContext<'_, StagingError>| match ctx.last_error {
            StagingError::StageInProgress { activity } => info!(
                "Waiting for {activity} of {repository_id} to complete, checking again in {}",
                format_wait(ctx.next_wait)
            ),
            other => warn!(
                "Failed to {operation} {repository_id} (attempt {}): {other}",
                ctx.attempt
            ),
        };

        let result = Retry::new(self.poll.clone())
            .classify_value(|activities: &Vec<StagingActivity>| {
                classify_latest(activities, operation, is_done)
            })
            .classify_error(ErrorClass::NonRetryable)
            .observer(&observer)
            .sleeper(self.sleeper.as_ref())
            .run(|| {
                let activities = client.fetch_activity_log(repo)?;
                for progress in monitor.report(&activities) {
                    on_progress(&progress);
                }
                Ok(activities)
            });

        match result {
            Ok(_) => Ok(()),
            Err(RetryError::Aborted(err)) => {
                if let Some(report) = err.failure_report() {
                    for line in report.to_string().lines() {
                        error!("{line}");
                    }
                }
                Err(err)
            }
            Err(RetryError::Exhausted {
                attempts,
                waited,
                last,
            }) => {
                error!(
                    "Gave up waiting for {operation} of {repository_id} after {}s",
                    waited.as_secs()
                );
                Err(StagingError::WaitExhausted {
                    operation: format!("{operation} {repository_id}"),
                    attempts,
                    waited,
                    last: Box::new(last),
                })
            }
        }
    }
}

fn precondition(
    operation: &str,
    repo: &StagingRepositoryProfile,
    response: RawResponse,
) -> StagingError {
    error!(
        "Failed to {operation} {}: HTTP {} {}",
        repo.repository_id, response.status, response.body
    );
    StagingError::Precondition {
        operation: operation.to_string(),
        status: response.status,
        body: response.body,
    }
}
