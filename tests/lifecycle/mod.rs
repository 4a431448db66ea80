//! End-to-end lifecycle scenarios against a scripted staging suite.

mod common;

use std::path::Path;
use std::time::Duration;

use stagectl::models::activity::{EVENT_REPOSITORY_CLOSED, EVENT_REPOSITORY_RELEASED};
use stagectl::models::StagingType;
use stagectl::retry::{RetryLimit, RetryPolicy};
use stagectl::staging::StagingDriver;
use stagectl::StagingError;

use common::{activity, event, profile, repository, FakeClient, ProgressLog, RecordingSleeper};

fn fast_poll() -> RetryPolicy {
    RetryPolicy::poll_default()
        .with_intervals(Duration::from_millis(10), Duration::from_millis(40))
        .with_limit(RetryLimit::MaxWait(Duration::from_secs(5)))
}

fn driver<'a>(
    client: &'a FakeClient,
    sleeper: &RecordingSleeper,
    progress: &ProgressLog,
) -> StagingDriver<&'a FakeClient> {
    StagingDriver::new(client, profile())
        .with_poll_policy(fast_poll())
        .with_upload_policy(
            RetryPolicy::upload_default()
                .with_intervals(Duration::from_millis(10), Duration::from_millis(20)),
        )
        .with_sleeper(sleeper.clone())
        .with_progress(progress.handler())
}

fn closed_event(id: &str) -> stagectl::models::ActivityEvent {
    event(EVENT_REPOSITORY_CLOSED, 0, &[("id", id)])
}

fn released_event(id: &str) -> stagectl::models::ActivityEvent {
    event(EVENT_REPOSITORY_RELEASED, 0, &[("id", id)])
}

#[test]
fn test_close_failure_reports_failed_rule() {
    let client = FakeClient::new();
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let mut driver = driver(&client, &sleeper, &progress);

    let repo = driver.create_stage("demo 1.0.0").unwrap();
    client.script_activity(
        &repo.repository_id,
        vec![vec![activity(
            "close",
            "2024-03-01T10:00:00.000Z",
            vec![
                event("ruleEvaluate", 0, &[("typeId", "sources-staging")]),
                event(
                    "ruleFailed",
                    1,
                    &[
                        ("typeId", "sources-staging"),
                        ("failureMessage", "Missing: no sources jar found"),
                    ],
                ),
            ],
        )]],
    );

    let err = driver.close_stage(&repo).unwrap_err();
    match &err {
        StagingError::StageFailure { report } => {
            assert_eq!(report.activity, "close");
            assert_eq!(report.rule_types(), vec!["sources-staging"]);
        }
        other => panic!("expected stage failure, got {other:?}"),
    }
    assert!(err.failure_report().is_some());
    assert_eq!(client.count("fetch_activity_log"), 1);
    assert_eq!(sleeper.count(), 0);
    assert!(progress.lines.borrow().iter().any(|p| p.is_failure()));
}

#[test]
fn test_promote_requires_created_status() {
    let client = FakeClient::new();
    client.promote_status.set(200);
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let mut driver = driver(&client, &sleeper, &progress);

    let repo = repository("orgexample-1001", StagingType::Closed, "demo");
    let err = driver.promote_stage(&repo).unwrap_err();

    match err {
        StagingError::Precondition { status, body, .. } => {
            assert_eq!(status, 200);
            assert_eq!(body, "promote_staging answered 200");
        }
        other => panic!("expected precondition failure, got {other:?}"),
    }
    assert_eq!(client.count("promote_staging"), 1);
    assert_eq!(client.count("fetch_activity_log"), 0);
}

#[test]
fn test_close_succeeds_on_third_poll_with_one_summary_line() {
    let client = FakeClient::new();
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let mut driver = driver(&client, &sleeper, &progress);

    let repo = driver.create_stage("demo 1.0.0").unwrap();
    let id = repo.repository_id.clone();
    let started = "2024-03-01T10:00:00.000Z";
    let evaluate = event("ruleEvaluate", 0, &[("typeId", "pom-staging")]);
    client.script_activity(
        &id,
        vec![
            vec![],
            vec![activity("close", started, vec![evaluate.clone()])],
            vec![activity("close", started, vec![evaluate, closed_event(&id)])],
        ],
    );

    let closed = driver.close_stage(&repo).unwrap();

    assert_eq!(closed.staging_type, StagingType::Closed);
    assert_eq!(closed.repository_id, id);
    assert_eq!(repo.staging_type, StagingType::Open);
    assert_eq!(client.count("fetch_activity_log"), 3);
    assert_eq!(sleeper.count(), 2);
    assert_eq!(progress.activity_lines(), 1);
    assert_eq!(progress.event_lines(), 2);
}

#[test]
fn test_transition_requests_carry_target_and_description() {
    let client = FakeClient::new();
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let mut driver = driver(&client, &sleeper, &progress);

    let repo = driver.create_stage("demo 1.0.0").unwrap();
    let id = repo.repository_id.clone();
    client.script_activity(
        &id,
        vec![vec![activity("close", "t0", vec![closed_event(&id)])]],
    );
    driver.close_stage(&repo).unwrap();

    let bodies = client.transition_bodies.borrow();
    assert_eq!(
        bodies[0],
        (id, "abc123".to_string(), "demo 1.0.0".to_string())
    );
}

#[test]
fn test_close_and_promote() {
    let client = FakeClient::new();
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let mut driver = driver(&client, &sleeper, &progress);

    let repo = driver.create_stage("demo 1.0.0").unwrap();
    let id = repo.repository_id.clone();
    let close = activity("close", "t0", vec![closed_event(&id)]);
    let release = activity("release", "t1", vec![released_event(&id)]);
    client.script_activity(
        &id,
        vec![
            vec![close.clone()],
            vec![close.clone(), activity("release", "t1", vec![])],
            vec![close, release],
        ],
    );

    let released = driver.close_and_promote(&repo).unwrap();

    assert_eq!(released.staging_type, StagingType::Released);
    assert_eq!(client.count("finish_staging"), 1);
    assert_eq!(client.count("promote_staging"), 1);
    assert_eq!(client.count("fetch_activity_log"), 3);
    assert_eq!(progress.activity_lines(), 2);
}

#[test]
fn test_promote_of_open_repository_is_rejected_locally() {
    let client = FakeClient::new();
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let mut driver = driver(&client, &sleeper, &progress);

    let repo = repository("orgexample-1001", StagingType::Open, "demo");
    let err = driver.promote_stage(&repo).unwrap_err();

    assert!(matches!(
        err,
        StagingError::InvalidTransition {
            from: StagingType::Open,
            to: StagingType::Released,
            ..
        }
    ));
    assert!(client.calls.borrow().is_empty());
}

#[test]
fn test_drop_does_not_poll() {
    let client = FakeClient::new();
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let driver = driver(&client, &sleeper, &progress);

    let repo = driver.create_stage("demo").unwrap();
    let response = driver.drop_stage(&repo).unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(client.count("drop_staging"), 1);
    assert_eq!(client.count("fetch_activity_log"), 0);
}

#[test]
fn test_wait_budget_exhaustion() {
    let client = FakeClient::new();
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let budget = Duration::from_millis(200);
    let mut driver = driver(&client, &sleeper, &progress).with_poll_policy(
        fast_poll().with_limit(RetryLimit::MaxWait(budget)),
    );

    let repo = driver.create_stage("demo").unwrap();
    client.script_activity(
        &repo.repository_id,
        vec![vec![activity("close", "t0", vec![])]],
    );

    let err = driver.close_stage(&repo).unwrap_err();
    match err {
        StagingError::WaitExhausted { waited, last, .. } => {
            assert_eq!(waited, sleeper.total());
            assert!(waited >= budget);
            assert!(waited <= budget + Duration::from_millis(40));
            assert!(matches!(*last, StagingError::StageInProgress { .. }));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(progress.activity_lines(), 1);
}

#[test]
fn test_upload_conflict_is_not_retried() {
    let client = FakeClient::new();
    client.script_uploads(vec![Some(409)]);
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let driver = driver(&client, &sleeper, &progress);

    let repo = repository("orgexample-1001", StagingType::Open, "demo");
    let err = driver
        .upload_bundle(&repo, Path::new("target/bundle"))
        .unwrap_err();

    match err {
        StagingError::BundleAlreadyExists { repository_id, .. } => {
            assert_eq!(repository_id, "orgexample-1001")
        }
        other => panic!("expected bundle conflict, got {other:?}"),
    }
    assert_eq!(client.count("upload_bundle"), 1);
    assert_eq!(sleeper.count(), 0);
}

#[test]
fn test_upload_retries_transient_failures() {
    let client = FakeClient::new();
    client.script_uploads(vec![Some(503), Some(502), None]);
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let driver = driver(&client, &sleeper, &progress);

    let repo = repository("orgexample-1001", StagingType::Open, "demo");
    driver
        .upload_bundle(&repo, Path::new("target/bundle"))
        .unwrap();

    assert_eq!(client.count("upload_bundle"), 3);
    assert_eq!(sleeper.count(), 2);
}

#[test]
fn test_upload_client_error_is_not_retried() {
    let client = FakeClient::new();
    client.script_uploads(vec![Some(400)]);
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let driver = driver(&client, &sleeper, &progress);

    let repo = repository("orgexample-1001", StagingType::Open, "demo");
    let err = driver
        .upload_bundle(&repo, Path::new("target/bundle"))
        .unwrap_err();

    assert!(matches!(err, StagingError::Http { status: 400, .. }));
    assert_eq!(client.count("upload_bundle"), 1);
}

#[test]
fn test_connect_selects_profile_by_name() {
    let client = FakeClient::new();
    let driver = StagingDriver::connect(&client, "org.example").unwrap();
    assert_eq!(driver.profile().id, common::PROFILE_ID);

    let err = StagingDriver::connect(&client, "com.missing").err().unwrap();
    assert!(matches!(err, StagingError::ProfileNotFound(name) if name == "com.missing"));
}

#[test]
fn test_open_or_create_reuses_single_open_repository() {
    let client = FakeClient::new().with_repositories(vec![
        repository("orgexample-0900", StagingType::Released, "demo"),
        repository("orgexample-0901", StagingType::Open, "demo"),
        repository("orgexample-0902", StagingType::Open, "other"),
    ]);
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let driver = driver(&client, &sleeper, &progress);

    let repo = driver.open_or_create("demo").unwrap();
    assert_eq!(repo.repository_id, "orgexample-0901");
    assert_eq!(client.count("start_staging"), 0);

    let created = driver.open_or_create("fresh").unwrap();
    assert_eq!(created.repository_id, "orgexample-1001");
    assert_eq!(client.count("start_staging"), 1);
}

#[test]
fn test_open_or_create_rejects_ambiguous_description() {
    let client = FakeClient::new().with_repositories(vec![
        repository("orgexample-0901", StagingType::Open, "demo"),
        repository("orgexample-0902", StagingType::Open, "demo"),
    ]);
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let driver = driver(&client, &sleeper, &progress);

    let err = driver.open_or_create("demo").unwrap_err();
    assert!(matches!(err, StagingError::AmbiguousRepository { count: 2, .. }));
}

#[test]
fn test_prepare_drops_unreleased_repositories_with_same_description() {
    let client = FakeClient::new().with_repositories(vec![
        repository("orgexample-0900", StagingType::Released, "demo"),
        repository("orgexample-0901", StagingType::Open, "demo"),
        repository("orgexample-0902", StagingType::Closed, "demo"),
        repository("orgexample-0903", StagingType::Open, "other"),
    ]);
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let driver = driver(&client, &sleeper, &progress);

    let repo = driver.prepare("demo").unwrap();

    assert_eq!(repo.repository_id, "orgexample-1001");
    assert!(repo.is_open());
    assert_eq!(client.count("drop_staging"), 2);
    let dropped: Vec<String> = client
        .transition_bodies
        .borrow()
        .iter()
        .map(|(id, _, _)| id.clone())
        .collect();
    assert_eq!(dropped, vec!["orgexample-0901", "orgexample-0902"]);
}

#[test]
fn test_bundle_release_runs_every_step() {
    let client = FakeClient::new();
    let id = "orgexample-1001";
    client.script_activity(
        id,
        vec![
            vec![activity("close", "t0", vec![closed_event(id)])],
            vec![
                activity("close", "t0", vec![closed_event(id)]),
                activity("release", "t1", vec![released_event(id)]),
            ],
        ],
    );
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let mut driver = driver(&client, &sleeper, &progress);

    let released = driver
        .bundle_release("demo 1.0.0", Path::new("target/bundle"))
        .unwrap();

    assert_eq!(released.repository_id, id);
    assert_eq!(released.staging_type, StagingType::Released);
    assert_eq!(
        *client.calls.borrow(),
        vec![
            "list_repository_profiles",
            "start_staging",
            "upload_bundle",
            "finish_staging",
            "fetch_activity_log",
            "promote_staging",
            "fetch_activity_log",
        ]
    );
}

#[test]
fn test_release_all_uses_fresh_monitor_per_repository() {
    let client = FakeClient::new().with_repositories(vec![
        repository("orgexample-0901", StagingType::Open, "demo 1.0"),
        repository("orgexample-0902", StagingType::Closed, "demo 1.1"),
        repository("orgexample-0903", StagingType::Open, "unrelated"),
        repository("orgexample-0904", StagingType::Released, "demo 0.9"),
    ]);
    // Both repositories report activities with the same start time.
    client.script_activity(
        "orgexample-0901",
        vec![
            vec![activity("close", "t0", vec![closed_event("orgexample-0901")])],
            vec![activity("release", "t0", vec![released_event("orgexample-0901")])],
        ],
    );
    client.script_activity(
        "orgexample-0902",
        vec![vec![activity(
            "release",
            "t0",
            vec![released_event("orgexample-0902")],
        )]],
    );
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let mut driver = driver(&client, &sleeper, &progress);

    let released = driver.release_all(Some("demo")).unwrap();

    let ids: Vec<&str> = released.iter().map(|r| r.repository_id.as_str()).collect();
    assert_eq!(ids, vec!["orgexample-0901", "orgexample-0902"]);
    assert_eq!(client.count("finish_staging"), 1);
    assert_eq!(client.count("promote_staging"), 2);
    assert_eq!(progress.activity_lines(), 2);
}

#[test]
fn test_drop_all_skips_terminal_repositories() {
    let client = FakeClient::new().with_repositories(vec![
        repository("orgexample-0901", StagingType::Open, "demo"),
        repository("orgexample-0902", StagingType::Closed, "demo"),
        repository("orgexample-0903", StagingType::Released, "demo"),
        repository("orgexample-0904", StagingType::Dropped, "demo"),
    ]);
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let driver = driver(&client, &sleeper, &progress);

    let dropped = driver.drop_all(None).unwrap();

    assert_eq!(dropped.len(), 2);
    assert!(dropped.iter().all(|r| r.staging_type == StagingType::Dropped));
    assert_eq!(client.count("drop_staging"), 2);
}

#[test]
fn test_find_repository() {
    let client = FakeClient::new().with_repositories(vec![repository(
        "orgexample-0901",
        StagingType::Open,
        "demo",
    )]);
    let sleeper = RecordingSleeper::default();
    let progress = ProgressLog::default();
    let driver = driver(&client, &sleeper, &progress);

    assert!(driver.find_repository("orgexample-0901").is_ok());
    assert!(matches!(
        driver.find_repository("orgexample-0999"),
        Err(StagingError::RepositoryNotFound(_))
    ));
}
