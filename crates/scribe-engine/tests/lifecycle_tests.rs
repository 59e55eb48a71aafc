//! End-to-end job lifecycle scenarios against the engine facade.

use pretty_assertions::{assert_eq, assert_ne};
use scribe_engine::{
    EngineConfig, EngineError, Job, JobStatus, Section, TransitionError,
};
use scribe_engine::pricing::PricingEstimate;
use scribe_engine::GenerationRequest;
use scribe_test_utils::{
    engine_with, test_manuscript, test_project, wait_for, wait_for_terminal, GatedProvider,
    ScriptedProvider,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn both_sections_succeed() {
    let provider = Arc::new(ScriptedProvider::new());
    let (engine, manuscripts) = engine_with(EngineConfig::new(), provider.clone());

    let job = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(
                vec![Section::Introduction, Section::Methods],
                "trial notes",
            ),
        )
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.progress_percent, 0);

    let done = wait_for_terminal(&engine, job.id).await;
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.run_count, 2);
    assert_eq!(done.progress_percent, 100);
    assert!(done.current_section.is_none());
    assert!(done.error_detail.is_none());
    assert!(done.started_at.is_some());
    assert!(done.completed_at.is_some());

    assert_eq!(provider.calls(), vec![Section::Introduction, Section::Methods]);
    assert!(manuscripts
        .section_text(&test_project(), &test_manuscript(), Section::Introduction)
        .is_some());
    assert!(manuscripts
        .section_text(&test_project(), &test_manuscript(), Section::Methods)
        .is_some());
}

#[tokio::test]
async fn methods_failure_after_introduction_succeeds() {
    let provider =
        Arc::new(ScriptedProvider::new().fail_on(Section::Methods, "backend unavailable"));
    let (engine, manuscripts) = engine_with(EngineConfig::new(), provider);

    let job = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(
                vec![Section::Introduction, Section::Methods],
                "trial notes",
            ),
        )
        .await
        .unwrap();

    let failed = wait_for_terminal(&engine, job.id).await;
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.run_count, 1);
    assert!(failed
        .error_detail
        .as_deref()
        .unwrap()
        .contains("backend unavailable"));

    // Introduction stays persisted, methods never landed.
    assert!(manuscripts
        .section_text(&test_project(), &test_manuscript(), Section::Introduction)
        .is_some());
    assert!(manuscripts
        .section_text(&test_project(), &test_manuscript(), Section::Methods)
        .is_none());
}

#[tokio::test]
async fn progress_is_monotonic_while_running() {
    let provider = Arc::new(ScriptedProvider::new().with_delay(Duration::from_millis(10)));
    let (engine, _manuscripts) = engine_with(EngineConfig::new(), provider);

    let job = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(
                vec![Section::Introduction, Section::Methods, Section::Results],
                "notes",
            ),
        )
        .await
        .unwrap();

    let mut observed = vec![0u8];
    loop {
        let snapshot = engine.get_job(job.id).unwrap();
        observed.push(snapshot.progress_percent);
        if snapshot.status.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let mut sorted = observed.clone();
    sorted.sort_unstable();
    assert_eq!(observed, sorted, "progress went backwards: {observed:?}");
    assert_eq!(*observed.last().unwrap(), 100);
}

#[tokio::test]
async fn cancelling_a_queued_job_finalizes_immediately() {
    let (engine, _manuscripts) = engine_with(EngineConfig::new(), Arc::new(ScriptedProvider::new()));

    // Insert directly so no executor is racing with the cancel.
    let queued = engine.store().insert(Job::new(
        test_project(),
        test_manuscript(),
        vec![Section::Introduction],
        "notes",
        PricingEstimate::zero("test-model"),
    ));

    let cancelled = engine.cancel(queued.id).unwrap();
    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert_eq!(cancelled.run_count, 0);
    assert!(cancelled.cancel_requested);
}

#[tokio::test]
async fn cancelling_a_running_job_stops_at_the_section_boundary() {
    let provider = Arc::new(GatedProvider::new());
    provider.hold(Section::Introduction);
    let (engine, manuscripts) = engine_with(EngineConfig::new(), provider.clone());

    let job = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(
                vec![Section::Introduction, Section::Methods],
                "notes",
            ),
        )
        .await
        .unwrap();

    // Wait until the executor is parked inside the introduction call.
    wait_for(&engine, job.id, |j| {
        j.current_section == Some(Section::Introduction)
    })
    .await;

    let requested = engine.cancel(job.id).unwrap();
    assert_eq!(requested.status, JobStatus::CancelRequested);

    // The in-flight section finishes; the next one never starts.
    provider.release(Section::Introduction);
    let cancelled = wait_for_terminal(&engine, job.id).await;
    assert_eq!(cancelled.status, JobStatus::Cancelled);
    assert_eq!(cancelled.run_count, 1);
    assert!(manuscripts
        .section_text(&test_project(), &test_manuscript(), Section::Methods)
        .is_none());
}

#[tokio::test]
async fn cancelling_a_completed_job_is_rejected() {
    let (engine, _manuscripts) = engine_with(EngineConfig::new(), Arc::new(ScriptedProvider::new()));

    let job = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(vec![Section::Introduction], "notes"),
        )
        .await
        .unwrap();
    wait_for_terminal(&engine, job.id).await;

    let err = engine.cancel(job.id).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Transition(TransitionError::NotCancellable { .. })
    ));
}

#[tokio::test]
async fn retrying_a_failed_job_links_and_replays() {
    let provider = Arc::new(ScriptedProvider::new().fail_on(Section::Methods, "flaky"));
    let (engine, _manuscripts) = engine_with(EngineConfig::new(), provider);

    let source = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(
                vec![Section::Introduction, Section::Methods],
                "notes",
            ),
        )
        .await
        .unwrap();
    let failed = wait_for_terminal(&engine, source.id).await;
    assert_eq!(failed.status, JobStatus::Failed);

    let retry = engine.retry(source.id).await.unwrap();
    assert_ne!(retry.id, source.id);
    assert_eq!(retry.parent_job_id, Some(source.id));
    assert_eq!(retry.sections, source.sections);
    assert_eq!(retry.notes_context, source.notes_context);
    assert_eq!(retry.run_count, 0);

    // Source job is left untouched.
    let source_after = engine.get_job(source.id).unwrap();
    assert_eq!(source_after.status, JobStatus::Failed);
    assert!(source_after.parent_job_id.is_none());

    wait_for_terminal(&engine, retry.id).await;
}

#[tokio::test]
async fn retrying_a_running_job_is_rejected() {
    let provider = Arc::new(GatedProvider::new());
    provider.hold(Section::Introduction);
    let (engine, _manuscripts) = engine_with(EngineConfig::new(), provider.clone());

    let job = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(vec![Section::Introduction], "notes"),
        )
        .await
        .unwrap();
    wait_for(&engine, job.id, |j| j.status == JobStatus::Running).await;

    let err = engine.retry(job.id).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Transition(TransitionError::NotRetryable {
            status: JobStatus::Running,
            ..
        })
    ));

    provider.release(Section::Introduction);
    wait_for_terminal(&engine, job.id).await;
}

#[tokio::test]
async fn retrying_a_completed_job_is_rejected() {
    let (engine, _manuscripts) = engine_with(EngineConfig::new(), Arc::new(ScriptedProvider::new()));

    let job = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(vec![Section::Discussion], "notes"),
        )
        .await
        .unwrap();
    wait_for_terminal(&engine, job.id).await;

    let err = engine.retry(job.id).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Transition(TransitionError::NotRetryable {
            status: JobStatus::Completed,
            ..
        })
    ));
}

#[tokio::test]
async fn second_submission_for_a_busy_manuscript_is_rejected() {
    let provider = Arc::new(GatedProvider::new());
    provider.hold(Section::Introduction);
    let (engine, _manuscripts) = engine_with(EngineConfig::new(), provider.clone());

    let first = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(vec![Section::Introduction], "notes"),
        )
        .await
        .unwrap();

    let err = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(vec![Section::Methods], "notes"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "MANUSCRIPT_BUSY");

    // A different manuscript in the same project runs concurrently.
    let other = engine
        .submit(
            test_project(),
            scribe_engine::ManuscriptId::new("ms-2"),
            GenerationRequest::new(vec![Section::Methods], "notes"),
        )
        .await
        .unwrap();
    wait_for_terminal(&engine, other.id).await;

    provider.release(Section::Introduction);
    wait_for_terminal(&engine, first.id).await;
}

#[tokio::test]
async fn listing_returns_newest_first() {
    let (engine, _manuscripts) = engine_with(EngineConfig::new(), Arc::new(ScriptedProvider::new()));

    let first = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(vec![Section::Introduction], "notes"),
        )
        .await
        .unwrap();
    wait_for_terminal(&engine, first.id).await;

    let second = engine
        .submit(
            test_project(),
            test_manuscript(),
            GenerationRequest::new(vec![Section::Methods], "notes"),
        )
        .await
        .unwrap();
    wait_for_terminal(&engine, second.id).await;

    let listed = engine.list_jobs(&test_manuscript(), 10);
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);

    let limited = engine.list_jobs(&test_manuscript(), 1);
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, second.id);
}

#[tokio::test]
async fn unknown_job_id_reports_not_found() {
    let (engine, _manuscripts) = engine_with(EngineConfig::new(), Arc::new(ScriptedProvider::new()));
    let missing = scribe_engine::JobId::new();

    assert_eq!(
        engine.get_job(missing).unwrap_err(),
        EngineError::JobNotFound(missing)
    );
    assert!(matches!(
        engine.cancel(missing).unwrap_err(),
        EngineError::JobNotFound(_)
    ));
    assert!(matches!(
        engine.retry(missing).await.unwrap_err(),
        EngineError::JobNotFound(_)
    ));
}
