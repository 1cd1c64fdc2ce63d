use aligntool::error::SessionError;
use aligntool::presentation::{NotificationKind, SessionEvent};
use aligntool::session::SubmissionState;

use super::session_harness::{A, B, C, ProbeWorkspace, abc_workspace, fixture, frame, select_abc};

#[tokio::test]
async fn abc_scenario_aligns_in_selection_order() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    select_abc(&fx.coordinator);

    let report = fx.coordinator.submit().await.unwrap();

    assert_eq!(fx.probe.align_calls(), vec![B, C]);
    assert_eq!(report.reference.id, A);
    assert_eq!(fx.workspace().frame_of(B), Some(frame(1.0)));
    assert_eq!(fx.workspace().frame_of(C), Some(frame(1.0)));

    let record = fx.coordinator.last_alignment().unwrap();
    assert_eq!(record.snapshots.len(), 2);
    assert_eq!(record.snapshots[0].frame, frame(2.0));
    assert_eq!(record.snapshots[1].frame, frame(3.0));
    assert!(fx.coordinator.selection().is_empty());
    assert_eq!(fx.coordinator.submission_state(), SubmissionState::Idle);
}

#[tokio::test]
async fn success_is_announced_to_presenter() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    select_abc(&fx.coordinator);

    fx.coordinator.submit().await.unwrap();

    assert_eq!(fx.presenter.submissions_started(), 1);
    assert_eq!(
        fx.presenter.last_undo_label(),
        Some(Some("Ref: A - Aligned: B, C".to_string()))
    );
    assert!(
        fx.presenter
            .notifications()
            .contains(&(NotificationKind::Success, "Complexes aligned!".to_string()))
    );
    let finished = fx
        .presenter
        .events()
        .into_iter()
        .find(|e| matches!(e, SessionEvent::SubmissionFinished { .. }));
    assert!(matches!(
        finished,
        Some(SessionEvent::SubmissionFinished { error: None, .. })
    ));
}

#[tokio::test]
async fn missing_reference_performs_no_work() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    fx.coordinator.toggle_target(B).unwrap();

    let err = fx.coordinator.submit().await.unwrap_err();

    assert!(matches!(err, SessionError::MissingReference));
    assert_eq!(fx.probe.fetch_count(), 0);
    assert!(fx.probe.align_calls().is_empty());
    assert!(fx.coordinator.last_alignment().is_none());
    assert_eq!(fx.presenter.submissions_started(), 0);
    assert_eq!(
        fx.presenter.notifications(),
        vec![(
            NotificationKind::Error,
            "please select a reference complex".to_string()
        )]
    );
}

#[tokio::test]
async fn empty_targets_performs_no_work() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    fx.coordinator.set_reference(A).unwrap();

    let err = fx.coordinator.submit().await.unwrap_err();

    assert!(matches!(err, SessionError::EmptyTargets));
    assert_eq!(fx.probe.fetch_count(), 0);
}

#[tokio::test]
async fn fetch_timeout_returns_to_idle_and_keeps_selection() {
    let fx = super::session_harness::fixture_with_timeout(
        ProbeWorkspace::new(abc_workspace()).hang_fetch(),
        50,
    )
    .await;
    select_abc(&fx.coordinator);

    let err = fx.coordinator.submit().await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::Timeout {
            operation: "fetch",
            timeout_ms: 50
        }
    ));
    assert_eq!(fx.coordinator.submission_state(), SubmissionState::Idle);
    assert_eq!(fx.coordinator.selection().reference_id, Some(A));
    assert!(fx.coordinator.last_alignment().is_none());
}

#[tokio::test]
async fn all_targets_failing_leaves_history_and_selection() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    fx.workspace().set_locked(B, true);
    fx.workspace().set_locked(C, true);
    select_abc(&fx.coordinator);

    let err = fx.coordinator.submit().await.unwrap_err();

    match err {
        SessionError::AllTargetsFailed { failed } => {
            assert_eq!(failed.iter().map(|f| f.id).collect::<Vec<_>>(), vec![B, C]);
        }
        other => panic!("expected AllTargetsFailed, got {other:?}"),
    }
    assert!(fx.coordinator.last_alignment().is_none());
    assert_eq!(fx.coordinator.selection().target_ids.len(), 2);
}

#[tokio::test]
async fn partial_failure_can_be_retried() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    fx.workspace().set_locked(C, true);
    select_abc(&fx.coordinator);

    let err = fx.coordinator.submit().await.unwrap_err();
    assert_eq!(err.failed_targets(), vec![C]);

    fx.workspace().set_locked(C, false);
    fx.coordinator.reselect_failed(A, &err.failed_targets()).unwrap();
    let report = fx.coordinator.submit().await.unwrap();

    assert_eq!(report.aligned.len(), 1);
    assert_eq!(report.aligned[0].id, C);
    assert_eq!(fx.workspace().frame_of(C), Some(frame(1.0)));
}
