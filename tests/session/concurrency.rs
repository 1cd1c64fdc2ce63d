use std::sync::Arc;

use aligntool::error::SessionError;
use aligntool::session::SubmissionState;

use super::session_harness::{A, B, C, ProbeWorkspace, abc_workspace, fixture, frame, select_abc};

#[tokio::test]
async fn second_submit_while_in_flight_is_rejected() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace()).gate_fetch()).await;
    select_abc(&fx.coordinator);

    let first = {
        let coordinator = Arc::clone(&fx.coordinator);
        tokio::spawn(async move { coordinator.submit().await })
    };
    let gate = fx.probe.fetch_gate.as_ref().unwrap();
    gate.wait_entered().await;
    assert_eq!(fx.coordinator.submission_state(), SubmissionState::InFlight);

    let second = fx.coordinator.submit().await;
    assert!(matches!(second, Err(SessionError::AlreadyInProgress)));

    gate.open();
    let report = first.await.unwrap().unwrap();
    assert_eq!(report.aligned.len(), 2);
    assert_eq!(fx.probe.fetch_count(), 1);
    assert_eq!(fx.coordinator.submission_state(), SubmissionState::Idle);
}

#[tokio::test]
async fn selection_is_frozen_while_in_flight() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace()).gate_fetch()).await;
    fx.coordinator.set_reference(A).unwrap();
    fx.coordinator.toggle_target(B).unwrap();

    let submit = {
        let coordinator = Arc::clone(&fx.coordinator);
        tokio::spawn(async move { coordinator.submit().await })
    };
    let gate = fx.probe.fetch_gate.as_ref().unwrap();
    gate.wait_entered().await;

    assert!(matches!(
        fx.coordinator.toggle_target(C),
        Err(SessionError::AlreadyInProgress)
    ));
    assert!(matches!(
        fx.coordinator.set_reference(C),
        Err(SessionError::AlreadyInProgress)
    ));

    gate.open();
    submit.await.unwrap().unwrap();
    assert_eq!(fx.probe.align_calls(), vec![B]);
}

#[tokio::test]
async fn undo_while_in_flight_is_rejected() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace()).gate_fetch()).await;
    let gate = fx.probe.fetch_gate.as_ref().unwrap();

    fx.coordinator.set_reference(A).unwrap();
    fx.coordinator.toggle_target(B).unwrap();
    gate.open();
    fx.coordinator.submit().await.unwrap();
    // Consume the signal left by the first pass.
    gate.wait_entered().await;

    fx.coordinator.set_reference(A).unwrap();
    fx.coordinator.toggle_target(C).unwrap();
    let submit = {
        let coordinator = Arc::clone(&fx.coordinator);
        tokio::spawn(async move { coordinator.submit().await })
    };
    gate.wait_entered().await;

    assert!(matches!(
        fx.coordinator.undo().await,
        Err(SessionError::AlreadyInProgress)
    ));

    gate.open();
    submit.await.unwrap().unwrap();
    let record = fx.coordinator.undo().await.unwrap();
    assert_eq!(record.target_ids(), vec![C]);
    assert_eq!(fx.workspace().frame_of(C), Some(frame(3.0)));
}

#[tokio::test]
async fn cancelled_submission_releases_in_flight() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace()).gate_fetch()).await;
    select_abc(&fx.coordinator);

    let submit = {
        let coordinator = Arc::clone(&fx.coordinator);
        tokio::spawn(async move { coordinator.submit().await })
    };
    fx.probe.fetch_gate.as_ref().unwrap().wait_entered().await;
    assert_eq!(fx.coordinator.submission_state(), SubmissionState::InFlight);

    submit.abort();
    assert!(submit.await.unwrap_err().is_cancelled());

    assert_eq!(fx.coordinator.submission_state(), SubmissionState::Idle);
    assert!(fx.probe.align_calls().is_empty());
    assert!(fx.coordinator.last_alignment().is_none());
    assert_eq!(fx.coordinator.selection().target_ids.len(), 2);
}

#[tokio::test]
async fn submit_while_undo_runs_is_rejected() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace()).gate_restore()).await;
    fx.coordinator.set_reference(A).unwrap();
    fx.coordinator.toggle_target(B).unwrap();
    fx.coordinator.submit().await.unwrap();

    let undo = {
        let coordinator = Arc::clone(&fx.coordinator);
        tokio::spawn(async move { coordinator.undo().await })
    };
    let gate = fx.probe.restore_gate.as_ref().unwrap();
    gate.wait_entered().await;

    fx.coordinator.set_reference(A).unwrap();
    fx.coordinator.toggle_target(C).unwrap();
    assert!(matches!(
        fx.coordinator.submit().await,
        Err(SessionError::AlreadyInProgress)
    ));
    assert!(matches!(
        fx.coordinator.undo().await,
        Err(SessionError::AlreadyInProgress)
    ));

    gate.open();
    undo.await.unwrap().unwrap();
    assert_eq!(fx.workspace().frame_of(B), Some(frame(2.0)));
    assert!(fx.coordinator.last_alignment().is_none());
}
