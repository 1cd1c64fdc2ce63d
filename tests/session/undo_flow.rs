use aligntool::error::SessionError;
use aligntool::presentation::NotificationKind;

use super::session_harness::{A, B, C, ProbeWorkspace, abc_workspace, fixture, frame, select_abc};

#[tokio::test]
async fn undo_restores_exact_snapshots_once() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    select_abc(&fx.coordinator);
    fx.coordinator.submit().await.unwrap();

    fx.coordinator.undo().await.unwrap();

    assert_eq!(fx.workspace().frame_of(B), Some(frame(2.0)));
    assert_eq!(fx.workspace().frame_of(C), Some(frame(3.0)));
    assert_eq!(fx.workspace().frame_of(A), Some(frame(1.0)));
    assert!(matches!(
        fx.coordinator.undo().await,
        Err(SessionError::NothingToUndo)
    ));
    assert_eq!(fx.presenter.last_undo_label(), Some(None));
}

#[tokio::test]
async fn undo_announces_label() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    select_abc(&fx.coordinator);
    fx.coordinator.submit().await.unwrap();

    fx.coordinator.undo().await.unwrap();

    assert!(fx.presenter.notifications().contains(&(
        NotificationKind::Success,
        "Alignment Ref: A - Aligned: B, C undone".to_string()
    )));
}

#[tokio::test]
async fn new_alignment_replaces_undo_entry() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    fx.coordinator.set_reference(A).unwrap();
    fx.coordinator.toggle_target(B).unwrap();
    fx.coordinator.submit().await.unwrap();

    fx.coordinator.set_reference(A).unwrap();
    fx.coordinator.toggle_target(C).unwrap();
    fx.coordinator.submit().await.unwrap();

    let record = fx.coordinator.undo().await.unwrap();
    assert_eq!(record.target_ids(), vec![C]);
    // Only the latest alignment is undoable.
    assert_eq!(fx.workspace().frame_of(B), Some(frame(1.0)));
    assert_eq!(fx.workspace().frame_of(C), Some(frame(3.0)));
}

#[tokio::test]
async fn failed_undo_keeps_entry_and_reports_targets() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    select_abc(&fx.coordinator);
    fx.coordinator.submit().await.unwrap();
    fx.workspace().set_locked(C, true);

    let err = fx.coordinator.undo().await.unwrap_err();

    assert!(matches!(err, SessionError::UndoFailed { .. }));
    assert_eq!(err.failed_targets(), vec![C]);
    assert!(fx.coordinator.last_alignment().is_some());
    assert_eq!(
        fx.presenter.last_undo_label(),
        Some(Some("Ref: A - Aligned: B, C".to_string()))
    );

    fx.workspace().set_locked(C, false);
    fx.coordinator.undo().await.unwrap();
    assert_eq!(fx.workspace().frame_of(C), Some(frame(3.0)));
}

#[tokio::test]
async fn undo_after_partial_failure_restores_only_aligned_targets() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    fx.workspace().set_locked(C, true);
    select_abc(&fx.coordinator);
    let _ = fx.coordinator.submit().await.unwrap_err();
    fx.workspace().set_locked(C, false);

    let record = fx.coordinator.undo().await.unwrap();

    assert_eq!(record.target_ids(), vec![B]);
    assert_eq!(fx.workspace().frame_of(B), Some(frame(2.0)));
}

#[tokio::test]
async fn undo_skips_target_removed_from_workspace() {
    let fx = fixture(ProbeWorkspace::new(abc_workspace())).await;
    select_abc(&fx.coordinator);
    fx.coordinator.submit().await.unwrap();

    fx.workspace().remove(C);
    fx.coordinator.on_list_changed(fx.workspace().summaries());

    let record = fx.coordinator.undo().await.unwrap();

    assert_eq!(record.target_ids(), vec![B, C]);
    assert_eq!(fx.workspace().frame_of(B), Some(frame(2.0)));
    assert!(fx.coordinator.last_alignment().is_none());
    assert!(matches!(
        fx.coordinator.undo().await,
        Err(SessionError::NothingToUndo)
    ));
    assert_eq!(fx.presenter.last_undo_label(), Some(None));
}
