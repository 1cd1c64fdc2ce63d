use super::traits::{NotificationKind, Presenter, SubmissionResult};
use crate::session::{AlignmentSummary, SelectionState};

/// Presenter that ignores every callback.
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    #[inline(always)]
    fn on_selection_changed(&self, _selection: &SelectionState) {}

    #[inline(always)]
    fn on_submission_started(&self) {}

    #[inline(always)]
    fn on_submission_result(&self, _result: &SubmissionResult) {}

    #[inline(always)]
    fn on_undo_available(&self, _summary: Option<&AlignmentSummary>) {}

    #[inline(always)]
    fn notify(&self, _kind: NotificationKind, _message: &str) {}

    fn name(&self) -> &str {
        "noop"
    }
}
