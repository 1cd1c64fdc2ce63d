use crate::error::SessionError;
use crate::session::{AlignmentSummary, SelectionState, SubmissionReport};
use crate::structure::StructureSummary;
use serde::{Deserialize, Serialize};

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    Message,
    Success,
    Error,
}

/// Outcome of one `submit()`, as handed to the presentation layer.
pub type SubmissionResult = Result<SubmissionReport, SessionError>;

/// Receives everything the session wants redrawn or announced.
///
/// Implementations must not call back into the coordinator.
pub trait Presenter: Send + Sync {
    /// The directory's list changed; selection widgets should be rebuilt.
    fn on_available_changed(&self, _available: &[StructureSummary]) {}

    fn on_selection_changed(&self, selection: &SelectionState);

    /// Submit control should be disabled until the matching result arrives.
    fn on_submission_started(&self);

    fn on_submission_result(&self, result: &SubmissionResult);

    /// `Some` enables the undo control with the given label; `None` hides it.
    fn on_undo_available(&self, summary: Option<&AlignmentSummary>);

    fn notify(&self, kind: NotificationKind, message: &str);

    /// Human-readable name of this presenter
    fn name(&self) -> &str;
}
