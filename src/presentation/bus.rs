use super::traits::{NotificationKind, Presenter, SubmissionResult};
use crate::session::{AlignmentSummary, SelectionState};
use crate::structure::{StructureId, StructureSummary};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Session changes published for remote or decoupled front ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    AvailableChanged {
        available: Vec<StructureSummary>,
    },
    SelectionChanged {
        selection: SelectionState,
    },
    SubmissionStarted,
    SubmissionFinished {
        summary: Option<String>,
        error: Option<String>,
        failed: Vec<StructureId>,
    },
    UndoAvailable {
        summary: Option<AlignmentSummary>,
    },
    Notification {
        level: NotificationKind,
        message: String,
    },
}

pub type SessionEventSender = broadcast::Sender<SessionEvent>;
pub type SessionEventReceiver = broadcast::Receiver<SessionEvent>;

/// Presenter that forwards every callback onto a broadcast bus.
pub struct EventBusPresenter {
    events: SessionEventSender,
}

impl EventBusPresenter {
    pub fn new(capacity: usize) -> (Self, SessionEventReceiver) {
        let (events, rx) = broadcast::channel(capacity);
        (Self { events }, rx)
    }

    pub fn subscribe(&self) -> SessionEventReceiver {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

impl Presenter for EventBusPresenter {
    fn on_available_changed(&self, available: &[StructureSummary]) {
        self.publish(SessionEvent::AvailableChanged {
            available: available.to_vec(),
        });
    }

    fn on_selection_changed(&self, selection: &SelectionState) {
        self.publish(SessionEvent::SelectionChanged {
            selection: selection.clone(),
        });
    }

    fn on_submission_started(&self) {
        self.publish(SessionEvent::SubmissionStarted);
    }

    fn on_submission_result(&self, result: &SubmissionResult) {
        let event = match result {
            Ok(report) => SessionEvent::SubmissionFinished {
                summary: Some(report.summary.full_text().to_string()),
                error: None,
                failed: Vec::new(),
            },
            Err(e) => SessionEvent::SubmissionFinished {
                summary: None,
                error: Some(e.to_string()),
                failed: e.failed_targets(),
            },
        };
        self.publish(event);
    }

    fn on_undo_available(&self, summary: Option<&AlignmentSummary>) {
        self.publish(SessionEvent::UndoAvailable {
            summary: summary.cloned(),
        });
    }

    fn notify(&self, kind: NotificationKind, message: &str) {
        self.publish(SessionEvent::Notification {
            level: kind,
            message: message.to_string(),
        });
    }

    fn name(&self) -> &str {
        "event_bus"
    }
}
