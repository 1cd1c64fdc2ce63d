use super::template::ConfirmationTemplate;
use super::traits::{NotificationKind, Presenter, SubmissionResult};
use crate::session::{AlignmentSummary, SelectionState};
use crate::structure::StructureSummary;
use tracing::{info, warn};

/// Presenter that reports every session change through `tracing`.
pub struct LogPresenter {
    confirmation: ConfirmationTemplate,
}

impl LogPresenter {
    pub fn new(confirmation: ConfirmationTemplate) -> Self {
        Self { confirmation }
    }
}

impl Default for LogPresenter {
    fn default() -> Self {
        Self::new(ConfirmationTemplate::default())
    }
}

impl Presenter for LogPresenter {
    fn on_available_changed(&self, available: &[StructureSummary]) {
        info!(count = available.len(), "presenter.available_changed");
    }

    fn on_selection_changed(&self, selection: &SelectionState) {
        let reference = selection
            .reference_id
            .map_or_else(|| "none".to_string(), |id| id.to_string());
        info!(
            reference = %reference,
            targets = selection.target_ids.len(),
            "presenter.selection_changed"
        );
    }

    fn on_submission_started(&self) {
        info!("presenter.submission_started");
    }

    fn on_submission_result(&self, result: &SubmissionResult) {
        match result {
            Ok(report) => {
                let targets: Vec<String> = report.aligned.iter().map(|t| t.name.clone()).collect();
                match self.confirmation.render(&report.reference.name, &targets) {
                    Ok(message) => info!(message = %message, "presenter.confirmation"),
                    Err(e) => warn!(error = %e, "presenter.confirmation_render_failed"),
                }
            }
            Err(e) => warn!(error = %e, "presenter.submission_failed"),
        }
    }

    fn on_undo_available(&self, summary: Option<&AlignmentSummary>) {
        match summary {
            Some(summary) => info!(label = %summary.label, "presenter.undo_enabled"),
            None => info!("presenter.undo_disabled"),
        }
    }

    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Error => warn!(kind = %kind, message = %message, "notification"),
            _ => info!(kind = %kind, message = %message, "notification"),
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
