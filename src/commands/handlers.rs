use super::types::{Command, CommandResult};
use crate::app::status::{render_available, render_status};
use crate::error::SessionError;
use crate::presentation::ConfirmationTemplate;
use crate::session::{AlignmentCoordinator, SubmissionReport};
use crate::structure::{Frame, InMemoryWorkspace, StructureId, StructureRef};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

const HELP_TEXT: &str = "\
Commands:
  /list                 Show available structures
  /ref <id>             Choose the reference structure
  /target <id>          Add or remove a target structure
  /submit               Align the targets to the reference
  /retry                Reselect the targets that failed last time
  /undo                 Undo the last alignment
  /status               Show selection and undo state
  /add <id> <name>      Add a structure to the workspace
  /remove <id>          Remove a structure from the workspace
  /reset <id>           Put a structure back to its load-time frame
  /help                 Show this help
  /quit                 Leave the session";

/// Everything a slash command can act on.
pub struct SessionContext {
    pub coordinator: Arc<AlignmentCoordinator>,
    pub workspace: Arc<InMemoryWorkspace>,
    pub confirmation: ConfirmationTemplate,
    pub notify_on_success: bool,
    /// Reference and failed targets of the last partial alignment.
    retry: Mutex<Option<(StructureId, Vec<StructureId>)>>,
}

impl SessionContext {
    pub fn new(
        coordinator: Arc<AlignmentCoordinator>,
        workspace: Arc<InMemoryWorkspace>,
        confirmation: ConfirmationTemplate,
        notify_on_success: bool,
    ) -> Self {
        Self {
            coordinator,
            workspace,
            confirmation,
            notify_on_success,
            retry: Mutex::new(None),
        }
    }

    fn set_retry(&self, value: Option<(StructureId, Vec<StructureId>)>) {
        *self.retry.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    fn take_retry(&self) -> Option<(StructureId, Vec<StructureId>)> {
        self.retry.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn label(&self, id: StructureId) -> String {
        match self.coordinator.display_name(id) {
            Some(name) => format!("{name} ({id})"),
            None => id.to_string(),
        }
    }
}

pub async fn handle_command(command: Command, ctx: &SessionContext) -> CommandResult {
    match command {
        Command::List => CommandResult::visible(render_available(&ctx.coordinator)),
        Command::Reference(id) => match ctx.coordinator.set_reference(id) {
            Ok(()) => CommandResult::visible(format!("Reference: {}", ctx.label(id))),
            Err(e) => error_result(&e),
        },
        Command::Target(id) => match ctx.coordinator.toggle_target(id) {
            Ok(true) => CommandResult::visible(format!("Target added: {}", ctx.label(id))),
            Ok(false) => CommandResult::visible(format!("Target removed: {}", ctx.label(id))),
            Err(e) => error_result(&e),
        },
        Command::Submit => handle_submit(ctx).await,
        Command::Retry => handle_retry(ctx),
        Command::Undo => match ctx.coordinator.undo().await {
            Ok(record) => {
                ctx.set_retry(None);
                CommandResult::visible(format!(
                    "Alignment {} undone",
                    record.summary.full_text()
                ))
            }
            Err(e) => error_result(&e),
        },
        Command::Status => CommandResult::visible(render_status(&ctx.coordinator)),
        Command::Add { id, name } => {
            ctx.workspace
                .add(StructureRef::new(id, name.clone(), Frame::IDENTITY));
            CommandResult::visible(format!("Added {name} ({id})"))
        }
        Command::Remove(id) => {
            if ctx.workspace.remove(id) {
                CommandResult::visible(format!("Removed {id}"))
            } else {
                CommandResult::visible(format!("Error: no structure with id {id}"))
            }
        }
        Command::Reset(id) => match ctx.workspace.reset_transform(id) {
            Ok(()) => CommandResult::visible(format!("Reset {}", ctx.label(id))),
            Err(e) => CommandResult::visible(format!("Error: {e}")),
        },
        Command::Help => CommandResult::visible(HELP_TEXT),
        Command::Quit => CommandResult::exit("Bye."),
    }
}

async fn handle_submit(ctx: &SessionContext) -> CommandResult {
    let reference = ctx.coordinator.selection().reference_id;
    match ctx.coordinator.submit().await {
        Ok(report) => {
            ctx.set_retry(None);
            CommandResult::visible(success_text(ctx, &report))
        }
        Err(e @ SessionError::PartialFailure { .. }) => {
            if let Some(reference) = reference {
                ctx.set_retry(Some((reference, e.failed_targets())));
            }
            CommandResult::visible(format!("Error: {e}\nUse /retry to select the failed targets."))
        }
        Err(e) => error_result(&e),
    }
}

fn handle_retry(ctx: &SessionContext) -> CommandResult {
    let Some((reference, failed)) = ctx.take_retry() else {
        return CommandResult::visible("Nothing to retry.");
    };
    match ctx.coordinator.reselect_failed(reference, &failed) {
        Ok(selection) => CommandResult::visible(format!(
            "Reference: {}\nTargets: {}",
            ctx.label(reference),
            selection
                .target_ids
                .iter()
                .map(|id| ctx.label(*id))
                .collect::<Vec<_>>()
                .join(", ")
        )),
        Err(e) => error_result(&e),
    }
}

/// Text shown after a fully successful alignment.
pub fn success_text(ctx: &SessionContext, report: &SubmissionReport) -> String {
    if !ctx.notify_on_success {
        return report.summary.full_text().to_string();
    }
    let targets: Vec<String> = report.aligned.iter().map(|t| t.name.clone()).collect();
    match ctx.confirmation.render(&report.reference.name, &targets) {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "confirmation.render_failed");
            report.summary.full_text().to_string()
        }
    }
}

fn error_result(err: &SessionError) -> CommandResult {
    CommandResult::visible(format!("Error: {err}"))
}
