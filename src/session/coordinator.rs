use super::history::{AlignmentRecord, FrameSnapshot, HistoryManager};
use super::selection::{SelectionState, SelectionStore, ValidatedSelection};
use super::summary::AlignmentSummary;
use crate::config::SessionConfig;
use crate::error::{SessionError, TargetFailure};
use crate::presentation::{NotificationKind, Presenter};
use crate::structure::{
    DirectoryEvent, DirectoryReceiver, StructureDirectory, StructureId, StructureRef,
    StructureSummary, TransformService,
};
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
}

/// Result of a fully successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub sequence: u64,
    pub reference: StructureSummary,
    /// Aligned targets, in the order they were selected.
    pub aligned: Vec<StructureSummary>,
    pub summary: AlignmentSummary,
}

#[derive(Debug, Default)]
struct CoordinatorState {
    selection: SelectionStore,
    submission: SubmissionState,
    /// Display names from the directory's last reported list.
    available: IndexMap<StructureId, String>,
    /// List reported while a submission was in flight; applied on release.
    deferred_list: Option<Vec<StructureSummary>>,
}

impl CoordinatorState {
    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.submission {
            SubmissionState::Idle => Ok(()),
            SubmissionState::InFlight => Err(SessionError::AlreadyInProgress),
        }
    }

    fn ensure_available(&self, id: StructureId) -> Result<(), SessionError> {
        if self.available.contains_key(&id) {
            Ok(())
        } else {
            Err(SessionError::InvalidSelection(format!(
                "structure {id} is not available"
            )))
        }
    }

    /// Replace the cached list and drop stale selections. Returns how many
    /// selection entries were dropped.
    fn apply_list(&mut self, list: &[StructureSummary]) -> usize {
        self.available = list.iter().map(|s| (s.id, s.name.clone())).collect();
        let ids: HashSet<StructureId> = self.available.keys().copied().collect();
        self.selection.reconcile(&ids)
    }
}

/// Orchestrates one alignment session: selection, submission, undo, and
/// keeping the selection consistent with the directory's live list.
///
/// At most one submission runs at a time. The `InFlight` state is released
/// by a drop guard, so it is cleared on every exit path, including a
/// cancelled submission future.
pub struct AlignmentCoordinator {
    directory: Arc<dyn StructureDirectory>,
    transform: Arc<dyn TransformService>,
    presenter: Arc<dyn Presenter>,
    config: SessionConfig,
    history: HistoryManager,
    state: Mutex<CoordinatorState>,
}

impl AlignmentCoordinator {
    pub fn new(
        directory: Arc<dyn StructureDirectory>,
        transform: Arc<dyn TransformService>,
        presenter: Arc<dyn Presenter>,
        config: SessionConfig,
    ) -> Self {
        debug!(
            directory = directory.name(),
            presenter = presenter.name(),
            "session.created"
        );
        Self {
            directory,
            transform,
            presenter,
            config,
            history: HistoryManager::new(),
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    pub fn submission_state(&self) -> SubmissionState {
        self.lock().submission
    }

    pub fn selection(&self) -> SelectionState {
        self.lock().selection.state().clone()
    }

    /// Structures as of the last reconciled list.
    pub fn available(&self) -> Vec<StructureSummary> {
        self.lock()
            .available
            .iter()
            .map(|(id, name)| StructureSummary::new(*id, name.clone()))
            .collect()
    }

    pub fn display_name(&self, id: StructureId) -> Option<String> {
        self.lock().available.get(&id).cloned()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn last_alignment(&self) -> Option<AlignmentRecord> {
        self.history.current()
    }

    // ── Directory ───────────────────────────────────────────────

    /// Ask the directory for its current list and reconcile against it.
    pub async fn refresh(&self) -> Result<Vec<StructureSummary>, SessionError> {
        let listed = self
            .bounded("list_available", self.directory.list_available())
            .await
            .and_then(|r| r.map_err(SessionError::from));
        match listed {
            Ok(list) => {
                debug!(
                    directory = self.directory.name(),
                    count = list.len(),
                    "directory.refreshed"
                );
                self.on_list_changed(list.clone());
                Ok(list)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// The directory reported a new list. Applied immediately when idle;
    /// while a submission is in flight it is held until that submission
    /// releases, so ids are not invalidated mid-fetch.
    pub fn on_list_changed(&self, list: Vec<StructureSummary>) {
        let selection = {
            let mut state = self.lock();
            if state.submission == SubmissionState::InFlight {
                debug!(count = list.len(), "selection.reconcile_deferred");
                state.deferred_list = Some(list);
                return;
            }
            let dropped = state.apply_list(&list);
            if dropped > 0 {
                info!(dropped, "selection.reconciled");
            }
            state.selection.state().clone()
        };
        self.presenter.on_available_changed(&list);
        self.presenter.on_selection_changed(&selection);
    }

    /// Feed directory events into the session until the bus closes.
    pub async fn follow_directory(&self, mut events: DirectoryReceiver) {
        loop {
            match events.recv().await {
                Ok(DirectoryEvent::ListChanged { available }) => self.on_list_changed(available),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "directory.events_lagged");
                    if let Err(e) = self.refresh().await {
                        warn!(
                            directory = self.directory.name(),
                            error = %e,
                            "directory.resync_failed"
                        );
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    // ── Selection ───────────────────────────────────────────────

    pub fn set_reference(&self, id: StructureId) -> Result<(), SessionError> {
        self.update_selection(|state| {
            state.ensure_available(id)?;
            state.selection.set_reference(id);
            Ok(())
        })
    }

    /// Returns `true` when `id` was added, `false` when it was removed.
    pub fn toggle_target(&self, id: StructureId) -> Result<bool, SessionError> {
        self.update_selection(|state| {
            state.ensure_available(id)?;
            state.selection.toggle_target(id)
        })
    }

    pub fn clear_selection(&self) -> Result<(), SessionError> {
        self.update_selection(|state| {
            state.selection.clear();
            Ok(())
        })
    }

    /// Select `reference` again with just the `failed` targets, so a partial
    /// alignment can be retried. Ids that vanished meanwhile are skipped.
    pub fn reselect_failed(
        &self,
        reference: StructureId,
        failed: &[StructureId],
    ) -> Result<SelectionState, SessionError> {
        self.update_selection(|state| {
            state.ensure_available(reference)?;
            state.selection.clear();
            state.selection.set_reference(reference);
            for id in failed {
                if *id != reference
                    && state.available.contains_key(id)
                    && !state.selection.state().target_ids.contains(id)
                {
                    state.selection.toggle_target(*id)?;
                }
            }
            Ok(state.selection.state().clone())
        })
    }

    // ── Submission ──────────────────────────────────────────────

    /// Run one full alignment cycle over the current selection.
    ///
    /// Succeeds only when every target was aligned. When some but not all
    /// targets were aligned the record is still committed and the error is
    /// `PartialFailure`.
    pub async fn submit(&self) -> Result<SubmissionReport, SessionError> {
        let selection = {
            let mut state = self.lock();
            let validated = state
                .ensure_idle()
                .and_then(|()| {
                    if self.history.is_undoing() {
                        Err(SessionError::AlreadyInProgress)
                    } else {
                        Ok(())
                    }
                })
                .and_then(|()| state.selection.validate());
            match validated {
                Ok(selection) => {
                    state.submission = SubmissionState::InFlight;
                    selection
                }
                Err(e) => {
                    drop(state);
                    return Err(self.report(e));
                }
            }
        };
        let guard = InFlightGuard { coordinator: self };
        self.presenter.on_submission_started();

        let outcome = self.run_alignment(&selection).await;
        drop(guard);

        self.presenter.on_submission_result(&outcome);
        match &outcome {
            Ok(report) => {
                self.presenter.on_selection_changed(&self.selection());
                self.presenter.on_undo_available(Some(&report.summary));
                self.presenter
                    .notify(NotificationKind::Success, "Complexes aligned!");
            }
            Err(SessionError::PartialFailure { .. }) => {
                self.presenter.on_selection_changed(&self.selection());
                self.presenter
                    .on_undo_available(self.history.summary().as_ref());
            }
            Err(_) => {}
        }
        outcome
    }

    async fn run_alignment(
        &self,
        selection: &ValidatedSelection,
    ) -> Result<SubmissionReport, SessionError> {
        let mut ids = Vec::with_capacity(selection.target_ids.len() + 1);
        ids.push(selection.reference_id);
        ids.extend(selection.target_ids.iter().copied());

        info!(
            directory = self.directory.name(),
            reference = %selection.reference_id,
            targets = selection.target_ids.len(),
            "alignment.start"
        );
        let fetched = self.bounded("fetch", self.directory.fetch(&ids)).await??;

        let mut by_id: HashMap<StructureId, StructureRef> =
            fetched.into_iter().map(|s| (s.id, s)).collect();
        let missing: Vec<StructureId> = ids
            .iter()
            .copied()
            .filter(|id| !by_id.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(SessionError::StructureNotFound(missing));
        }
        let reference = by_id
            .remove(&selection.reference_id)
            .ok_or_else(|| SessionError::StructureNotFound(vec![selection.reference_id]))?;
        let targets: Vec<StructureRef> = selection
            .target_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        // Every snapshot is taken before the first transform is applied.
        let snapshots: Vec<FrameSnapshot> = targets
            .iter()
            .map(|t| FrameSnapshot {
                id: t.id,
                name: t.name.clone(),
                frame: t.frame,
            })
            .collect();

        let mut aligned: Vec<(StructureSummary, FrameSnapshot)> = Vec::new();
        let mut failed = Vec::new();
        for (target, snapshot) in targets.iter().zip(snapshots) {
            debug!(target = %target.name, start = ?target.frame, "alignment.target");
            let applied = self
                .bounded("align", self.transform.align_relative(target, &reference))
                .await;
            let reason = match applied {
                Ok(Ok(frame)) => {
                    debug!(target = %target.name, result = ?frame, "alignment.target_done");
                    aligned.push((target.summary(), snapshot));
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(e) => e.to_string(),
            };
            warn!(target = %target.id, reason = %reason, "alignment.target_failed");
            failed.push(TargetFailure {
                id: target.id,
                reason,
            });
        }

        if aligned.is_empty() {
            warn!(failed = failed.len(), "alignment.failed");
            return Err(SessionError::AllTargetsFailed { failed });
        }

        let (aligned, snapshots): (Vec<StructureSummary>, Vec<FrameSnapshot>) =
            aligned.into_iter().unzip();
        let target_names: Vec<String> = aligned.iter().map(|t| t.name.clone()).collect();
        let summary = AlignmentSummary::new(
            &reference.name,
            &target_names,
            self.config.summary_max_chars,
        );
        let sequence = self.history.next_sequence();
        self.history.record(AlignmentRecord {
            sequence,
            reference_id: reference.id,
            reference_name: reference.name.clone(),
            snapshots,
            recorded_at: Utc::now(),
            summary: summary.clone(),
        });
        self.lock().selection.clear();

        if failed.is_empty() {
            info!(sequence, label = %summary.full_text(), "alignment.completed");
            Ok(SubmissionReport {
                sequence,
                reference: reference.summary(),
                aligned,
                summary,
            })
        } else {
            warn!(
                sequence,
                aligned = aligned.len(),
                failed = failed.len(),
                "alignment.partial"
            );
            Err(SessionError::PartialFailure {
                aligned: aligned.into_iter().map(|t| t.id).collect(),
                failed,
            })
        }
    }

    // ── Undo ────────────────────────────────────────────────────

    /// Restore the targets of the most recent alignment to their
    /// pre-alignment frames.
    pub async fn undo(&self) -> Result<AlignmentRecord, SessionError> {
        let pending = {
            let state = self.lock();
            state
                .ensure_idle()
                .and_then(|()| self.history.begin_undo())
        };
        let pending = match pending {
            Ok(pending) => pending,
            Err(e) => return Err(self.report(e)),
        };

        match pending
            .restore(self.transform.as_ref(), self.config.operation_timeout())
            .await
        {
            Ok(record) => {
                let label = record.summary.full_text();
                info!(label = %label, "undo.completed");
                self.presenter.on_undo_available(None);
                self.presenter
                    .notify(NotificationKind::Success, &format!("Alignment {label} undone"));
                Ok(record)
            }
            Err(e) => {
                self.presenter
                    .on_undo_available(self.history.summary().as_ref());
                Err(self.report(e))
            }
        }
    }

    // ── Internals ───────────────────────────────────────────────

    fn update_selection<T>(
        &self,
        apply: impl FnOnce(&mut CoordinatorState) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let outcome = {
            let mut state = self.lock();
            match state.ensure_idle() {
                Ok(()) => apply(&mut state).map(|value| (value, state.selection.state().clone())),
                Err(e) => Err(e),
            }
        };
        match outcome {
            Ok((value, selection)) => {
                self.presenter.on_selection_changed(&selection);
                Ok(value)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    /// Set `Idle` and apply any list that arrived during the submission.
    fn release(&self) {
        let applied = {
            let mut state = self.lock();
            state.submission = SubmissionState::Idle;
            state.deferred_list.take().map(|list| {
                let dropped = state.apply_list(&list);
                (list, dropped, state.selection.state().clone())
            })
        };
        if let Some((list, dropped, selection)) = applied {
            info!(dropped, "selection.reconciled");
            self.presenter.on_available_changed(&list);
            self.presenter.on_selection_changed(&selection);
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = T>,
    ) -> Result<T, SessionError> {
        tokio::time::timeout(self.config.operation_timeout(), call)
            .await
            .map_err(|_| SessionError::Timeout {
                operation,
                timeout_ms: self.config.operation_timeout_ms,
            })
    }

    fn report(&self, err: SessionError) -> SessionError {
        warn!(error = %err, "session.rejected");
        self.presenter
            .notify(NotificationKind::Error, &err.to_string());
        err
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct InFlightGuard<'a> {
    coordinator: &'a AlignmentCoordinator,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.release();
    }
}
