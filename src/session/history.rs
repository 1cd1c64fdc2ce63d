use super::summary::AlignmentSummary;
use crate::error::{SessionError, TargetFailure, TransformError};
use crate::structure::{Frame, StructureId, TransformService};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Frame of one target as it was before an alignment touched it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub id: StructureId,
    pub name: String,
    pub frame: Frame,
}

/// The most recent alignment, kept so it can be undone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRecord {
    pub sequence: u64,
    pub reference_id: StructureId,
    pub reference_name: String,
    /// Pre-alignment frames, in the order the targets were selected.
    pub snapshots: Vec<FrameSnapshot>,
    pub recorded_at: DateTime<Utc>,
    pub summary: AlignmentSummary,
}

impl AlignmentRecord {
    pub fn target_ids(&self) -> Vec<StructureId> {
        self.snapshots.iter().map(|s| s.id).collect()
    }
}

#[derive(Debug, Default)]
struct HistorySlot {
    entry: Option<AlignmentRecord>,
    next_sequence: u64,
    undoing: bool,
}

/// Single-level undo history.
///
/// Holds at most one [`AlignmentRecord`]; recording replaces it and a
/// successful undo consumes it.
#[derive(Debug, Default)]
pub struct HistoryManager {
    slot: Mutex<HistorySlot>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the sequence number for the next record.
    pub fn next_sequence(&self) -> u64 {
        let mut slot = self.lock();
        slot.next_sequence += 1;
        slot.next_sequence
    }

    /// Replace any existing entry unconditionally.
    pub fn record(&self, entry: AlignmentRecord) {
        debug!(sequence = entry.sequence, targets = entry.snapshots.len(), "history.record");
        self.lock().entry = Some(entry);
    }

    pub fn current(&self) -> Option<AlignmentRecord> {
        self.lock().entry.clone()
    }

    pub fn summary(&self) -> Option<AlignmentSummary> {
        self.lock().entry.as_ref().map(|e| e.summary.clone())
    }

    pub fn is_undoing(&self) -> bool {
        self.lock().undoing
    }

    /// Claim the current entry for undo. The entry leaves the history now
    /// and only comes back if the returned [`PendingUndo`] is dropped
    /// without completing.
    pub fn begin_undo(&self) -> Result<PendingUndo<'_>, SessionError> {
        let mut slot = self.lock();
        if slot.undoing {
            return Err(SessionError::AlreadyInProgress);
        }
        let record = slot.entry.take().ok_or(SessionError::NothingToUndo)?;
        slot.undoing = true;
        Ok(PendingUndo {
            history: self,
            record: Some(record),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HistorySlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An entry taken out of the history for undo.
///
/// Dropping it without a successful [`restore`](Self::restore) puts the
/// entry back (unless a newer one was recorded meanwhile); restores are
/// idempotent, so the undo can simply be retried.
pub struct PendingUndo<'a> {
    history: &'a HistoryManager,
    record: Option<AlignmentRecord>,
}

impl PendingUndo<'_> {
    /// Ask the transform service to write back every snapshot frame.
    /// Targets that no longer exist are skipped. Fails with `UndoFailed`
    /// naming each remaining target that could not be restored.
    pub async fn restore(
        mut self,
        transform: &dyn TransformService,
        timeout: Duration,
    ) -> Result<AlignmentRecord, SessionError> {
        let snapshots = self
            .record
            .as_ref()
            .map(|record| record.snapshots.clone())
            .unwrap_or_default();

        let mut failed = Vec::new();
        for snapshot in snapshots {
            let restore = transform.restore_frame(snapshot.id, snapshot.frame);
            let reason = match tokio::time::timeout(timeout, restore).await {
                Ok(Ok(())) => continue,
                // A structure that left the workspace has nothing to restore.
                Ok(Err(TransformError::NotFound(id))) => {
                    warn!(target = %id, name = %snapshot.name, "undo.target_gone");
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!(
                    "restore timed out after {}ms",
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
                ),
            };
            warn!(target = %snapshot.id, reason = %reason, "undo.restore_failed");
            failed.push(TargetFailure {
                id: snapshot.id,
                reason,
            });
        }

        if failed.is_empty() {
            self.record.take().ok_or(SessionError::NothingToUndo)
        } else {
            Err(SessionError::UndoFailed { failed })
        }
    }
}

impl Drop for PendingUndo<'_> {
    fn drop(&mut self) {
        let mut slot = self.history.lock();
        slot.undoing = false;
        if let Some(record) = self.record.take()
            && slot.entry.is_none()
        {
            slot.entry = Some(record);
        }
    }
}
