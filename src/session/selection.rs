use crate::error::SessionError;
use crate::structure::StructureId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Current reference/target choice.
///
/// `target_ids` keeps selection order; the reference is never also a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub reference_id: Option<StructureId>,
    pub target_ids: IndexSet<StructureId>,
}

impl SelectionState {
    pub fn is_empty(&self) -> bool {
        self.reference_id.is_none() && self.target_ids.is_empty()
    }
}

/// A selection that passed [`SelectionStore::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSelection {
    pub reference_id: StructureId,
    pub target_ids: Vec<StructureId>,
}

/// Owns the [`SelectionState`] and enforces its invariant on every mutation.
#[derive(Debug, Default)]
pub struct SelectionStore {
    state: SelectionState,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Make `id` the reference, dropping it from the targets if present.
    pub fn set_reference(&mut self, id: StructureId) {
        self.state.target_ids.shift_remove(&id);
        self.state.reference_id = Some(id);
    }

    /// Add `id` to the targets, or remove it if already there.
    /// Returns `true` when the target was added.
    pub fn toggle_target(&mut self, id: StructureId) -> Result<bool, SessionError> {
        if self.state.reference_id == Some(id) {
            return Err(SessionError::InvalidSelection(format!(
                "structure {id} is the reference and cannot also be a target"
            )));
        }
        if self.state.target_ids.shift_remove(&id) {
            Ok(false)
        } else {
            self.state.target_ids.insert(id);
            Ok(true)
        }
    }

    /// Drop every selected id that is not in `available`.
    /// Returns how many entries were dropped.
    pub fn reconcile(&mut self, available: &HashSet<StructureId>) -> usize {
        let mut dropped = 0;
        if let Some(reference) = self.state.reference_id
            && !available.contains(&reference)
        {
            self.state.reference_id = None;
            dropped += 1;
        }
        let before = self.state.target_ids.len();
        self.state.target_ids.retain(|id| available.contains(id));
        dropped + (before - self.state.target_ids.len())
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::default();
    }

    pub fn validate(&self) -> Result<ValidatedSelection, SessionError> {
        let reference_id = self
            .state
            .reference_id
            .ok_or(SessionError::MissingReference)?;
        if self.state.target_ids.is_empty() {
            return Err(SessionError::EmptyTargets);
        }
        Ok(ValidatedSelection {
            reference_id,
            target_ids: self.state.target_ids.iter().copied().collect(),
        })
    }
}
