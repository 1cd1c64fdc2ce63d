//! In-memory workspace: a directory + transform service over a local list.

use super::events::{DirectoryEvent, DirectoryReceiver, DirectorySender, directory_bus};
use super::traits::{StructureDirectory, TransformService};
use super::types::{Frame, StructureId, StructureRef, StructureSummary};
use crate::error::{DirectoryError, TransformError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

const EVENT_CAPACITY: usize = 64;

struct WorkspaceEntry {
    structure: StructureRef,
    /// Frame the structure had when it entered the workspace.
    load_frame: Frame,
    locked: bool,
}

/// Structures held in process memory, in insertion order.
///
/// Used by the CLI and by tests in place of a live host. Adding or removing
/// a structure publishes [`DirectoryEvent::ListChanged`] to subscribers.
pub struct InMemoryWorkspace {
    entries: RwLock<IndexMap<StructureId, WorkspaceEntry>>,
    events: DirectorySender,
}

impl InMemoryWorkspace {
    pub fn new(structures: impl IntoIterator<Item = StructureRef>) -> Self {
        let (events, _rx) = directory_bus(EVENT_CAPACITY);
        let entries = structures
            .into_iter()
            .map(|structure| {
                (
                    structure.id,
                    WorkspaceEntry {
                        load_frame: structure.frame,
                        structure,
                        locked: false,
                    },
                )
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
            events,
        }
    }

    /// Parse a workspace from a JSON array of structures.
    pub fn from_json(json: &str) -> Result<Self> {
        let structures: Vec<StructureRef> =
            serde_json::from_str(json).context("Failed to parse workspace JSON")?;
        Ok(Self::new(structures))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read workspace file {}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn subscribe(&self) -> DirectoryReceiver {
        self.events.subscribe()
    }

    /// Add (or replace) a structure and announce the new list.
    pub fn add(&self, structure: StructureRef) {
        {
            let mut entries = self.write();
            entries.insert(
                structure.id,
                WorkspaceEntry {
                    load_frame: structure.frame,
                    structure,
                    locked: false,
                },
            );
        }
        self.publish();
    }

    /// Remove a structure. Returns `false` if it was not present.
    pub fn remove(&self, id: StructureId) -> bool {
        let removed = self.write().shift_remove(&id).is_some();
        if removed {
            self.publish();
        }
        removed
    }

    /// A locked structure rejects every transform.
    pub fn set_locked(&self, id: StructureId, locked: bool) -> bool {
        match self.write().get_mut(&id) {
            Some(entry) => {
                entry.locked = locked;
                true
            }
            None => false,
        }
    }

    pub fn frame_of(&self, id: StructureId) -> Option<Frame> {
        self.read().get(&id).map(|entry| entry.structure.frame)
    }

    pub fn summaries(&self) -> Vec<StructureSummary> {
        self.read()
            .values()
            .map(|entry| entry.structure.summary())
            .collect()
    }

    /// Put a structure back to the frame it was loaded with.
    pub fn reset_transform(&self, id: StructureId) -> Result<(), TransformError> {
        let mut entries = self.write();
        let entry = entries.get_mut(&id).ok_or(TransformError::NotFound(id))?;
        entry.structure.frame = entry.load_frame;
        Ok(())
    }

    fn publish(&self) {
        let _ = self.events.send(DirectoryEvent::ListChanged {
            available: self.summaries(),
        });
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<StructureId, WorkspaceEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<StructureId, WorkspaceEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_frame(&self, id: StructureId, frame: Frame) -> Result<(), TransformError> {
        let mut entries = self.write();
        let entry = entries.get_mut(&id).ok_or(TransformError::NotFound(id))?;
        if entry.locked {
            return Err(TransformError::Rejected {
                id,
                reason: "structure is locked".into(),
            });
        }
        entry.structure.frame = frame;
        Ok(())
    }
}

#[async_trait]
impl StructureDirectory for InMemoryWorkspace {
    async fn list_available(&self) -> Result<Vec<StructureSummary>, DirectoryError> {
        Ok(self.summaries())
    }

    async fn fetch(&self, ids: &[StructureId]) -> Result<Vec<StructureRef>, DirectoryError> {
        let entries = self.read();
        let mut found = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in ids {
            match entries.get(id) {
                Some(entry) => found.push(entry.structure.clone()),
                None => missing.push(*id),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(DirectoryError::NotFound(missing))
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[async_trait]
impl TransformService for InMemoryWorkspace {
    async fn align_relative(
        &self,
        target: &StructureRef,
        reference: &StructureRef,
    ) -> Result<Frame, TransformError> {
        // The target's frame becomes the reference's frame; its contents are
        // then expressed relative to the reference.
        let frame = reference.frame;
        self.write_frame(target.id, frame)?;
        debug!(target = %target.id, reference = %reference.id, "workspace.align");
        Ok(frame)
    }

    async fn restore_frame(&self, id: StructureId, frame: Frame) -> Result<(), TransformError> {
        self.write_frame(id, frame)
    }
}
