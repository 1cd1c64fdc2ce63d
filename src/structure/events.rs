use super::types::StructureSummary;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Change notifications emitted by a structure directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DirectoryEvent {
    /// The available list changed (structures added or removed). Carries
    /// the full list as of the change.
    ListChanged { available: Vec<StructureSummary> },
}

pub type DirectorySender = broadcast::Sender<DirectoryEvent>;
pub type DirectoryReceiver = broadcast::Receiver<DirectoryEvent>;

/// Create a broadcast bus for directory events with the given capacity.
pub fn directory_bus(capacity: usize) -> (DirectorySender, DirectoryReceiver) {
    broadcast::channel(capacity)
}
