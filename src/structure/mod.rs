pub mod events;
pub mod memory;
pub mod traits;
pub mod types;

pub use events::{DirectoryEvent, DirectoryReceiver, DirectorySender, directory_bus};
pub use memory::InMemoryWorkspace;
pub use traits::{StructureDirectory, TransformService};
pub use types::{Frame, StructureId, StructureRef, StructureSummary};
