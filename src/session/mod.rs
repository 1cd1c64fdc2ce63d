pub mod coordinator;
pub mod history;
pub mod selection;
pub mod summary;

pub use coordinator::{AlignmentCoordinator, SubmissionReport, SubmissionState};
pub use history::{AlignmentRecord, FrameSnapshot, HistoryManager, PendingUndo};
pub use selection::{SelectionState, SelectionStore, ValidatedSelection};
pub use summary::AlignmentSummary;
