use crate::structure::StructureId;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `aligntool`.
///
/// Session errors are the user-facing taxonomy; every one of them is
/// recoverable. Binary and CLI code uses `anyhow::Result` for context chains.
#[derive(Debug, Error)]
pub enum AlignToolError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Alignment session ───────────────────────────────────────────────
    #[error("session: {0}")]
    Session(#[from] SessionError),

    // ── Structure directory ─────────────────────────────────────────────
    #[error("directory: {0}")]
    Directory(#[from] DirectoryError),

    // ── Transform service ───────────────────────────────────────────────
    #[error("transform: {0}")]
    Transform(#[from] TransformError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Session errors ─────────────────────────────────────────────────────────

/// A target that could not be aligned, with the reason reported by the
/// transform service (or the timeout that cut it off).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFailure {
    pub id: StructureId,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("please select a reference complex")]
    MissingReference,

    #[error("please select one or more target complexes")]
    EmptyTargets,

    #[error("an alignment operation is already in progress")]
    AlreadyInProgress,

    #[error("structures no longer available: {}", join_ids(.0))]
    StructureNotFound(Vec<StructureId>),

    #[error(
        "aligned {} target(s); failed: {}",
        .aligned.len(),
        join_failures(.failed)
    )]
    PartialFailure {
        aligned: Vec<StructureId>,
        failed: Vec<TargetFailure>,
    },

    #[error("no target could be aligned: {}", join_failures(.failed))]
    AllTargetsFailed { failed: Vec<TargetFailure> },

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("undo could not restore: {}", join_failures(.failed))]
    UndoFailed { failed: Vec<TargetFailure> },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("directory: {0}")]
    Directory(DirectoryError),
}

impl SessionError {
    /// Ids of the targets that failed, for a retry of just that subset.
    pub fn failed_targets(&self) -> Vec<StructureId> {
        match self {
            Self::PartialFailure { failed, .. }
            | Self::AllTargetsFailed { failed }
            | Self::UndoFailed { failed } => failed.iter().map(|f| f.id).collect(),
            Self::StructureNotFound(ids) => ids.clone(),
            _ => Vec::new(),
        }
    }
}

impl From<DirectoryError> for SessionError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(ids) => Self::StructureNotFound(ids),
            other => Self::Directory(other),
        }
    }
}

// ─── Collaborator errors ────────────────────────────────────────────────────

#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    #[error("structures not found: {}", join_ids(.0))]
    NotFound(Vec<StructureId>),

    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error)]
pub enum TransformError {
    #[error("structure {0} not found")]
    NotFound(StructureId),

    #[error("transform of {id} rejected: {reason}")]
    Rejected { id: StructureId, reason: String },
}

fn join_ids(ids: &[StructureId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_failures(failed: &[TargetFailure]) -> String {
    failed
        .iter()
        .map(|f| format!("{} ({})", f.id, f.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AlignToolError>;
