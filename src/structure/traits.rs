use super::types::{Frame, StructureId, StructureRef, StructureSummary};
use crate::error::{DirectoryError, TransformError};
use async_trait::async_trait;

/// Live list of structures loaded in the host, and access to their full data.
#[async_trait]
pub trait StructureDirectory: Send + Sync {
    /// Structures currently available for selection, in host order.
    async fn list_available(&self) -> Result<Vec<StructureSummary>, DirectoryError>;

    /// Fetch full data for `ids`. Fails with [`DirectoryError::NotFound`]
    /// naming every id that could not be resolved.
    async fn fetch(&self, ids: &[StructureId]) -> Result<Vec<StructureRef>, DirectoryError>;

    /// Human-readable name of this directory backend
    fn name(&self) -> &str;
}

/// Applies frame changes to structures in the host.
#[async_trait]
pub trait TransformService: Send + Sync {
    /// Re-express `target`'s local frame relative to `reference`'s frame and
    /// commit it. Returns the target's resulting frame.
    async fn align_relative(
        &self,
        target: &StructureRef,
        reference: &StructureRef,
    ) -> Result<Frame, TransformError>;

    /// Overwrite the frame of `id` with exactly `frame`.
    async fn restore_frame(&self, id: StructureId, frame: Frame) -> Result<(), TransformError>;
}
