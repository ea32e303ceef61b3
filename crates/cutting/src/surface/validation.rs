//! Invariant checks for SurfaceBuffer.

use super::SurfaceBuffer;
use crate::error::CutError;
use crate::types::TriangleId;

impl SurfaceBuffer {
    /// Check the buffer invariants.
    ///
    /// - index buffer length is a multiple of 3
    /// - every index is below `num_vertices`
    /// - active flags and free list agree
    pub fn validate(&self) -> Result<(), CutError> {
        if self.indices.len() % 3 != 0 {
            return Err(CutError::MalformedIndexBuffer {
                len: self.indices.len(),
            });
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(CutError::InvalidVertexIndex {
                index,
                count: self.vertices.len(),
            });
        }
        debug_assert_eq!(self.active.len(), self.triangle_count());
        for (slot, &active) in self.active.iter().enumerate() {
            let id = TriangleId(slot as u32);
            if active == self.free_slots.contains(&id) {
                return Err(CutError::InvalidTriangle {
                    id,
                    count: self.triangle_count(),
                });
            }
        }
        Ok(())
    }
}
