//! Modification methods for SurfaceBuffer.
//!
//! Every mutation is synchronous and visible to the next query. Mutations
//! validate first and only then write, so a rejected call leaves the buffers
//! exactly as they were.

use glam::Vec3;
use tracing::trace;

use super::SurfaceBuffer;
use crate::error::CutError;
use crate::types::TriangleId;

impl SurfaceBuffer {
    fn check_vertex_indices(&self, tri: [u32; 3]) -> Result<(), CutError> {
        match tri.iter().find(|&&i| i as usize >= self.vertices.len()) {
            Some(&index) => Err(CutError::InvalidVertexIndex {
                index,
                count: self.vertices.len(),
            }),
            None => Ok(()),
        }
    }

    /// Append vertices and return the index of the first one.
    pub fn append_vertices(&mut self, vertices: &[Vec3]) -> u32 {
        let first = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        trace!(
            "append_vertices: {} vertices at {} (now {})",
            vertices.len(),
            first,
            self.vertices.len()
        );
        first
    }

    /// Overwrite the three indices of an existing slot.
    ///
    /// A removed slot becomes active again.
    pub fn replace_triangle(&mut self, id: TriangleId, tri: [u32; 3]) -> Result<(), CutError> {
        self.check_triangle(id)?;
        self.check_vertex_indices(tri)?;

        let base = id.base();
        self.indices[base..base + 3].copy_from_slice(&tri);
        self.active[id.0 as usize] = true;
        self.free_slots.remove(&id);
        self.dirty_triangles.insert(id);
        Ok(())
    }

    /// Add a triangle, reusing the lowest free slot before growing the buffer.
    pub fn append_triangle(&mut self, tri: [u32; 3]) -> Result<TriangleId, CutError> {
        self.check_vertex_indices(tri)?;

        let id = match self.free_slots.pop_first() {
            Some(id) => {
                let base = id.base();
                self.indices[base..base + 3].copy_from_slice(&tri);
                self.active[id.0 as usize] = true;
                id
            }
            None => {
                let id = TriangleId(self.triangle_count() as u32);
                self.indices.extend_from_slice(&tri);
                self.active.push(true);
                id
            }
        };
        self.dirty_triangles.insert(id);
        Ok(id)
    }

    /// Soft-delete a triangle.
    ///
    /// The slot keeps its id, its indices collapse onto its first vertex so
    /// the raw buffer renders nothing there, and the slot goes on the free
    /// list. Removing an already removed slot is a no-op.
    pub fn remove_triangle(&mut self, id: TriangleId) -> Result<(), CutError> {
        self.check_triangle(id)?;
        if !self.is_active(id) {
            return Ok(());
        }

        let base = id.base();
        let anchor = self.indices[base];
        self.indices[base + 1] = anchor;
        self.indices[base + 2] = anchor;
        self.active[id.0 as usize] = false;
        self.free_slots.insert(id);
        self.dirty_triangles.insert(id);
        trace!("remove_triangle: {:?} (free slots: {})", id, self.free_slots.len());
        Ok(())
    }

    /// Move every vertex by `offset`. All triangles become dirty.
    pub fn translate(&mut self, offset: Vec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
        self.dirty_triangles
            .extend((0..self.triangle_count() as u32).map(TriangleId));
    }
}
