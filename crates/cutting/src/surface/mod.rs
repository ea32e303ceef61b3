//! Mutable vertex/triangle store of a cuttable surface
//!
//! Vertices are append-only between rebuilds and identified by their index.
//! Triangles live in a flat index buffer; a triangle id is its index-triple
//! offset divided by three and stays stable for the lifetime of the surface.
//! Removed triangles are tracked by an explicit active flag and a free list
//! whose slots are reused by later appends.

mod construction;
mod modification;
mod validation;

use std::collections::{BTreeSet, HashSet};

use glam::Vec3;

use crate::error::CutError;
use crate::types::TriangleId;

/// Vertex and triangle buffers plus bookkeeping for soft delete and dirty tracking.
#[derive(Debug, Clone, Default)]
pub struct SurfaceBuffer {
    pub(crate) vertices: Vec<Vec3>,
    /// Flat index triples, length always a multiple of 3
    pub(crate) indices: Vec<u32>,
    /// One flag per triangle slot
    pub(crate) active: Vec<bool>,
    /// Inactive slots, reused lowest-first
    pub(crate) free_slots: BTreeSet<TriangleId>,
    /// Triangles touched since the last `take_dirty_triangles`
    pub(crate) dirty_triangles: HashSet<TriangleId>,
    /// Bumped on every rebuild so derived structures know to start over
    pub(crate) generation: u64,
}

impl SurfaceBuffer {
    /// Append cursor: index the next appended vertex receives
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangle slots, active or not
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn active_triangle_count(&self) -> usize {
        self.triangle_count() - self.free_slots.len()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Raw index buffer including degenerate removed slots
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex(&self, index: u32) -> Option<Vec3> {
        self.vertices.get(index as usize).copied()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn contains_triangle(&self, id: TriangleId) -> bool {
        (id.0 as usize) < self.triangle_count()
    }

    /// Whether `id` is in range and not removed
    #[inline]
    pub fn is_active(&self, id: TriangleId) -> bool {
        self.active.get(id.0 as usize).copied().unwrap_or(false)
    }

    pub(crate) fn check_triangle(&self, id: TriangleId) -> Result<(), CutError> {
        if self.contains_triangle(id) {
            Ok(())
        } else {
            Err(CutError::InvalidTriangle {
                id,
                count: self.triangle_count(),
            })
        }
    }

    /// Vertex indices of a triangle slot
    pub fn triangle_indices(&self, id: TriangleId) -> Result<[u32; 3], CutError> {
        self.check_triangle(id)?;
        let base = id.base();
        Ok([
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        ])
    }

    /// Vertex positions of a triangle slot
    pub fn triangle_vertices(&self, id: TriangleId) -> Result<[Vec3; 3], CutError> {
        let [i0, i1, i2] = self.triangle_indices(id)?;
        Ok([
            self.vertices[i0 as usize],
            self.vertices[i1 as usize],
            self.vertices[i2 as usize],
        ])
    }

    /// Iterate active triangles in id order with their positions
    pub fn active_triangles(&self) -> impl Iterator<Item = (TriangleId, [Vec3; 3])> + '_ {
        self.indices
            .chunks_exact(3)
            .enumerate()
            .filter(|(slot, _)| self.active[*slot])
            .map(|(slot, tri)| {
                (
                    TriangleId(slot as u32),
                    [
                        self.vertices[tri[0] as usize],
                        self.vertices[tri[1] as usize],
                        self.vertices[tri[2] as usize],
                    ],
                )
            })
    }

    /// Index buffer with removed slots filtered out, ready for a renderer
    pub fn render_indices(&self) -> Vec<u32> {
        self.indices
            .chunks_exact(3)
            .enumerate()
            .filter(|(slot, _)| self.active[*slot])
            .flat_map(|(_, tri)| tri.iter().copied())
            .collect()
    }

    /// Vertex positions as raw bytes (tightly packed `f32` triples)
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index buffer as bytes (`u32` per index)
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Get all triangles touched since the last call and clear the dirty set
    pub fn take_dirty_triangles(&mut self) -> Vec<TriangleId> {
        let mut dirty: Vec<TriangleId> = self.dirty_triangles.drain().collect();
        dirty.sort_unstable();
        dirty
    }

    #[inline]
    pub fn has_dirty_triangles(&self) -> bool {
        !self.dirty_triangles.is_empty()
    }
}
