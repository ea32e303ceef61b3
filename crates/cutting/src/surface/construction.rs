//! Construction and full reset of a SurfaceBuffer.

use std::collections::{BTreeSet, HashSet};

use glam::Vec3;
use meshcut_config::GridConfig;
use tracing::info;

use super::SurfaceBuffer;
use crate::error::CutError;
use crate::types::TriangleId;

impl SurfaceBuffer {
    /// Build a surface from raw buffers, validating every index.
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, CutError> {
        let mut surface = Self::default();
        surface.rebuild(vertices, indices)?;
        Ok(surface)
    }

    /// Build a flat grid in the XY plane.
    ///
    /// Vertices are laid out row-major (`y * vertices_along_x + x`) and each
    /// quad contributes `(s, s + nx, s + nx + 1)` and `(s, s + nx + 1, s + 1)`.
    pub fn from_grid(grid: &GridConfig) -> Result<Self, CutError> {
        grid.validate()
            .map_err(|e| CutError::InvalidGrid(e.to_string()))?;

        let nx = grid.vertices_along_x;
        let ny = grid.vertices_along_y;
        let (dx, dy) = grid.spacing();
        let x0 = if grid.centered { -grid.width / 2.0 } else { 0.0 };

        let mut vertices = Vec::with_capacity(grid.vertex_count());
        for y in 0..ny {
            for x in 0..nx {
                vertices.push(Vec3::new(x0 + x as f32 * dx, y as f32 * dy, 0.0));
            }
        }

        let mut indices = Vec::with_capacity(grid.triangle_count() * 3);
        for y in 0..ny - 1 {
            for x in 0..nx - 1 {
                let start = y * nx + x;

                indices.push(start);
                indices.push(start + nx);
                indices.push(start + nx + 1);

                indices.push(start);
                indices.push(start + nx + 1);
                indices.push(start + 1);
            }
        }

        Self::new(vertices, indices)
    }

    /// Replace the whole surface (new session / regenerated mesh).
    ///
    /// Validation happens before anything is replaced, so a rejected rebuild
    /// leaves the previous surface intact.
    pub fn rebuild(&mut self, vertices: Vec<Vec3>, indices: Vec<u32>) -> Result<(), CutError> {
        if indices.len() % 3 != 0 {
            return Err(CutError::MalformedIndexBuffer { len: indices.len() });
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(CutError::InvalidVertexIndex {
                index,
                count: vertices.len(),
            });
        }

        let triangle_count = indices.len() / 3;
        self.vertices = vertices;
        self.indices = indices;
        self.active = vec![true; triangle_count];
        self.free_slots = BTreeSet::new();
        self.dirty_triangles = (0..triangle_count as u32).map(TriangleId).collect::<HashSet<_>>();
        self.generation += 1;

        info!(
            "surface rebuilt: {} vertices, {} triangles (generation {})",
            self.vertices.len(),
            triangle_count,
            self.generation
        );
        Ok(())
    }
}
