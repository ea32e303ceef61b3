//! Spatial indexing for containing-triangle queries.
//!
//! A uniform hash grid over padded triangle bounding boxes. Each triangle is
//! registered in every cell its box overlaps, so a point query only has to
//! test the triangles of a single cell. Cells are keyed by integer
//! coordinates, which keeps the grid unbounded and sparse.

use std::collections::HashMap;

use glam::Vec3;
use meshcut_config::IndexConfig;
use tracing::debug;

use crate::constants::{GRID_PADDING_FRACTION, MAX_CELLS_PER_TRIANGLE, MIN_GRID_PADDING};
use crate::surface::SurfaceBuffer;
use crate::types::TriangleId;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_triangle([a, b, c]: [Vec3; 3]) -> Self {
        Self {
            min: a.min(b).min(c),
            max: a.max(b).max(c),
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn expanded(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

type CellKey = (i32, i32, i32);

/// Where a triangle was registered, so it can be removed again.
#[derive(Debug, Clone, Copy)]
enum Placement {
    Cells { min: CellKey, max: CellKey },
    /// Box spans too many cells; tested on every query instead
    Oversized,
}

/// Uniform hash grid over triangle bounds.
#[derive(Debug, Clone)]
pub struct TriangleGrid {
    cell_size: f32,
    padding: f32,
    cells: HashMap<CellKey, Vec<TriangleId>>,
    oversized: Vec<TriangleId>,
    placements: HashMap<TriangleId, Placement>,
}

impl TriangleGrid {
    /// Create an empty grid with an explicit cell size.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            padding: (cell_size * GRID_PADDING_FRACTION).max(MIN_GRID_PADDING),
            cells: HashMap::new(),
            oversized: Vec::new(),
            placements: HashMap::new(),
        }
    }

    /// Build a grid over every active triangle of `surface`.
    ///
    /// The cell edge is the mean bounding-box extent of the active triangles
    /// times `config.cell_scale`.
    pub fn build(surface: &SurfaceBuffer, config: &IndexConfig) -> Self {
        let mut extent_sum = 0.0;
        let mut count = 0usize;
        for (_, corners) in surface.active_triangles() {
            extent_sum += Aabb::from_triangle(corners).size().max_element();
            count += 1;
        }
        let mean_extent = if count > 0 {
            extent_sum / count as f32
        } else {
            0.0
        };

        let mut grid = Self::new(mean_extent * config.cell_scale);
        for (id, corners) in surface.active_triangles() {
            grid.insert(id, corners);
        }

        debug!(
            "TriangleGrid built: {} triangles, {} cells, cell size {:.4}, {} oversized",
            count,
            grid.cells.len(),
            grid.cell_size,
            grid.oversized.len()
        );
        grid
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    fn cell_of(&self, point: Vec3) -> CellKey {
        let scaled = (point / self.cell_size).floor();
        (scaled.x as i32, scaled.y as i32, scaled.z as i32)
    }

    /// Register a triangle. An existing entry for `id` is replaced.
    pub fn insert(&mut self, id: TriangleId, corners: [Vec3; 3]) {
        self.remove(id);

        let bounds = Aabb::from_triangle(corners).expanded(self.padding);
        let min = self.cell_of(bounds.min);
        let max = self.cell_of(bounds.max);
        let span = |lo: i32, hi: i32| (hi as i64 - lo as i64 + 1) as u64;
        let cell_count = span(min.0, max.0) * span(min.1, max.1) * span(min.2, max.2);

        if cell_count > MAX_CELLS_PER_TRIANGLE {
            self.oversized.push(id);
            self.placements.insert(id, Placement::Oversized);
            return;
        }

        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    self.cells.entry((x, y, z)).or_default().push(id);
                }
            }
        }
        self.placements.insert(id, Placement::Cells { min, max });
    }

    /// Unregister a triangle. Unknown ids are ignored.
    pub fn remove(&mut self, id: TriangleId) {
        match self.placements.remove(&id) {
            Some(Placement::Cells { min, max }) => {
                for x in min.0..=max.0 {
                    for y in min.1..=max.1 {
                        for z in min.2..=max.2 {
                            if let Some(cell) = self.cells.get_mut(&(x, y, z)) {
                                cell.retain(|&other| other != id);
                                if cell.is_empty() {
                                    self.cells.remove(&(x, y, z));
                                }
                            }
                        }
                    }
                }
            }
            Some(Placement::Oversized) => self.oversized.retain(|&other| other != id),
            None => {}
        }
    }

    /// Re-register a triangle from the surface's current state.
    ///
    /// Removed or out-of-range triangles are dropped from the grid.
    pub fn update(&mut self, surface: &SurfaceBuffer, id: TriangleId) {
        if !surface.is_active(id) {
            self.remove(id);
            return;
        }
        match surface.triangle_vertices(id) {
            Ok(corners) => self.insert(id, corners),
            Err(_) => self.remove(id),
        }
    }

    /// Triangles whose padded bounds may contain `point`, in ascending id order.
    pub fn candidates(&self, point: Vec3) -> Vec<TriangleId> {
        let mut found: Vec<TriangleId> = self
            .cells
            .get(&self.cell_of(point))
            .map(|cell| cell.to_vec())
            .unwrap_or_default();
        found.extend_from_slice(&self.oversized);
        found.sort_unstable();
        found.dedup();
        found
    }
}
