//! Containing-triangle queries.
//!
//! The locator answers "which triangle contains this point" with the same
//! tie-break as a front-to-back scan of the index buffer: the lowest active
//! triangle id whose interior test passes wins. The spatial grid only narrows
//! the set of triangles tested.

use glam::Vec3;
use meshcut_config::IndexConfig;
use tracing::{debug, trace};

use crate::geometry::point_in_triangle;
use crate::spatial::TriangleGrid;
use crate::surface::SurfaceBuffer;
use crate::types::TriangleId;

/// Spatial-index-backed point location over one surface.
#[derive(Debug, Clone)]
pub struct TriangleLocator {
    grid: TriangleGrid,
    config: IndexConfig,
    /// Surface generation the grid was built against
    generation: u64,
}

impl TriangleLocator {
    pub fn new(surface: &SurfaceBuffer, config: &IndexConfig) -> Self {
        Self {
            grid: TriangleGrid::build(surface, config),
            config: *config,
            generation: surface.generation(),
        }
    }

    /// Bring the index up to date with the surface.
    ///
    /// Drains the surface's dirty set and re-registers those triangles. After
    /// a surface rebuild the whole grid is rebuilt instead. Returns the number
    /// of triangles re-registered.
    pub fn sync(&mut self, surface: &mut SurfaceBuffer) -> usize {
        let dirty = surface.take_dirty_triangles();

        if surface.generation() != self.generation {
            self.rebuild(surface);
            return surface.active_triangle_count();
        }

        for &id in &dirty {
            self.grid.update(surface, id);
        }
        if !dirty.is_empty() {
            trace!("TriangleLocator synced {} triangles", dirty.len());
        }
        dirty.len()
    }

    /// Rebuild the grid from scratch, re-deriving the cell size.
    pub fn rebuild(&mut self, surface: &SurfaceBuffer) {
        self.grid = TriangleGrid::build(surface, &self.config);
        self.generation = surface.generation();
        debug!(
            "TriangleLocator rebuilt for generation {} ({} triangles)",
            self.generation,
            self.grid.len()
        );
    }

    /// Lowest-id active triangle containing `point`.
    pub fn locate(&self, surface: &SurfaceBuffer, point: Vec3) -> Option<TriangleId> {
        let found = self
            .grid
            .candidates(point)
            .into_iter()
            .find(|&id| contains(surface, id, point));
        trace!("locate {:?} -> {:?}", point, found);
        found
    }

    /// Reference scan over every active triangle in id order.
    pub fn locate_linear(surface: &SurfaceBuffer, point: Vec3) -> Option<TriangleId> {
        surface
            .active_triangles()
            .find(|(_, [a, b, c])| point_in_triangle(point, *a, *b, *c))
            .map(|(id, _)| id)
    }

    pub fn grid(&self) -> &TriangleGrid {
        &self.grid
    }
}

fn contains(surface: &SurfaceBuffer, id: TriangleId, point: Vec3) -> bool {
    surface.is_active(id)
        && surface
            .triangle_vertices(id)
            .map(|[a, b, c]| point_in_triangle(point, a, b, c))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcut_config::GridConfig;

    fn scenario() -> SurfaceBuffer {
        SurfaceBuffer::from_grid(&GridConfig::new(5, 3, 4.0, 2.0)).unwrap()
    }

    #[test]
    fn test_locate_origin_is_triangle_zero() {
        let surface = scenario();
        let locator = TriangleLocator::new(&surface, &IndexConfig::default());
        assert_eq!(locator.locate(&surface, Vec3::ZERO), Some(TriangleId(0)));
        assert_eq!(
            TriangleLocator::locate_linear(&surface, Vec3::ZERO),
            Some(TriangleId(0))
        );
    }

    #[test]
    fn test_locate_outside() {
        let surface = scenario();
        let locator = TriangleLocator::new(&surface, &IndexConfig::default());
        assert_eq!(locator.locate(&surface, Vec3::new(0.3, -0.5, 0.0)), None);
        assert_eq!(locator.locate(&surface, Vec3::new(9.0, 1.0, 0.0)), None);
    }

    #[test]
    fn test_shared_diagonal_goes_to_lower_id() {
        let surface = scenario();
        let locator = TriangleLocator::new(&surface, &IndexConfig::default());
        // Diagonal of the first quad is an inclusive edge of both triangles
        let p = Vec3::new(0.5, 0.5, 0.0);
        assert_eq!(locator.locate(&surface, p), Some(TriangleId(0)));
        assert_eq!(locator.locate(&surface, Vec3::new(0.6, 0.2, 0.0)), Some(TriangleId(1)));
    }

    #[test]
    fn test_grid_matches_linear_scan() {
        let mut surface = scenario();
        let mut locator = TriangleLocator::new(&surface, &IndexConfig::default());
        surface.take_dirty_triangles();

        surface.remove_triangle(TriangleId(3)).unwrap();
        surface.remove_triangle(TriangleId(8)).unwrap();
        let first = surface.append_vertices(&[
            Vec3::new(0.1, 0.1, 0.0),
            Vec3::new(0.9, 0.1, 0.0),
            Vec3::new(0.5, 0.9, 0.0),
        ]);
        // Overlaps triangles 0 and 1 and reuses slot 3
        surface
            .append_triangle([first, first + 1, first + 2])
            .unwrap();
        assert_eq!(locator.sync(&mut surface), 2);

        for iy in 0..=20 {
            for ix in -2..=42 {
                let p = Vec3::new(ix as f32 * 0.1, iy as f32 * 0.1, 0.0);
                assert_eq!(
                    locator.locate(&surface, p),
                    TriangleLocator::locate_linear(&surface, p),
                    "{p:?}"
                );
            }
        }
    }

    #[test]
    fn test_sync_rebuilds_after_surface_rebuild() {
        let mut surface = scenario();
        let mut locator = TriangleLocator::new(&surface, &IndexConfig::default());
        surface
            .rebuild(
                vec![
                    Vec3::new(10.0, 10.0, 0.0),
                    Vec3::new(12.0, 10.0, 0.0),
                    Vec3::new(10.0, 12.0, 0.0),
                ],
                vec![0, 1, 2],
            )
            .unwrap();
        locator.sync(&mut surface);
        assert_eq!(
            locator.locate(&surface, Vec3::new(10.5, 10.5, 0.0)),
            Some(TriangleId(0))
        );
        assert_eq!(locator.locate(&surface, Vec3::new(0.5, 0.2, 0.0)), None);
        assert!(!surface.has_dirty_triangles());
    }
}
