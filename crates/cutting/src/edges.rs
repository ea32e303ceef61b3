//! Edge queries between triangles and points.
//!
//! Triangle corners are addressed by slot (0, 1, 2) in index-buffer order and
//! edges are visited in the fixed order 0-1, 1-2, 2-0. Every query that picks
//! one edge out of several resolves ties by that order.

use glam::Vec3;

use crate::error::CutError;
use crate::geometry::{closest_point_on_segment, segment_parameter};
use crate::locate::TriangleLocator;
use crate::surface::SurfaceBuffer;
use crate::types::TriangleId;

/// `(start, end, opposite)` corner slots of each edge, in visiting order.
pub const EDGE_SLOTS: [(usize, usize, usize); 3] = [(0, 1, 2), (1, 2, 0), (2, 0, 1)];

/// Edge of one triangle nearest to a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleEdge {
    pub start: usize,
    pub end: usize,
    pub opposite: usize,
    pub start_position: Vec3,
    pub end_position: Vec3,
    /// Query point projected onto the edge (clamped to its endpoints)
    pub projected: Vec3,
    pub distance: f32,
}

/// Edge a point lies on, as corner slots plus the parameter along the edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeContact {
    pub start: usize,
    pub end: usize,
    pub opposite: usize,
    /// Position along `start → end`, in `[0, 1]`
    pub t: f32,
}

/// Whether two positions name the same logical vertex.
#[inline]
pub fn same_position(a: Vec3, b: Vec3, weld_epsilon: f32) -> bool {
    a.distance_squared(b) <= weld_epsilon * weld_epsilon
}

/// The edge two triangles have in common.
///
/// Corners match when their positions lie within `weld_epsilon` of each
/// other. Returns the two matching corners of `a` (in `a`'s slot order) only
/// when exactly two corners match; disjoint, corner-touching and coincident
/// triangles all give `None`.
pub fn shared_edge(
    surface: &SurfaceBuffer,
    a: TriangleId,
    b: TriangleId,
    weld_epsilon: f32,
) -> Result<Option<(Vec3, Vec3)>, CutError> {
    let corners_a = surface.triangle_vertices(a)?;
    let corners_b = surface.triangle_vertices(b)?;

    let matches: Vec<Vec3> = corners_a
        .into_iter()
        .filter(|&p| corners_b.iter().any(|&q| same_position(p, q, weld_epsilon)))
        .collect();

    Ok(match matches[..] {
        [x, y] => Some((x, y)),
        _ => None,
    })
}

/// The edge of triangle `id` closest to `point`.
pub fn closest_edge(
    surface: &SurfaceBuffer,
    id: TriangleId,
    point: Vec3,
) -> Result<TriangleEdge, CutError> {
    let corners = surface.triangle_vertices(id)?;
    let mut best: Option<TriangleEdge> = None;

    for (start, end, opposite) in EDGE_SLOTS {
        let projected = closest_point_on_segment(point, corners[start], corners[end]);
        let distance = point.distance(projected);
        // Strict comparison keeps the earlier edge on ties
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(TriangleEdge {
                start,
                end,
                opposite,
                start_position: corners[start],
                end_position: corners[end],
                projected,
                distance,
            });
        }
    }

    best.ok_or(CutError::InvalidTriangle {
        id,
        count: surface.triangle_count(),
    })
}

/// Which edge of `(v1, v2, v3)` the point lies on.
///
/// A point is on an edge when its projection parameter lies in `[0, 1]` and
/// its perpendicular distance is at most `tolerance * max(1, edge length)`.
/// A point on a corner lies on two edges; the first in visiting order wins.
pub fn edge_containing(
    point: Vec3,
    v1: Vec3,
    v2: Vec3,
    v3: Vec3,
    tolerance: f32,
) -> Result<EdgeContact, CutError> {
    let corners = [v1, v2, v3];

    for (start, end, opposite) in EDGE_SLOTS {
        let (a, b) = (corners[start], corners[end]);
        let Some(t) = segment_parameter(point, a, b) else {
            continue;
        };
        if !(-tolerance..=1.0 + tolerance).contains(&t) {
            continue;
        }
        let foot = a + (b - a) * t;
        let limit = tolerance * a.distance(b).max(1.0);
        if point.distance(foot) <= limit {
            return Ok(EdgeContact {
                start,
                end,
                opposite,
                t: t.clamp(0.0, 1.0),
            });
        }
    }

    Err(CutError::PointNotOnEdge { point })
}

/// The active triangle sharing the longest edge of `id`.
///
/// On a grid this is the other half of the quad. Returns `None` when the
/// longest edge is a boundary edge.
pub fn quad_partner(
    surface: &SurfaceBuffer,
    locator: &TriangleLocator,
    id: TriangleId,
    weld_epsilon: f32,
) -> Result<Option<TriangleId>, CutError> {
    let corners = surface.triangle_vertices(id)?;

    let (start, end, _) = EDGE_SLOTS
        .into_iter()
        .fold(None, |longest: Option<(usize, usize, f32)>, (s, e, _)| {
            let length = corners[s].distance(corners[e]);
            match longest {
                Some((_, _, best)) if best >= length => longest,
                _ => Some((s, e, length)),
            }
        })
        .ok_or(CutError::InvalidTriangle {
            id,
            count: surface.triangle_count(),
        })?;
    let (p, q) = (corners[start], corners[end]);

    for candidate in locator.grid().candidates((p + q) * 0.5) {
        if candidate == id || !surface.is_active(candidate) {
            continue;
        }
        if let Some((x, y)) = shared_edge(surface, id, candidate, weld_epsilon)? {
            let same = (same_position(x, p, weld_epsilon) && same_position(y, q, weld_epsilon))
                || (same_position(x, q, weld_epsilon) && same_position(y, p, weld_epsilon));
            if same {
                return Ok(Some(candidate));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcut_config::{GridConfig, IndexConfig};

    const EPS: f32 = 1e-5;

    fn scenario() -> SurfaceBuffer {
        SurfaceBuffer::from_grid(&GridConfig::new(5, 3, 4.0, 2.0)).unwrap()
    }

    #[test]
    fn test_shared_edge_adjacent() {
        let surface = scenario();
        // Diagonal of the first quad
        let edge = shared_edge(&surface, TriangleId(0), TriangleId(1), EPS).unwrap();
        assert_eq!(
            edge,
            Some((Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0)))
        );
        // Across the vertical grid line between quads
        assert!(shared_edge(&surface, TriangleId(1), TriangleId(2), EPS)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_shared_edge_none() {
        let surface = scenario();
        // Far apart
        assert_eq!(
            shared_edge(&surface, TriangleId(0), TriangleId(7), EPS).unwrap(),
            None
        );
        // Only a corner in common
        assert_eq!(
            shared_edge(&surface, TriangleId(0), TriangleId(2), EPS).unwrap(),
            None
        );
        // Coincident triangles match three corners
        assert_eq!(
            shared_edge(&surface, TriangleId(0), TriangleId(0), EPS).unwrap(),
            None
        );
    }

    #[test]
    fn test_shared_edge_tolerates_near_duplicates() {
        let mut surface = scenario();
        let first = surface.append_vertices(&[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0 + 1e-7, 1.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ]);
        let id = surface
            .append_triangle([first, first + 1, first + 2])
            .unwrap();
        assert!(shared_edge(&surface, TriangleId(0), id, EPS).unwrap().is_some());
        assert!(shared_edge(&surface, TriangleId(0), id, 0.0).unwrap().is_none());
    }

    #[test]
    fn test_shared_edge_invalid_id() {
        let surface = scenario();
        assert!(matches!(
            shared_edge(&surface, TriangleId(0), TriangleId(16), EPS),
            Err(CutError::InvalidTriangle { .. })
        ));
    }

    #[test]
    fn test_closest_edge() {
        let surface = scenario();
        let edge = closest_edge(&surface, TriangleId(0), Vec3::new(0.2, 0.6, 0.0)).unwrap();
        assert_eq!((edge.start, edge.end, edge.opposite), (0, 1, 2));
        assert!((edge.projected - Vec3::new(0.0, 0.6, 0.0)).length() < 1e-6);
        assert!((edge.distance - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_closest_edge_tie_keeps_first() {
        let surface = scenario();
        // Corner (0, 0) is on edges 0-1 and 2-0
        let edge = closest_edge(&surface, TriangleId(0), Vec3::ZERO).unwrap();
        assert_eq!((edge.start, edge.end), (0, 1));
    }

    #[test]
    fn test_edge_containing() {
        let (a, b, c) = (
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        );
        let contact = edge_containing(Vec3::new(0.0, 0.6, 0.0), a, b, c, EPS).unwrap();
        assert_eq!((contact.start, contact.end, contact.opposite), (0, 1, 2));
        assert!((contact.t - 0.6).abs() < 1e-6);

        let contact = edge_containing(Vec3::new(0.4, 0.4, 0.0), a, b, c, EPS).unwrap();
        assert_eq!((contact.start, contact.end, contact.opposite), (2, 0, 1));

        let contact = edge_containing(Vec3::new(0.5, 1.0, 0.0), a, b, c, EPS).unwrap();
        assert_eq!(contact.opposite, 0);
    }

    #[test]
    fn test_edge_containing_rejects_off_edge_points() {
        let (a, b, c) = (
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        );
        let interior = Vec3::new(0.2, 0.6, 0.0);
        assert_eq!(
            edge_containing(interior, a, b, c, EPS),
            Err(CutError::PointNotOnEdge { point: interior })
        );
        // Collinear with an edge but beyond its end
        assert!(edge_containing(Vec3::new(0.0, 1.5, 0.0), a, b, c, EPS).is_err());
    }

    #[test]
    fn test_quad_partner() {
        let surface = scenario();
        let locator = TriangleLocator::new(&surface, &IndexConfig::default());
        assert_eq!(
            quad_partner(&surface, &locator, TriangleId(0), EPS).unwrap(),
            Some(TriangleId(1))
        );
        assert_eq!(
            quad_partner(&surface, &locator, TriangleId(9), EPS).unwrap(),
            Some(TriangleId(8))
        );
    }

    #[test]
    fn test_quad_partner_skips_removed() {
        let mut surface = scenario();
        surface.remove_triangle(TriangleId(1)).unwrap();
        let mut locator = TriangleLocator::new(&surface, &IndexConfig::default());
        locator.sync(&mut surface);
        assert_eq!(
            quad_partner(&surface, &locator, TriangleId(0), EPS).unwrap(),
            None
        );
    }
}
