//! Re-triangulation of a cut triangle.
//!
//! A segment crossing a triangle replaces it with new triangles built on
//! freshly appended vertices, so the two sides of the cut stop sharing
//! vertices and a small gap (the seam) opens between them.
//!
//! ## Through cut
//!
//! Entry and exit lie on two different edges. Those edges meet at the near
//! corner `N`; the far corners `A` and `B` sit on the other side of the cut.
//! ```text
//!          N                       N'
//!         / \                     / \
//!        /   \                   en--xn       near piece
//!    entry-----exit     ->
//!      /       \                 ef------xf
//!     /         \               /  \      \   far quad, two triangles
//!    A-----------B             A'---------B'
//! ```
//! Seven vertices are appended (`N' A' B'` plus the near/far offsets of
//! entry and exit), the original slot becomes the near piece and two slots
//! are appended for the far quad.
//!
//! ## Partial cut
//!
//! One endpoint lies on edge `a-b`, the other (`P`) is inside the triangle.
//! The edge point is split into `ka`/`kb`, giving a notch that ends at `P`.
//! Six vertices are appended, the original slot becomes the `a` flank and two
//! slots are appended: the `b` flank and the larger of the two triangles
//! joining `P` to the far corner.
//!
//! ## Corner split
//!
//! One endpoint sits on a corner `V`, the other on the edge `a-b` facing it.
//! The edge point is split into `ka`/`kb` and the triangle becomes the two
//! wedges `a-ka-V` and `kb-b-V`. Five vertices are appended and one slot.
//!
//! ## Edge seam
//!
//! The endpoints of the edge nearest to a point are duplicated and pulled
//! toward the opposite corner, detaching this triangle from its neighbour
//! along that edge.

use glam::Vec3;
use meshcut_config::CutConfig;
use tracing::debug;

use crate::constants::{
    CORNER_CUT_VERTICES, EDGE_SEAM_VERTICES, PARTIAL_CUT_VERTICES, THROUGH_CUT_VERTICES,
};
use crate::edges::{EdgeContact, closest_edge, edge_containing, same_position};
use crate::error::CutError;
use crate::geometry::{
    is_clockwise, shortest_edge_length, step_toward, triangle_area, triangle_normal,
};
use crate::surface::SurfaceBuffer;
use crate::types::{CutKind, CutOutcome, CutReport, CutSegment, SkipReason, TriangleId};

/// What the validate phase decided to build.
enum CutPlan {
    Through {
        near: usize,
        entry_far: usize,
        exit_far: usize,
    },
    Partial {
        edge: EdgeContact,
        edge_point: Vec3,
        interior: Vec3,
    },
    Corner {
        edge: EdgeContact,
        edge_point: Vec3,
    },
}

/// Apply one cut segment to its triangle.
///
/// Every precondition is checked before the first write, so an `Err` or a
/// `Skipped` outcome leaves the surface untouched.
pub fn apply_cut(
    surface: &mut SurfaceBuffer,
    segment: &CutSegment,
    config: &CutConfig,
) -> Result<CutOutcome, CutError> {
    // ===== PHASE 1: GATHER (read-only, fail early) =====
    let id = segment.triangle;
    let corners = active_corners(surface, id)?;
    let eps = config.weld_epsilon;
    let corner_slot = |p: Vec3| corners.iter().position(|&c| same_position(p, c, eps));
    let (entry_corner, exit_corner) = (corner_slot(segment.entry), corner_slot(segment.exit));

    // ===== PHASE 2: VALIDATE =====
    if entry_corner.is_some() && exit_corner.is_some() {
        return Ok(skip(id, SkipReason::ThroughCorner));
    }
    if !segment.entry_on_edge && !segment.exit_on_edge {
        return Ok(skip(id, SkipReason::NoEdgeCrossing));
    }
    if shortest_edge_length(corners[0], corners[1], corners[2]) < config.min_triangle_edge {
        return Ok(skip(id, SkipReason::TriangleTooSmall));
    }

    let [c0, c1, c2] = corners;
    let tolerance = config.edge_tolerance;
    let plan = match (entry_corner, exit_corner) {
        (Some(corner), None) | (None, Some(corner)) => {
            // A corner endpoint is not an edge crossing; the other one must be
            let (point, on_edge) = if entry_corner.is_some() {
                (segment.exit, segment.exit_on_edge)
            } else {
                (segment.entry, segment.entry_on_edge)
            };
            if !on_edge {
                return Ok(skip(id, SkipReason::NoEdgeCrossing));
            }
            let edge = edge_containing(point, c0, c1, c2, tolerance)?;
            if edge.opposite != corner {
                // Runs along the edge the corner belongs to
                return Ok(skip(id, SkipReason::SameEdge));
            }
            CutPlan::Corner {
                edge,
                edge_point: point,
            }
        }
        _ => match (segment.entry_on_edge, segment.exit_on_edge) {
            (true, true) => {
                let entry = edge_containing(segment.entry, c0, c1, c2, tolerance)?;
                let exit = edge_containing(segment.exit, c0, c1, c2, tolerance)?;
                if entry.opposite == exit.opposite {
                    return Ok(skip(id, SkipReason::SameEdge));
                }
                // Entry's edge runs N-A and exit's edge runs N-B
                CutPlan::Through {
                    near: 3 - entry.opposite - exit.opposite,
                    entry_far: exit.opposite,
                    exit_far: entry.opposite,
                }
            }
            (true, false) => CutPlan::Partial {
                edge: edge_containing(segment.entry, c0, c1, c2, tolerance)?,
                edge_point: segment.entry,
                interior: segment.exit,
            },
            _ => CutPlan::Partial {
                edge: edge_containing(segment.exit, c0, c1, c2, tolerance)?,
                edge_point: segment.exit,
                interior: segment.entry,
            },
        },
    };

    // ===== PHASE 3: BUILD NEW VERTICES AND TRIANGLES =====
    let offset = config.offset_distance;
    let base = surface.num_vertices() as u32;
    let (kind, vertices, triangles) = match plan {
        CutPlan::Through {
            near,
            entry_far,
            exit_far,
        } => {
            let (n, a, b) = (corners[near], corners[entry_far], corners[exit_far]);
            let (entry, exit) = (segment.entry, segment.exit);
            let vertices = vec![
                n,
                a,
                b,
                step_toward(entry, n, offset),
                step_toward(entry, a, offset),
                step_toward(exit, n, offset),
                step_toward(exit, b, offset),
            ];
            debug_assert_eq!(vertices.len(), THROUGH_CUT_VERTICES);
            let [vn, va, vb, en, ef, xn, xf] = local_indices(base);
            let triangles = vec![[vn, en, xn], [ef, va, vb], [ef, vb, xf]];
            (CutKind::Through, vertices, triangles)
        }
        CutPlan::Partial {
            edge,
            edge_point,
            interior,
        } => {
            let (a, b, o) = (corners[edge.start], corners[edge.end], corners[edge.opposite]);
            let vertices = vec![
                a,
                b,
                o,
                step_toward(edge_point, a, offset),
                step_toward(edge_point, b, offset),
                interior,
            ];
            debug_assert_eq!(vertices.len(), PARTIAL_CUT_VERTICES);
            let [va, vb, vo, ka, kb, vp] = local_indices(base);
            let far = if triangle_area(interior, b, o) >= triangle_area(interior, o, a) {
                [vp, vb, vo]
            } else {
                [vp, vo, va]
            };
            let triangles = vec![[va, ka, vp], [kb, vb, vp], far];
            (CutKind::Partial, vertices, triangles)
        }
        CutPlan::Corner { edge, edge_point } => {
            let (a, b, v) = (corners[edge.start], corners[edge.end], corners[edge.opposite]);
            let vertices = vec![
                a,
                b,
                v,
                step_toward(edge_point, a, offset),
                step_toward(edge_point, b, offset),
            ];
            debug_assert_eq!(vertices.len(), CORNER_CUT_VERTICES);
            let [va, vb, vv, ka, kb] = local_indices(base);
            let triangles = vec![[va, ka, vv], [kb, vb, vv]];
            (CutKind::Corner, vertices, triangles)
        }
    };

    let normal = triangle_normal(c0, c1, c2);
    let triangles: Vec<[u32; 3]> = triangles
        .into_iter()
        .map(|tri| orient(tri, base, &vertices, normal))
        .collect();

    // ===== PHASE 4: MUTATE =====
    let report = write_cut(surface, id, kind, &vertices, &triangles)?;
    debug!(
        "apply_cut: {:?} {:?} +{} vertices, triangles {:?}",
        kind, id, report.vertices_added, report.triangles
    );
    Ok(CutOutcome::Applied(report))
}

/// Open a seam along the edge of `id` closest to `point`.
///
/// Adds two vertices and no triangles; only triangle `id` is rewired.
pub fn open_edge_seam(
    surface: &mut SurfaceBuffer,
    id: TriangleId,
    point: Vec3,
    config: &CutConfig,
) -> Result<CutOutcome, CutError> {
    // ===== PHASE 1: GATHER (read-only, fail early) =====
    let corners = active_corners(surface, id)?;
    let mut indices = surface.triangle_indices(id)?;
    let edge = closest_edge(surface, id, point)?;

    // ===== PHASE 2: VALIDATE =====
    if shortest_edge_length(corners[0], corners[1], corners[2]) < config.min_triangle_edge {
        return Ok(skip(id, SkipReason::TriangleTooSmall));
    }

    // ===== PHASE 3: BUILD =====
    let toward = corners[edge.opposite];
    let vertices = [
        step_toward(edge.start_position, toward, config.offset_distance),
        step_toward(edge.end_position, toward, config.offset_distance),
    ];
    debug_assert_eq!(vertices.len(), EDGE_SEAM_VERTICES);
    let base = surface.num_vertices() as u32;
    indices[edge.start] = base;
    indices[edge.end] = base + 1;

    // ===== PHASE 4: MUTATE =====
    let report = write_cut(surface, id, CutKind::EdgeSeam, &vertices, &[indices])?;
    debug!(
        "open_edge_seam: {:?} edge {}-{} -> vertices {}..{}",
        id,
        edge.start,
        edge.end,
        base,
        base + 1
    );
    Ok(CutOutcome::Applied(report))
}

fn active_corners(surface: &SurfaceBuffer, id: TriangleId) -> Result<[Vec3; 3], CutError> {
    if !surface.is_active(id) {
        return Err(CutError::InvalidTriangle {
            id,
            count: surface.triangle_count(),
        });
    }
    surface.triangle_vertices(id)
}

fn skip(id: TriangleId, reason: SkipReason) -> CutOutcome {
    debug!("cut on {:?} skipped: {:?}", id, reason);
    CutOutcome::Skipped(reason)
}

fn local_indices<const N: usize>(base: u32) -> [u32; N] {
    std::array::from_fn(|i| base + i as u32)
}

/// Flip the last two corners when the triangle faces away from `normal`.
fn orient(tri: [u32; 3], base: u32, vertices: &[Vec3], normal: Vec3) -> [u32; 3] {
    let p = |i: u32| vertices[(i - base) as usize];
    if is_clockwise(p(tri[0]), p(tri[1]), p(tri[2]), normal) {
        [tri[0], tri[2], tri[1]]
    } else {
        tri
    }
}

/// Append `vertices`, overwrite `id` with the first triangle and append the rest.
fn write_cut(
    surface: &mut SurfaceBuffer,
    id: TriangleId,
    kind: CutKind,
    vertices: &[Vec3],
    triangles: &[[u32; 3]],
) -> Result<CutReport, CutError> {
    let first_new_vertex = surface.append_vertices(vertices);
    let mut ids = Vec::with_capacity(triangles.len());
    for (i, &tri) in triangles.iter().enumerate() {
        if i == 0 {
            surface.replace_triangle(id, tri)?;
            ids.push(id);
        } else {
            ids.push(surface.append_triangle(tri)?);
        }
    }
    Ok(CutReport {
        triangle: id,
        kind,
        first_new_vertex,
        vertices_added: vertices.len(),
        triangles: ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcut_config::GridConfig;

    const EPSILON: f32 = 1e-5;

    fn scenario() -> SurfaceBuffer {
        SurfaceBuffer::from_grid(&GridConfig::new(5, 3, 4.0, 2.0)).unwrap()
    }

    fn segment(entry: Vec3, exit: Vec3, entry_on_edge: bool, exit_on_edge: bool) -> CutSegment {
        CutSegment {
            triangle: TriangleId(0),
            entry,
            exit,
            entry_on_edge,
            exit_on_edge,
        }
    }

    /// Entry on the left grid edge, exit on the diagonal of triangle 0
    fn through_segment() -> CutSegment {
        segment(Vec3::new(0.0, 0.6, 0.0), Vec3::new(0.4, 0.4, 0.0), true, true)
    }

    fn assert_faces_like(surface: &SurfaceBuffer, ids: &[TriangleId], normal: Vec3) {
        for &id in ids {
            let [a, b, c] = surface.triangle_vertices(id).unwrap();
            assert!(triangle_normal(a, b, c).dot(normal) >= 0.0, "{id:?} flipped");
        }
    }

    #[test]
    fn test_through_cut_counts() {
        let mut surface = scenario();
        let outcome = apply_cut(&mut surface, &through_segment(), &CutConfig::default()).unwrap();

        let report = outcome.report().unwrap();
        assert_eq!(report.kind, CutKind::Through);
        assert_eq!(report.first_new_vertex, 15);
        assert_eq!(report.vertices_added, 7);
        assert_eq!(
            report.triangles,
            vec![TriangleId(0), TriangleId(16), TriangleId(17)]
        );
        assert_eq!(report.triangles_added(), 2);
        assert_eq!(surface.num_vertices(), 22);
        assert_eq!(surface.triangle_count(), 18);
        assert!(surface.validate().is_ok());
    }

    #[test]
    fn test_through_cut_opens_seam() {
        let mut surface = scenario();
        apply_cut(&mut surface, &through_segment(), &CutConfig::default()).unwrap();

        // [N', A', B', entry near, entry far, exit near, exit far]
        let entry_near = surface.vertex(18).unwrap();
        let entry_far = surface.vertex(19).unwrap();
        assert!((entry_near - Vec3::new(0.0, 0.58, 0.0)).length() < EPSILON);
        assert!((entry_far - Vec3::new(0.0, 0.62, 0.0)).length() < EPSILON);
        assert!((entry_near.distance(entry_far) - 0.04).abs() < EPSILON);

        let exit_near = surface.vertex(20).unwrap();
        let exit_far = surface.vertex(21).unwrap();
        assert!((exit_near.distance(exit_far) - 0.04).abs() < EPSILON);
        assert!(exit_near.length() < exit_far.length());

        // The near piece keeps the shared corner (0, 0)
        let [n, _, _] = surface.triangle_vertices(TriangleId(0)).unwrap();
        assert_eq!(n, Vec3::ZERO);
    }

    #[test]
    fn test_through_cut_keeps_winding() {
        let mut surface = scenario();
        let [a, b, c] = surface.triangle_vertices(TriangleId(0)).unwrap();
        let normal = triangle_normal(a, b, c);

        let outcome = apply_cut(&mut surface, &through_segment(), &CutConfig::default()).unwrap();
        assert_faces_like(&surface, &outcome.report().unwrap().triangles, normal);
    }

    #[test]
    fn test_partial_cut_counts_and_winding() {
        let interior = Vec3::new(0.2, 0.6, 0.0);
        let edge_point = Vec3::new(0.0, 0.6, 0.0);

        for seg in [
            segment(edge_point, interior, true, false),
            segment(interior, edge_point, false, true),
        ] {
            let mut surface = scenario();
            let [a, b, c] = surface.triangle_vertices(TriangleId(0)).unwrap();
            let normal = triangle_normal(a, b, c);

            let outcome = apply_cut(&mut surface, &seg, &CutConfig::default()).unwrap();
            let report = outcome.report().unwrap();
            assert_eq!(report.kind, CutKind::Partial);
            assert_eq!(surface.num_vertices(), 15 + 6);
            assert_eq!(surface.triangle_count(), 16 + 2);
            assert_eq!(surface.vertex(20), Some(interior));
            assert_faces_like(&surface, &report.triangles, normal);
            assert!(surface.validate().is_ok());
        }
    }

    #[test]
    fn test_no_edge_crossing_is_noop() {
        let mut surface = scenario();
        surface.take_dirty_triangles();
        let before = surface.indices().to_vec();

        let seg = segment(Vec3::new(0.1, 0.5, 0.0), Vec3::new(0.3, 0.7, 0.0), false, false);
        let outcome = apply_cut(&mut surface, &seg, &CutConfig::default()).unwrap();

        assert_eq!(outcome, CutOutcome::Skipped(SkipReason::NoEdgeCrossing));
        assert_eq!(surface.num_vertices(), 15);
        assert_eq!(surface.indices(), &before[..]);
        assert!(!surface.has_dirty_triangles());
    }

    #[test]
    fn test_corner_to_corner_is_skipped() {
        let mut surface = scenario();
        let seg = segment(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), true, true);
        let outcome = apply_cut(&mut surface, &seg, &CutConfig::default()).unwrap();
        assert_eq!(outcome, CutOutcome::Skipped(SkipReason::ThroughCorner));
        assert_eq!(surface.num_vertices(), 15);
    }

    #[test]
    fn test_same_edge_is_skipped() {
        let mut surface = scenario();
        let seg = segment(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 0.7, 0.0), true, true);
        let outcome = apply_cut(&mut surface, &seg, &CutConfig::default()).unwrap();
        assert_eq!(outcome, CutOutcome::Skipped(SkipReason::SameEdge));
        assert_eq!(surface.triangle_count(), 16);
    }

    #[test]
    fn test_small_triangle_is_skipped() {
        let mut surface = scenario();
        let config = CutConfig {
            min_triangle_edge: 5.0,
            ..CutConfig::default()
        };
        let outcome = apply_cut(&mut surface, &through_segment(), &config).unwrap();
        assert_eq!(outcome, CutOutcome::Skipped(SkipReason::TriangleTooSmall));
        assert_eq!(surface.num_vertices(), 15);
    }

    #[test]
    fn test_invalid_triangle_is_error() {
        let mut surface = scenario();
        let mut seg = through_segment();
        seg.triangle = TriangleId(99);
        assert_eq!(
            apply_cut(&mut surface, &seg, &CutConfig::default()),
            Err(CutError::InvalidTriangle {
                id: TriangleId(99),
                count: 16
            })
        );

        surface.remove_triangle(TriangleId(0)).unwrap();
        assert!(matches!(
            apply_cut(&mut surface, &through_segment(), &CutConfig::default()),
            Err(CutError::InvalidTriangle { .. })
        ));
        assert_eq!(surface.num_vertices(), 15);
    }

    #[test]
    fn test_flag_without_edge_is_error_and_untouched() {
        let mut surface = scenario();
        let before = surface.indices().to_vec();
        let interior = Vec3::new(0.2, 0.6, 0.0);
        let seg = segment(Vec3::new(0.0, 0.6, 0.0), interior, true, true);

        assert_eq!(
            apply_cut(&mut surface, &seg, &CutConfig::default()),
            Err(CutError::PointNotOnEdge { point: interior })
        );
        assert_eq!(surface.num_vertices(), 15);
        assert_eq!(surface.indices(), &before[..]);
    }

    #[test]
    fn test_offset_clamped_near_corner() {
        let mut surface = scenario();
        let seg = segment(Vec3::new(0.0, 0.01, 0.0), Vec3::new(0.4, 0.4, 0.0), true, true);
        apply_cut(&mut surface, &seg, &CutConfig::default()).unwrap();
        // Entry near offset may only consume half of the 0.01 to the corner
        let entry_near = surface.vertex(18).unwrap();
        assert!((entry_near - Vec3::new(0.0, 0.005, 0.0)).length() < EPSILON);
    }

    #[test]
    fn test_corner_to_facing_edge_splits_in_two() {
        let mut surface = scenario();
        let [a, b, c] = surface.triangle_vertices(TriangleId(0)).unwrap();
        let normal = triangle_normal(a, b, c);

        // From corner (0, 0) to the top edge it faces
        let seg = segment(Vec3::ZERO, Vec3::new(0.5, 1.0, 0.0), true, true);
        let outcome = apply_cut(&mut surface, &seg, &CutConfig::default()).unwrap();

        let report = outcome.report().unwrap();
        assert_eq!(report.kind, CutKind::Corner);
        assert_eq!(report.vertices_added, 5);
        assert_eq!(report.triangles, vec![TriangleId(0), TriangleId(16)]);
        assert_eq!(surface.num_vertices(), 20);
        assert_eq!(surface.triangle_count(), 17);
        assert_faces_like(&surface, &report.triangles, normal);
        for &id in &report.triangles {
            let [p, q, r] = surface.triangle_vertices(id).unwrap();
            assert!(triangle_area(p, q, r) > 0.1, "{id:?} is degenerate");
        }

        // Seam opens at the edge point and closes at the corner
        let (ka, kb) = (surface.vertex(18).unwrap(), surface.vertex(19).unwrap());
        assert!((ka.distance(kb) - 0.04).abs() < EPSILON);
        assert!(surface.validate().is_ok());
    }

    #[test]
    fn test_corner_endpoint_is_corner_split_either_way() {
        let seg = segment(Vec3::new(0.5, 1.0, 0.0), Vec3::ZERO, true, false);
        let mut surface = scenario();
        let outcome = apply_cut(&mut surface, &seg, &CutConfig::default()).unwrap();
        assert_eq!(outcome.report().unwrap().kind, CutKind::Corner);
    }

    #[test]
    fn test_corner_endpoint_skips() {
        let mut surface = scenario();
        // Along the edge the corner belongs to
        let along = segment(Vec3::ZERO, Vec3::new(0.0, 0.6, 0.0), true, true);
        assert_eq!(
            apply_cut(&mut surface, &along, &CutConfig::default()).unwrap(),
            CutOutcome::Skipped(SkipReason::SameEdge)
        );
        // From a corner to an interior point
        let inward = segment(Vec3::ZERO, Vec3::new(0.2, 0.6, 0.0), true, false);
        assert_eq!(
            apply_cut(&mut surface, &inward, &CutConfig::default()).unwrap(),
            CutOutcome::Skipped(SkipReason::NoEdgeCrossing)
        );
        assert_eq!(surface.num_vertices(), 15);
    }

    #[test]
    fn test_open_edge_seam() {
        let mut surface = scenario();
        let outcome = open_edge_seam(
            &mut surface,
            TriangleId(0),
            Vec3::new(0.1, 0.5, 0.0),
            &CutConfig::default(),
        )
        .unwrap();

        let report = outcome.report().unwrap();
        assert_eq!(report.kind, CutKind::EdgeSeam);
        assert_eq!(report.triangles, vec![TriangleId(0)]);
        assert_eq!(surface.num_vertices(), 17);
        assert_eq!(surface.triangle_count(), 16);
        // Edge 0-1 rewired, corner 2 untouched
        assert_eq!(surface.triangle_indices(TriangleId(0)).unwrap(), [15, 16, 6]);

        let pulled = surface.vertex(15).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize() * 0.02;
        assert!((pulled - expected).length() < EPSILON);
        // Neighbour still uses the original corner
        assert_eq!(surface.triangle_indices(TriangleId(1)).unwrap()[0], 0);
    }
}
