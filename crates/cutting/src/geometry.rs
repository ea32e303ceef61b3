//! Stateless geometry primitives used by the locator, resolver and triangulator.
//!
//! Points are `Vec3` in the surface's local space. Triangles need not lie in
//! a coordinate plane; classification works on the projection of the point
//! onto the triangle's plane.

use glam::Vec3;

use crate::constants::DEGENERATE_EPSILON;

/// Barycentric coordinates of `p` relative to triangle `(a, b, c)`.
///
/// Uses the edge vectors `v0 = c - a`, `v1 = b - a`, `v2 = p - a`. The returned
/// `u` weighs `c` and `v` weighs `b`. Returns `None` for degenerate triangles
/// (zero or near-zero area), never dividing by a vanishing denominator.
pub fn barycentric(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<(f32, f32)> {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = v0.dot(v0);
    let dot01 = v0.dot(v1);
    let dot02 = v0.dot(v2);
    let dot11 = v1.dot(v1);
    let dot12 = v1.dot(v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    // Relative test: the denominator is |v0|²|v1|² sin²θ
    if !(denom > DEGENERATE_EPSILON * dot00 * dot11) {
        return None;
    }

    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;
    Some((u, v))
}

/// Point-in-triangle classification.
///
/// Inside means `u >= 0`, `v >= 0` and `u + v < 1`. The two edges through `a`
/// are inclusive and the far edge `b-c` is exclusive, so corner `a` is inside
/// while corners `b` and `c` are not. Neighbouring triangles therefore do not
/// both claim a point on their far edge. Degenerate triangles contain nothing.
pub fn point_in_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> bool {
    match barycentric(p, a, b, c) {
        Some((u, v)) => u >= 0.0 && v >= 0.0 && u + v < 1.0,
        None => false,
    }
}

/// Closest point to `p` on segment `a-b` (projection parameter clamped to `[0, 1]`).
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq == 0.0 {
        return a;
    }
    let t = ((p - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Unclamped projection parameter of `p` on the line through `a` and `b`.
///
/// Returns `None` for a zero-length segment.
pub fn segment_parameter(p: Vec3, a: Vec3, b: Vec3) -> Option<f32> {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq == 0.0 {
        return None;
    }
    Some((p - a).dot(ab) / length_sq)
}

/// Winding test against a reference axis.
///
/// True when `(p2 - p1) × (p3 - p1)` points away from `up`. Swapping any two
/// arguments flips the result for non-degenerate triangles.
pub fn is_clockwise(p1: Vec3, p2: Vec3, p3: Vec3, up: Vec3) -> bool {
    (p2 - p1).cross(p3 - p1).dot(up) < 0.0
}

/// Unnormalized face normal following the triangle's winding.
#[inline]
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

pub fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    triangle_normal(a, b, c).length() * 0.5
}

pub fn shortest_edge_length(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    a.distance(b).min(b.distance(c)).min(c.distance(a))
}

/// Move `from` toward `to` by `distance`, never past the midpoint.
///
/// Used to open seams: the clamp keeps offset vertices on their edge even
/// when the cut point sits close to a corner.
pub fn step_toward(from: Vec3, to: Vec3, distance: f32) -> Vec3 {
    let span = from.distance(to);
    if span == 0.0 {
        return from;
    }
    let step = distance.min(span * crate::constants::MAX_OFFSET_FRACTION);
    from + (to - from) * (step / span)
}
