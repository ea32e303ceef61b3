//! Core cutting types.
//!
//! Segments and reports are serializable so a cut session can be recorded
//! and replayed deterministically against the same starting surface.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Type-safe triangle identifier (index-triple offset / 3 in the index buffer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriangleId(pub u32);

impl TriangleId {
    /// Offset of this triangle's first index in the flat index buffer
    #[inline]
    pub fn base(self) -> usize {
        self.0 as usize * 3
    }
}

/// One piece of the blade path, restricted to a single triangle.
///
/// Built by the path tracker once per crossing and consumed immediately by
/// the triangulator. The `*_on_edge` flags say whether the point lies on a
/// boundary edge of `triangle` (a crossing) or is an interior endpoint where
/// the path started or stopped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutSegment {
    pub triangle: TriangleId,
    pub entry: Vec3,
    pub exit: Vec3,
    pub entry_on_edge: bool,
    pub exit_on_edge: bool,
}

/// Which re-triangulation was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutKind {
    /// Entry and exit both on edges: triangle split into three with an open seam
    Through,
    /// One endpoint on an edge, the other inside: notch ending at the interior point
    Partial,
    /// One endpoint on a corner, the other on the facing edge: two wedges
    Corner,
    /// Seam opened along an existing edge of the triangle
    EdgeSeam,
}

/// Why a segment left the surface untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No endpoint lies on an edge away from the triangle's corners
    NoEdgeCrossing,
    /// Both endpoints coincide with corners of the triangle
    ThroughCorner,
    /// Entry and exit lie on the same edge
    SameEdge,
    /// Shortest triangle edge is below the configured minimum
    TriangleTooSmall,
}

/// Record of a successful buffer mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutReport {
    pub triangle: TriangleId,
    pub kind: CutKind,
    /// Index of the first vertex appended by this cut
    pub first_new_vertex: u32,
    pub vertices_added: usize,
    /// Slots written by this cut; the first entry is always `triangle`
    pub triangles: Vec<TriangleId>,
}

impl CutReport {
    /// Number of triangle slots this cut added (replacement not counted)
    pub fn triangles_added(&self) -> usize {
        self.triangles.len().saturating_sub(1)
    }
}

/// Result of applying a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CutOutcome {
    Applied(CutReport),
    Skipped(SkipReason),
}

impl CutOutcome {
    pub fn report(&self) -> Option<&CutReport> {
        match self {
            CutOutcome::Applied(report) => Some(report),
            CutOutcome::Skipped(_) => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, CutOutcome::Applied(_))
    }
}
