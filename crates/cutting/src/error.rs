//! Error types for cutting operations.

use glam::Vec3;
use thiserror::Error;

use crate::types::TriangleId;

/// Errors surfaced by the surface buffer, edge resolver and triangulator.
///
/// Degenerate triangles and missing shared edges are deliberately absent:
/// both are recovered where they occur (a degenerate triangle contains no
/// point, a missing shared edge falls back to projecting the sample onto
/// the nearest edge of each triangle).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CutError {
    #[error("Invalid triangle id {id:?} (surface has {count} triangle slots)")]
    InvalidTriangle { id: TriangleId, count: usize },
    #[error("Point {point} does not lie on any edge of the triangle")]
    PointNotOnEdge { point: Vec3 },
    #[error("Vertex index {index} out of range (surface has {count} vertices)")]
    InvalidVertexIndex { index: u32, count: usize },
    #[error("Index buffer length {len} is not a multiple of 3")]
    MalformedIndexBuffer { len: usize },
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
    #[cfg(feature = "bevy")]
    #[error("Cannot convert mesh: {0}")]
    MeshConversion(String),
}
