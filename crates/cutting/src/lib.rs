//! Incremental mesh cutting for meshcut
//!
//! This crate turns a stream of blade contact samples into seams in a
//! triangulated surface:
//! - [`geometry`] - Point-in-triangle, segment projection and winding tests
//! - [`surface`] - Growable vertex/triangle buffers with soft delete and dirty tracking
//! - [`spatial`] - Uniform hash grid over triangle bounds
//! - [`locate`] - Containing-triangle queries backed by the spatial grid
//! - [`edges`] - Shared edge, closest edge and edge membership queries
//! - [`tracker`] - Per-tick state machine that emits cut segments
//! - [`triangulate`] - Re-triangulation of a cut triangle with an open seam
//! - [`session`] - Orchestrates tracker → triangulator → listeners
//! - [`dump`] - Line-oriented text dump for offline inspection
//! - `bevy_mesh` - Render mesh conversion (feature `bevy`)
//!
//! # Architecture
//!
//! The host polls the session once per fixed tick with the latest contact
//! point (in the surface's local space). The tracker compares the containing
//! triangle with the previous tick and, when the blade crosses into another
//! triangle or leaves the surface, emits a [`CutSegment`]. The triangulator
//! applies the segment to the [`SurfaceBuffer`] synchronously and listeners are
//! told to refresh their render/collision state.

pub mod constants;
pub mod dump;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod locate;
pub mod session;
pub mod spatial;
pub mod surface;
pub mod tracker;
pub mod triangulate;
pub mod types;

#[cfg(feature = "bevy")]
pub mod bevy_mesh;

pub use dump::DumpError;
pub use edges::{EdgeContact, TriangleEdge};
pub use error::CutError;
pub use locate::TriangleLocator;
pub use meshcut_config::{CutConfig, GridConfig, IndexConfig, SessionConfig};
pub use session::{CuttingSession, SurfaceEvent};
pub use spatial::{Aabb, TriangleGrid};
pub use surface::SurfaceBuffer;
pub use tracker::{PathTracker, TrackPhase, TrackerState};
pub use triangulate::{apply_cut, open_edge_seam};
pub use types::{CutKind, CutOutcome, CutReport, CutSegment, SkipReason, TriangleId};
