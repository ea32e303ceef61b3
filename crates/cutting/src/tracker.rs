//! Per-tick blade path tracking.
//!
//! The tracker is polled once per tick with the latest contact point. It
//! compares the containing triangle with the one from the previous tick and
//! emits at most one [`CutSegment`] per call, in the order the blade visits
//! triangles.
//!
//! Two entry rules coexist:
//! - A polled outside-to-inside transition projects the sample onto the
//!   closest edge of the new triangle and marks the entry on-edge.
//! - A boundary event from the host's collision layer (`tool_entered`) takes
//!   the contact point as-is and marks the entry off-edge.

use glam::Vec3;
use meshcut_config::CutConfig;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::edges::{closest_edge, shared_edge};
use crate::error::CutError;
use crate::geometry::closest_point_on_segment;
use crate::locate::TriangleLocator;
use crate::surface::SurfaceBuffer;
use crate::types::{CutSegment, TriangleId};

/// Where the blade was on the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackPhase {
    #[default]
    Outside,
    Inside(TriangleId),
}

/// Everything the tracker carries between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackerState {
    pub phase: TrackPhase,
    /// Start of the next segment (the previous segment's exit)
    pub entry: Option<Vec3>,
    pub entry_on_edge: bool,
}

/// Polled state machine turning contact samples into cut segments.
#[derive(Debug, Clone, Default)]
pub struct PathTracker {
    state: TrackerState,
    weld_epsilon: f32,
}

impl PathTracker {
    pub fn new(config: &CutConfig) -> Self {
        Self {
            state: TrackerState::default(),
            weld_epsilon: config.weld_epsilon,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn phase(&self) -> TrackPhase {
        self.state.phase
    }

    /// Forget the current path (surface rebuilt or moved).
    pub fn reset(&mut self) {
        self.state = TrackerState::default();
    }

    /// Advance by one sample.
    pub fn update(
        &mut self,
        surface: &SurfaceBuffer,
        locator: &TriangleLocator,
        sample: Vec3,
    ) -> Result<Option<CutSegment>, CutError> {
        let current = locator.locate(surface, sample);

        match (self.state.phase, current) {
            (TrackPhase::Outside, None) => Ok(None),

            (TrackPhase::Outside, Some(t)) => {
                let edge = closest_edge(surface, t, sample)?;
                trace!("tracker: outside -> {:?}, entry {:?}", t, edge.projected);
                self.state = TrackerState {
                    phase: TrackPhase::Inside(t),
                    entry: Some(edge.projected),
                    entry_on_edge: true,
                };
                Ok(None)
            }

            (TrackPhase::Inside(t1), Some(t2)) if t1 == t2 => Ok(None),

            (TrackPhase::Inside(t1), Some(t2)) => {
                let (exit, entry) = match shared_edge(surface, t1, t2, self.weld_epsilon)? {
                    Some((x, y)) => {
                        let exit = closest_point_on_segment(sample, x, y);
                        (exit, exit)
                    }
                    None => {
                        // Skipped a triangle this tick: leave t1 and enter t2
                        // through their own nearest edges
                        warn!(
                            "no shared edge between {:?} and {:?}, projecting {:?} onto each",
                            t1, t2, sample
                        );
                        (
                            closest_edge(surface, t1, sample)?.projected,
                            closest_edge(surface, t2, sample)?.projected,
                        )
                    }
                };
                trace!("tracker: {:?} -> {:?}, exit {:?}", t1, t2, exit);

                let segment = self.segment(t1, exit, true);
                self.state = TrackerState {
                    phase: TrackPhase::Inside(t2),
                    entry: Some(entry),
                    entry_on_edge: true,
                };
                Ok(segment)
            }

            (TrackPhase::Inside(t), None) => {
                let exit = closest_edge(surface, t, sample)?.projected;
                trace!("tracker: {:?} -> outside, exit {:?}", t, exit);

                let segment = self.segment(t, exit, true);
                self.reset();
                Ok(segment)
            }
        }
    }

    /// Boundary event: the host's collision layer reports the blade entering.
    ///
    /// The contact point becomes an off-edge entry. Never emits a segment.
    pub fn tool_entered(&mut self, surface: &SurfaceBuffer, locator: &TriangleLocator, point: Vec3) {
        self.state = match locator.locate(surface, point) {
            Some(t) => TrackerState {
                phase: TrackPhase::Inside(t),
                entry: Some(point),
                entry_on_edge: false,
            },
            None => TrackerState::default(),
        };
        trace!("tracker: tool entered at {:?} -> {:?}", point, self.state.phase);
    }

    /// Boundary event: the host's collision layer reports the blade leaving.
    ///
    /// An exit point inside the current triangle ends the path there and is
    /// marked off-edge. An exit point anywhere else (usually just past the
    /// boundary) is projected onto the current triangle's nearest edge. Tracking
    /// ends either way.
    pub fn tool_exited(
        &mut self,
        surface: &SurfaceBuffer,
        locator: &TriangleLocator,
        point: Vec3,
    ) -> Result<Option<CutSegment>, CutError> {
        let TrackPhase::Inside(t) = self.state.phase else {
            self.reset();
            return Ok(None);
        };

        let segment = if locator.locate(surface, point) == Some(t) {
            self.segment(t, point, false)
        } else {
            let exit = closest_edge(surface, t, point)?.projected;
            self.segment(t, exit, true)
        };
        trace!("tracker: tool exited at {:?} -> {:?}", point, segment);
        self.reset();
        Ok(segment)
    }

    fn segment(&self, triangle: TriangleId, exit: Vec3, exit_on_edge: bool) -> Option<CutSegment> {
        self.state.entry.map(|entry| CutSegment {
            triangle,
            entry,
            exit,
            entry_on_edge: self.state.entry_on_edge,
            exit_on_edge,
        })
    }
}
