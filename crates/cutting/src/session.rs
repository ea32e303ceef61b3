//! Cutting session: one surface, one blade.
//!
//! The session owns the surface buffer together with everything derived from
//! it (spatial index, tracker state) and keeps them consistent across every
//! mutation. The host drives it once per tick and registers listeners to
//! refresh render or collision state after changes.

use std::collections::HashSet;

use glam::Vec3;
use meshcut_config::{CutConfig, GridConfig, SessionConfig};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::constants::MAX_SEAM_ATTEMPTS_PER_CUT;
use crate::edges::{EDGE_SLOTS, quad_partner};
use crate::error::CutError;
use crate::locate::TriangleLocator;
use crate::surface::SurfaceBuffer;
use crate::tracker::PathTracker;
use crate::triangulate::{apply_cut, open_edge_seam};
use crate::types::{CutOutcome, CutReport, CutSegment, TriangleId};

/// Change notification sent to listeners after the surface was mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    CutApplied(CutReport),
    TrianglesRemoved(Vec<TriangleId>),
    Translated(Vec3),
    Rebuilt { vertices: usize, triangles: usize },
}

type Listener = Box<dyn FnMut(&SurfaceEvent) + Send>;

/// Single-threaded cutting engine for one surface.
pub struct CuttingSession {
    surface: SurfaceBuffer,
    locator: TriangleLocator,
    tracker: PathTracker,
    config: SessionConfig,
    listeners: Vec<Listener>,
}

impl std::fmt::Debug for CuttingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CuttingSession")
            .field("vertices", &self.surface.num_vertices())
            .field("triangles", &self.surface.triangle_count())
            .field("phase", &self.tracker.phase())
            .field("listener_count", &self.listeners.len())
            .finish()
    }
}

impl CuttingSession {
    /// Start a session on an existing surface.
    pub fn new(mut surface: SurfaceBuffer, config: SessionConfig) -> Self {
        let locator = TriangleLocator::new(&surface, &config.index);
        surface.take_dirty_triangles();
        info!(
            "cutting session started: {} vertices, {} triangles",
            surface.num_vertices(),
            surface.triangle_count()
        );
        Self {
            surface,
            locator,
            tracker: PathTracker::new(&config.cut),
            config,
            listeners: Vec::new(),
        }
    }

    /// Start a session on a grid built from `config.grid`.
    pub fn from_grid(config: SessionConfig) -> Result<Self, CutError> {
        let surface = SurfaceBuffer::from_grid(&config.grid)?;
        Ok(Self::new(surface, config))
    }

    pub fn surface(&self) -> &SurfaceBuffer {
        &self.surface
    }

    pub fn tracker(&self) -> &PathTracker {
        &self.tracker
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cut_config(&self) -> &CutConfig {
        &self.config.cut
    }

    pub fn grid_config(&self) -> &GridConfig {
        &self.config.grid
    }

    /// Register a callback fired after every surface change.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&SurfaceEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: SurfaceEvent) {
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn locate(&self, point: Vec3) -> Option<TriangleId> {
        self.locator.locate(&self.surface, point)
    }

    /// Feed one contact sample. Returns the cut applied this tick, if any.
    ///
    /// A segment whose edge-flagged point is not on an edge is rejected with
    /// `PointNotOnEdge`; the surface is left untouched and tracking goes on.
    pub fn tick(&mut self, sample: Vec3) -> Result<Option<CutReport>, CutError> {
        match self.tracker.update(&self.surface, &self.locator, sample)? {
            Some(segment) => self.apply_segment(&segment),
            None => Ok(None),
        }
    }

    /// Boundary event from the host: the blade touched the surface.
    pub fn tool_entered(&mut self, point: Vec3) {
        self.tracker
            .tool_entered(&self.surface, &self.locator, point);
    }

    /// Boundary event from the host: the blade left the surface.
    pub fn tool_exited(&mut self, point: Vec3) -> Result<Option<CutReport>, CutError> {
        match self
            .tracker
            .tool_exited(&self.surface, &self.locator, point)?
        {
            Some(segment) => self.apply_segment(&segment),
            None => Ok(None),
        }
    }

    /// Apply a segment directly, bypassing the tracker.
    pub fn apply_segment(&mut self, segment: &CutSegment) -> Result<Option<CutReport>, CutError> {
        let outcome = apply_cut(&mut self.surface, segment, &self.config.cut).inspect_err(|e| {
            if matches!(e, CutError::PointNotOnEdge { .. }) {
                warn!("rejected cut segment on {:?}: {}", segment.triangle, e);
            }
        })?;
        Ok(self.finish_cut(outcome))
    }

    /// Open a seam along the edge of `id` nearest to `point`.
    pub fn open_edge_seam(
        &mut self,
        id: TriangleId,
        point: Vec3,
    ) -> Result<Option<CutReport>, CutError> {
        let outcome = open_edge_seam(&mut self.surface, id, point, &self.config.cut)?;
        Ok(self.finish_cut(outcome))
    }

    /// Open up to `count` seams on randomly picked triangle edges.
    ///
    /// Edges are drawn from the surface as it was when the batch started and
    /// identified by their vertex pair, so no edge is opened twice (an edge
    /// shared by two triangles is opened on one side only). Returns fewer
    /// reports than requested once the edges run out.
    pub fn random_edge_seams<R: Rng>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<CutReport>, CutError> {
        let mut edges = Vec::new();
        for (id, corners) in self.surface.active_triangles() {
            let indices = self.surface.triangle_indices(id)?;
            for (start, end, _) in EDGE_SLOTS {
                let midpoint = (corners[start] + corners[end]) * 0.5;
                edges.push((id, edge_key(indices[start], indices[end]), midpoint));
            }
        }

        let mut used: HashSet<(u32, u32)> = HashSet::new();
        let mut reports = Vec::with_capacity(count);
        let attempts = count.saturating_mul(MAX_SEAM_ATTEMPTS_PER_CUT);

        for _ in 0..attempts {
            if reports.len() == count || edges.is_empty() {
                break;
            }
            let (id, key, midpoint) = edges[rng.random_range(0..edges.len())];
            if !used.insert(key) {
                continue;
            }
            if let Some(report) = self.open_edge_seam(id, midpoint)? {
                reports.push(report);
            }
        }

        if reports.len() < count {
            warn!(
                "random_edge_seams: opened {} of {} requested seams",
                reports.len(),
                count
            );
        } else {
            debug!("random_edge_seams: opened {} seams", count);
        }
        Ok(reports)
    }

    fn finish_cut(&mut self, outcome: CutOutcome) -> Option<CutReport> {
        match outcome {
            CutOutcome::Applied(report) => {
                self.locator.sync(&mut self.surface);
                self.emit(SurfaceEvent::CutApplied(report.clone()));
                Some(report)
            }
            CutOutcome::Skipped(_) => None,
        }
    }

    /// Remove a triangle and the neighbour sharing its longest edge.
    ///
    /// Returns the removed ids. Tracking restarts, since the blade may have
    /// been inside one of them.
    pub fn remove_quad(&mut self, id: TriangleId) -> Result<Vec<TriangleId>, CutError> {
        if !self.surface.is_active(id) {
            return Err(CutError::InvalidTriangle {
                id,
                count: self.surface.triangle_count(),
            });
        }
        let partner = quad_partner(
            &self.surface,
            &self.locator,
            id,
            self.config.cut.weld_epsilon,
        )?;

        let mut removed = vec![id];
        removed.extend(partner);
        for &triangle in &removed {
            self.surface.remove_triangle(triangle)?;
        }

        self.locator.sync(&mut self.surface);
        self.tracker.reset();
        self.emit(SurfaceEvent::TrianglesRemoved(removed.clone()));
        Ok(removed)
    }

    /// Move the whole surface by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        self.surface.translate(offset);
        self.surface.take_dirty_triangles();
        self.locator.rebuild(&self.surface);
        self.tracker.reset();
        self.emit(SurfaceEvent::Translated(offset));
    }

    /// Replace the surface with new buffers and start over.
    pub fn rebuild(&mut self, vertices: Vec<Vec3>, indices: Vec<u32>) -> Result<(), CutError> {
        self.surface.rebuild(vertices, indices)?;
        self.locator.sync(&mut self.surface);
        self.tracker.reset();
        self.emit(SurfaceEvent::Rebuilt {
            vertices: self.surface.num_vertices(),
            triangles: self.surface.triangle_count(),
        });
        Ok(())
    }

    /// Rebuild from the configured grid.
    pub fn reset_to_grid(&mut self) -> Result<(), CutError> {
        let grid = SurfaceBuffer::from_grid(&self.config.grid)?;
        self.rebuild(grid.vertices().to_vec(), grid.indices().to_vec())
    }
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}
