//! Shared configuration for meshcut
//!
//! This crate is the single source of truth for the tunables of the cutting
//! engine: seam offset and tolerances, the grid used to bootstrap a surface,
//! and the spatial index sizing. Every struct round-trips through JSON so a
//! host can keep its settings next to its other assets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Gap opened on each side of a cut point along the cut edge (length units)
pub const DEFAULT_OFFSET_DISTANCE: f32 = 0.02;

/// Perpendicular distance under which a point counts as lying on an edge
pub const DEFAULT_EDGE_TOLERANCE: f32 = 1e-5;

/// Distance under which two vertex positions are the same logical vertex
pub const DEFAULT_WELD_EPSILON: f32 = 1e-5;

/// Triangles whose shortest edge is below this are never cut
pub const DEFAULT_MIN_TRIANGLE_EDGE: f32 = 2.0 * DEFAULT_OFFSET_DISTANCE;

/// Default grid resolution along x
pub const DEFAULT_VERTICES_ALONG_X: u32 = 50;

/// Default grid resolution along y
pub const DEFAULT_VERTICES_ALONG_Y: u32 = 30;

/// Default grid extent along x
pub const DEFAULT_GRID_WIDTH: f32 = 5.0;

/// Default grid extent along y
pub const DEFAULT_GRID_HEIGHT: f32 = 3.0;

/// Spatial cell edge as a multiple of the mean triangle bounds extent
pub const DEFAULT_CELL_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameters of the cut triangulator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutConfig {
    /// Seam half-width applied on each side of entry/exit points
    pub offset_distance: f32,
    /// Tolerance for "point lies on this edge" tests (scaled by edge length above 1)
    pub edge_tolerance: f32,
    /// Tolerance for treating two vertex positions as the same vertex
    pub weld_epsilon: f32,
    /// Minimum shortest-edge length of a triangle that may still be cut
    pub min_triangle_edge: f32,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            offset_distance: DEFAULT_OFFSET_DISTANCE,
            edge_tolerance: DEFAULT_EDGE_TOLERANCE,
            weld_epsilon: DEFAULT_WELD_EPSILON,
            min_triangle_edge: DEFAULT_MIN_TRIANGLE_EDGE,
        }
    }
}

impl CutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.offset_distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "offset_distance must be positive, got {}",
                self.offset_distance
            )));
        }
        if !(self.edge_tolerance >= 0.0) || !(self.weld_epsilon >= 0.0) {
            return Err(ConfigError::Invalid(
                "edge_tolerance and weld_epsilon must be non-negative".to_string(),
            ));
        }
        if !(self.min_triangle_edge >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_triangle_edge must be non-negative, got {}",
                self.min_triangle_edge
            )));
        }
        Ok(())
    }
}

/// Regular grid used to bootstrap a flat surface in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub vertices_along_x: u32,
    pub vertices_along_y: u32,
    pub width: f32,
    pub height: f32,
    /// Shift the grid so it spans `[-width/2, width/2]` along x
    pub centered: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            vertices_along_x: DEFAULT_VERTICES_ALONG_X,
            vertices_along_y: DEFAULT_VERTICES_ALONG_Y,
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            centered: false,
        }
    }
}

impl GridConfig {
    /// Create a grid config anchored at the origin
    pub fn new(vertices_along_x: u32, vertices_along_y: u32, width: f32, height: f32) -> Self {
        Self {
            vertices_along_x,
            vertices_along_y,
            width,
            height,
            centered: false,
        }
    }

    /// Number of vertices the grid produces
    pub fn vertex_count(&self) -> usize {
        self.vertices_along_x as usize * self.vertices_along_y as usize
    }

    /// Number of triangles the grid produces (two per quad)
    pub fn triangle_count(&self) -> usize {
        2 * (self.vertices_along_x.saturating_sub(1) as usize)
            * (self.vertices_along_y.saturating_sub(1) as usize)
    }

    /// Spacing between neighbouring vertices along x and y
    pub fn spacing(&self) -> (f32, f32) {
        (
            self.width / (self.vertices_along_x.max(2) - 1) as f32,
            self.height / (self.vertices_along_y.max(2) - 1) as f32,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vertices_along_x < 2 || self.vertices_along_y < 2 {
            return Err(ConfigError::Invalid(format!(
                "grid needs at least 2x2 vertices, got {}x{}",
                self.vertices_along_x, self.vertices_along_y
            )));
        }
        if !(self.width > 0.0) || !(self.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "grid extent must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Sizing of the triangle spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Cell edge = mean triangle bounds extent × cell_scale
    pub cell_scale: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cell_scale: DEFAULT_CELL_SCALE,
        }
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "cell_scale must be positive, got {}",
                self.cell_scale
            )));
        }
        Ok(())
    }
}

/// Complete configuration of a cutting session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct SessionConfig {
    pub cut: CutConfig,
    pub grid: GridConfig,
    pub index: IndexConfig,
}

impl SessionConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cut.validate()?;
        self.grid.validate()?;
        self.index.validate()
    }
}
