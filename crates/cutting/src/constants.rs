/// Relative threshold below which a barycentric denominator marks a degenerate triangle.
pub const DEGENERATE_EPSILON: f32 = f32::EPSILON;

/// Fraction of the distance to an edge endpoint a seam offset may consume.
pub const MAX_OFFSET_FRACTION: f32 = 0.5;

/// Number of vertices a through cut appends (three corners, two offset pairs).
pub const THROUGH_CUT_VERTICES: usize = 7;

/// Number of vertices a partial cut appends (three corners, one offset pair, interior endpoint).
pub const PARTIAL_CUT_VERTICES: usize = 6;

/// Number of vertices a corner split appends (three corners, one offset pair).
pub const CORNER_CUT_VERTICES: usize = 5;

/// Number of vertices an edge seam appends (the duplicated edge endpoints).
pub const EDGE_SEAM_VERTICES: usize = 2;

/// Triangle bounds are padded by this fraction of the grid cell edge.
pub const GRID_PADDING_FRACTION: f32 = 0.25;

/// Lower bound on the padding so planar surfaces get a non-empty box.
pub const MIN_GRID_PADDING: f32 = 1e-4;

/// Triangles overlapping more cells than this are tested on every query.
pub const MAX_CELLS_PER_TRIANGLE: u64 = 4096;

/// Random edge picks allowed per requested seam before a batch gives up.
pub const MAX_SEAM_ATTEMPTS_PER_CUT: usize = 32;
