//! Line-oriented text dump of surface buffers.
//!
//! Vertices are written as `x,y,z`, one per line; triangles as one index per
//! line, three lines per triangle. The format exists for offline inspection
//! and for seeding a surface from files; it carries no versioning.

use std::io::{BufRead, Write};

use glam::Vec3;
use thiserror::Error;

use crate::error::CutError;
use crate::surface::SurfaceBuffer;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Dump does not describe a valid surface: {0}")]
    Surface(#[from] CutError),
}

pub fn write_vertices<W: Write>(mut writer: W, vertices: &[Vec3]) -> Result<(), DumpError> {
    for v in vertices {
        writeln!(writer, "{},{},{}", v.x, v.y, v.z)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_triangles<W: Write>(mut writer: W, indices: &[u32]) -> Result<(), DumpError> {
    for index in indices {
        writeln!(writer, "{index}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse `x,y,z` lines. Blank lines are skipped.
pub fn read_vertices<R: BufRead>(reader: R) -> Result<Vec<Vec3>, DumpError> {
    let mut vertices = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parse_error = |message: String| DumpError::Parse {
            line: number + 1,
            message,
        };
        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        let [x, y, z] = fields[..] else {
            return Err(parse_error(format!(
                "expected 3 comma-separated values, found {}",
                fields.len()
            )));
        };
        let coord = |s: &str| {
            s.parse::<f32>()
                .map_err(|e| parse_error(format!("invalid coordinate {s:?}: {e}")))
        };
        vertices.push(Vec3::new(coord(x)?, coord(y)?, coord(z)?));
    }
    Ok(vertices)
}

/// Parse one index per line. Blank lines are skipped.
pub fn read_triangles<R: BufRead>(reader: R) -> Result<Vec<u32>, DumpError> {
    let mut indices = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let index = trimmed.parse::<u32>().map_err(|e| DumpError::Parse {
            line: number + 1,
            message: format!("invalid index {trimmed:?}: {e}"),
        })?;
        indices.push(index);
    }
    Ok(indices)
}

/// Dump the full buffers, removed slots included, so triangle ids survive a reload.
pub fn write_surface<V: Write, T: Write>(
    surface: &SurfaceBuffer,
    vertex_writer: V,
    triangle_writer: T,
) -> Result<(), DumpError> {
    write_vertices(vertex_writer, surface.vertices())?;
    write_triangles(triangle_writer, surface.indices())
}

/// Load a surface from a vertex dump and a triangle dump.
pub fn read_surface<V: BufRead, T: BufRead>(
    vertex_reader: V,
    triangle_reader: T,
) -> Result<SurfaceBuffer, DumpError> {
    let vertices = read_vertices(vertex_reader)?;
    let indices = read_triangles(triangle_reader)?;
    Ok(SurfaceBuffer::new(vertices, indices)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshcut_config::GridConfig;

    #[test]
    fn test_vertex_format() {
        let mut out = Vec::new();
        write_vertices(&mut out, &[Vec3::new(0.5, -1.0, 2.25), Vec3::ZERO]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.5,-1,2.25\n0,0,0\n");
    }

    #[test]
    fn test_triangle_format() {
        let mut out = Vec::new();
        write_triangles(&mut out, &[0, 5, 6]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\n5\n6\n");
    }

    #[test]
    fn test_reload_grid() {
        let surface = SurfaceBuffer::from_grid(&GridConfig::new(5, 3, 4.0, 2.0)).unwrap();
        let (mut vertices, mut triangles) = (Vec::new(), Vec::new());
        write_surface(&surface, &mut vertices, &mut triangles).unwrap();

        let restored = read_surface(&vertices[..], &triangles[..]).unwrap();
        assert_eq!(restored.vertices(), surface.vertices());
        assert_eq!(restored.indices(), surface.indices());
    }

    #[test]
    fn test_read_tolerates_blank_lines_and_spaces() {
        let vertices = read_vertices("1, 2, 3\n\n  4,5,6  \n".as_bytes()).unwrap();
        assert_eq!(
            vertices,
            vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn test_parse_errors_report_line() {
        match read_vertices("0,0,0\n1,2\n".as_bytes()) {
            Err(DumpError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
        match read_triangles("0\n1\nx\n".as_bytes()) {
            Err(DumpError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_read_surface_validates_indices() {
        let result = read_surface("0,0,0\n1,0,0\n".as_bytes(), "0\n1\n2\n".as_bytes());
        assert!(matches!(
            result,
            Err(DumpError::Surface(CutError::InvalidVertexIndex { index: 2, .. }))
        ));
    }
}
