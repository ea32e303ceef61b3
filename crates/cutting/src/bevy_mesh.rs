//! Conversion between a [`SurfaceBuffer`] and Bevy render meshes.
//!
//! Renderers re-upload the whole mesh after each [`SurfaceEvent`]; removed
//! triangle slots are dropped from the index buffer and normals are
//! recomputed from the current faces.
//!
//! [`SurfaceEvent`]: crate::session::SurfaceEvent

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use crate::error::CutError;
use crate::geometry::triangle_normal;
use crate::surface::SurfaceBuffer;

/// Build a render mesh from the active triangles of `surface`.
pub fn to_bevy_mesh(surface: &SurfaceBuffer) -> Mesh {
    let positions: Vec<[f32; 3]> = surface.vertices().iter().map(|v| v.to_array()).collect();
    let indices = surface.render_indices();
    let normals = vertex_normals(surface, &indices);

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Bootstrap a surface from a triangle-list render mesh.
pub fn surface_from_bevy_mesh(mesh: &Mesh) -> Result<SurfaceBuffer, CutError> {
    if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
        return Err(CutError::MeshConversion(
            "primitive topology is not a triangle list".to_string(),
        ));
    }

    let positions = mesh
        .attribute(Mesh::ATTRIBUTE_POSITION)
        .and_then(|attr| attr.as_float3())
        .ok_or_else(|| CutError::MeshConversion("mesh has no float3 positions".to_string()))?;

    let indices: Vec<u32> = match mesh.indices() {
        Some(Indices::U16(idx)) => idx.iter().map(|&i| i as u32).collect(),
        Some(Indices::U32(idx)) => idx.to_vec(),
        None => return Err(CutError::MeshConversion("mesh has no indices".to_string())),
    };

    let vertices = positions.iter().map(|&p| glam::Vec3::from_array(p)).collect();
    SurfaceBuffer::new(vertices, indices)
}

/// Area-weighted vertex normals; isolated vertices get +Z.
fn vertex_normals(surface: &SurfaceBuffer, indices: &[u32]) -> Vec<[f32; 3]> {
    let vertices = surface.vertices();
    let mut accumulated = vec![glam::Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let normal = triangle_normal(vertices[a], vertices[b], vertices[c]);
        accumulated[a] += normal;
        accumulated[b] += normal;
        accumulated[c] += normal;
    }

    accumulated
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(glam::Vec3::Z).to_array())
        .collect()
}
