//! Conversion between engine geometry and Bevy meshes.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;
use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::garment::MeshData;
use crate::patch::DecalGeometry;

#[derive(Debug, Error)]
pub enum MeshConversionError {
    #[error("Mesh has no position attribute")]
    NoPositions,

    #[error("Mesh is not a triangle list")]
    NotTriangles,

    #[error("Invalid mesh: {0}")]
    Invalid(String),
}

impl MeshData {
    /// Copy a Bevy triangle mesh. Non-indexed meshes are read as triangle soup.
    pub fn from_bevy_mesh(mesh: &Mesh) -> Result<Self, MeshConversionError> {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            return Err(MeshConversionError::NotTriangles);
        }

        let positions: Vec<Vec3> = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|attr| attr.as_float3())
            .ok_or(MeshConversionError::NoPositions)?
            .iter()
            .map(|p| Vec3::from_array(*p))
            .collect();

        let normals: Vec<Vec3> = mesh
            .attribute(Mesh::ATTRIBUTE_NORMAL)
            .and_then(|attr| attr.as_float3())
            .map(|n| n.iter().map(|v| Vec3::from_array(*v)).collect())
            .unwrap_or_default();

        let uvs: Vec<Vec2> = mesh
            .attribute(Mesh::ATTRIBUTE_UV_0)
            .and_then(|attr| match attr {
                VertexAttributeValues::Float32x2(v) => Some(v.iter().map(|uv| Vec2::from_array(*uv)).collect()),
                _ => None,
            })
            .unwrap_or_default();

        let indices: Vec<u32> = match mesh.indices() {
            Some(Indices::U16(idx)) => idx.iter().map(|&i| i as u32).collect(),
            Some(Indices::U32(idx)) => idx.to_vec(),
            None => Vec::new(),
        };

        let data = MeshData::new(positions, normals, uvs, indices);
        data.validate().map_err(MeshConversionError::Invalid)?;
        Ok(data)
    }
}

impl DecalGeometry {
    /// Build a non-indexed Bevy mesh for rendering the patch
    pub fn to_bevy_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.positions().iter().map(|p| p.to_array()).collect();
        let normals: Vec<[f32; 3]> = self.normals().iter().map(|n| n.to_array()).collect();
        let uvs: Vec<[f32; 2]> = self.uvs().iter().map(|uv| uv.to_array()).collect();
        let indices: Vec<u32> = (0..self.vertex_count() as u32).collect();

        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        mesh.insert_indices(Indices::U32(indices));
        mesh
    }
}
