//! Garment loading.
//!
//! Loading is the engine's only asynchronous operation. A [`GarmentLoader`]
//! turns a path into a [`GarmentMesh`]; the engine pairs every request with a
//! [`LoadTicket`] so results that arrive after a newer request are dropped.

use std::collections::HashMap;
use std::path::PathBuf;

use atelier_config::GarmentPreset;
use atelier_ipc::GarmentKind;
use glam::{Affine3A, Mat4, Vec2, Vec3};
use thiserror::Error;
use tracing::debug;

use crate::constants::UV_SET;
use crate::garment::{GarmentMesh, GarmentNode, MeshData, RootTransform};
use crate::material::SurfaceMaterial;
use crate::types::Color;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("No triangle geometry in {0}")]
    NoGeometry(String),

    #[error("Invalid geometry in {path}: {reason}")]
    InvalidGeometry { path: String, reason: String },

    #[error("Garment not found: {0}")]
    NotFound(String),

    #[error("Load was superseded by a newer request")]
    Superseded,

    #[error("No garment preset for {0:?}")]
    UnknownGarment(GarmentKind),
}

/// What to load and where to place it
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub path: String,
    pub kind: Option<GarmentKind>,
    pub root: RootTransform,
}

impl LoadRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: None,
            root: RootTransform::default(),
        }
    }
}

impl From<&GarmentPreset> for LoadRequest {
    fn from(preset: &GarmentPreset) -> Self {
        Self {
            path: preset.path.clone(),
            kind: Some(preset.kind),
            root: RootTransform {
                position: Vec3::from_array(preset.position),
                scale: preset.scale,
                rotation: Vec3::new(preset.rotation_x, 0.0, 0.0),
            },
        }
    }
}

/// Pending load, handed out by the engine when a load starts
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    pub(crate) generation: u64,
    pub(crate) request: LoadRequest,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &LoadRequest {
        &self.request
    }
}

/// Source of garment meshes
#[allow(async_fn_in_trait)]
pub trait GarmentLoader {
    /// Load the mesh hierarchy at `path`
    async fn load_garment(&self, path: &str) -> Result<GarmentMesh, LoadError>;
}

/// Loader serving meshes registered up front
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    garments: HashMap<String, GarmentMesh>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, mesh: GarmentMesh) {
        self.garments.insert(path.into(), mesh);
    }

    pub fn with(mut self, path: impl Into<String>, mesh: GarmentMesh) -> Self {
        self.insert(path, mesh);
        self
    }
}

impl GarmentLoader for MemoryLoader {
    async fn load_garment(&self, path: &str) -> Result<GarmentMesh, LoadError> {
        self.garments
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }
}

/// Loads `.glb` / `.gltf` files from disk.
///
/// Request paths are resolved under `root`; a leading `/` is treated as
/// relative to it, matching the web-style preset paths.
#[derive(Debug, Clone)]
pub struct GltfLoader {
    root: PathBuf,
}

impl GltfLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl GarmentLoader for GltfLoader {
    async fn load_garment(&self, path: &str) -> Result<GarmentMesh, LoadError> {
        let file = self.resolve(path);
        let bytes = tokio::fs::read(&file).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(path.to_string())
            } else {
                LoadError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })?;

        let mesh = parse_gltf(path, &bytes)?;
        debug!(
            "Parsed {} ({} bytes, {} triangles)",
            file.display(),
            bytes.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

/// Build a garment hierarchy from glTF bytes.
///
/// Only triangle-list primitives are kept. A mesh with several primitives becomes
/// one child node per primitive so each keeps its own material.
pub fn parse_gltf(path: &str, bytes: &[u8]) -> Result<GarmentMesh, LoadError> {
    let (document, buffers, _images) = gltf::import_slice(bytes).map_err(|e| LoadError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::NoGeometry(path.to_string()))?;

    let buffers: Vec<&[u8]> = buffers.iter().map(|data| &data.0[..]).collect();
    let roots = scene
        .nodes()
        .map(|node| import_node(path, &buffers, node))
        .collect::<Result<Vec<_>, _>>()?;

    let mesh = GarmentMesh { roots };
    mesh.validate(path)?;
    Ok(mesh)
}

fn import_node(path: &str, buffers: &[&[u8]], node: gltf::Node) -> Result<GarmentNode, LoadError> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    let transform = Affine3A::from_mat4(Mat4::from_cols_array_2d(&node.transform().matrix()));

    let mut out = GarmentNode {
        name,
        transform,
        ..GarmentNode::default()
    };

    if let Some(mesh) = node.mesh() {
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                debug!("Skipping {:?} primitive in {}", primitive.mode(), out.name);
                continue;
            }
            primitives.push(import_primitive(path, buffers, &primitive)?);
        }

        if primitives.len() == 1 {
            let (data, material) = primitives.remove(0);
            out.mesh = Some(data);
            out.material = Some(material);
        } else {
            for (i, (data, material)) in primitives.into_iter().enumerate() {
                let mut child = GarmentNode::with_mesh(format!("{}#{}", out.name, i), data);
                child.material = Some(material);
                out.children.push(child);
            }
        }
    }

    for child in node.children() {
        out.children.push(import_node(path, buffers, child)?);
    }
    Ok(out)
}

fn import_primitive(
    path: &str,
    buffers: &[&[u8]],
    primitive: &gltf::Primitive,
) -> Result<(MeshData, SurfaceMaterial), LoadError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).copied());

    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| LoadError::InvalidGeometry {
            path: path.to_string(),
            reason: format!("primitive {} has no positions", primitive.index()),
        })?
        .map(Vec3::from_array)
        .collect();
    let normals: Vec<Vec3> = reader
        .read_normals()
        .map(|it| it.map(Vec3::from_array).collect())
        .unwrap_or_default();
    let uvs: Vec<Vec2> = reader
        .read_tex_coords(UV_SET)
        .map(|it| it.into_f32().map(Vec2::from_array).collect())
        .unwrap_or_default();
    let indices: Vec<u32> = reader
        .read_indices()
        .map(|it| it.into_u32().collect())
        .unwrap_or_default();

    let pbr = primitive.material().pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let material = SurfaceMaterial {
        base_color: Color::rgb(r, g, b),
        roughness: pbr.roughness_factor(),
        metalness: pbr.metallic_factor(),
        ..SurfaceMaterial::default()
    };

    Ok((MeshData::new(positions, normals, uvs, indices), material))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_config::GarmentCatalog;

    fn triangle() -> GarmentMesh {
        GarmentMesh::from_mesh(
            "tri",
            MeshData::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![], vec![], vec![]),
        )
    }

    #[tokio::test]
    async fn test_memory_loader() {
        let loader = MemoryLoader::new().with("/models/wif.glb", triangle());
        let mesh = loader.load_garment("/models/wif.glb").await.unwrap();
        assert_eq!(mesh.triangle_count(), 1);

        let missing = loader.load_garment("/models/none.glb").await;
        assert!(matches!(missing, Err(LoadError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_gltf_loader_missing_file() {
        let loader = GltfLoader::new(std::env::temp_dir().join("decal-missing-assets"));
        let result = loader.load_garment("/models/wif.glb").await;
        assert!(matches!(result, Err(LoadError::NotFound(_))));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let result = parse_gltf("junk.glb", b"definitely not gltf");
        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_parse_minimal_gltf() {
        use base64::{Engine as _, engine::general_purpose::STANDARD};

        // One triangle, positions in an embedded base64 buffer
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let bytes: &[u8] = bytemuck::cast_slice(&positions);
        let encoded = STANDARD.encode(bytes);
        let json = format!(
            r#"{{
                "asset": {{ "version": "2.0" }},
                "scene": 0,
                "scenes": [{{ "nodes": [0] }}],
                "nodes": [{{ "name": "body", "mesh": 0, "translation": [0.0, 1.0, 0.0] }}],
                "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }}],
                "buffers": [{{ "byteLength": 36, "uri": "data:application/octet-stream;base64,{encoded}" }}],
                "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
                "accessors": [{{
                    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                    "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
                }}]
            }}"#
        );

        let mesh = parse_gltf("tri.gltf", json.as_bytes()).unwrap();
        assert_eq!(mesh.roots.len(), 1);
        assert_eq!(mesh.roots[0].name, "body");
        assert_eq!(mesh.triangle_count(), 1);
        let origin = mesh.roots[0].transform.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_request_from_preset() {
        let catalog = GarmentCatalog::default();
        let preset = catalog.get(GarmentKind::Polo).unwrap();
        let request = LoadRequest::from(preset);
        assert_eq!(request.kind, Some(GarmentKind::Polo));
        assert_eq!(request.path, "/models/waf.glb");
        assert_eq!(request.root.scale, preset.scale);
    }

    #[test]
    fn test_resolve_strips_leading_slash() {
        let loader = GltfLoader::new("/srv/assets");
        assert_eq!(loader.resolve("/models/wif.glb"), PathBuf::from("/srv/assets/models/wif.glb"));
    }
}
