//! Atelier decal engine - stamping images onto garment meshes
//!
//! This crate provides the geometry and state behind the garment customizer:
//! - [`picker`] - Pointer position to surface hit via ray casting
//! - [`orientation`] - Decal frame from a hit point and surface normal
//! - [`patch`] - Clipping the garment down to a decal-sized patch
//! - [`decal_set`] - Placed decals and their scene attachment
//! - [`material`] - Garment color and finish, fixed decal material
//! - [`loader`] - Async garment loading (glTF, in-memory)
//! - [`texture`] - Uploaded image preprocessing
//! - [`engine`] - The single-owner state tying it all together

pub mod camera;
pub mod constants;
pub mod decal_set;
pub mod engine;
pub mod garment;
pub mod loader;
pub mod material;
pub mod orientation;
pub mod patch;
pub mod picker;
pub mod raycast;
pub mod scene;
pub mod texture;
pub mod types;

#[cfg(feature = "bevy")]
pub mod bevy_mesh;

pub use camera::*;
pub use constants::*;
pub use decal_set::*;
pub use engine::*;
pub use garment::*;
pub use loader::*;
pub use material::*;
pub use orientation::*;
pub use patch::*;
pub use picker::*;
pub use raycast::*;
pub use scene::*;
pub use texture::*;
pub use types::*;

#[cfg(feature = "bevy")]
pub use bevy_mesh::*;
