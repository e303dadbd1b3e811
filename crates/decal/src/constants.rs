use glam::Vec3;

/// Epsilon for floating point comparisons in ray and clipping math.
pub const EPSILON: f32 = 1e-6;

/// Reference up vector for decal orientation.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Up vector used when the surface normal is parallel to [`WORLD_UP`].
pub const FALLBACK_UP: Vec3 = Vec3::Z;

/// Index of the UV set read from garment meshes.
pub const UV_SET: u32 = 0;
