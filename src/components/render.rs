use glam::Vec3;

/// Index into the MeshStore resource.
#[derive(Clone, Copy)]
pub struct MeshHandle(pub usize);

/// RGB albedo applied to an entity for rendering.
pub struct Color(pub Vec3);

/// Marker: drawn at full color, ignores lighting.
pub struct Emissive;

/// Marker: skipped by the shadow depth passes.
pub struct NoShadow;
