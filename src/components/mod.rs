mod lighting;
mod render;

pub use lighting::{SceneLight, ShadowCaster, SunOrbit};
pub use render::{Color, Emissive, MeshHandle, NoShadow};

use glam::{Mat4, Quat, Vec3};

/// Spatial transform with position, rotation, and scale.
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalTransform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// World-space transform matrix, written by the transform system.
pub struct GlobalTransform(pub Mat4);
