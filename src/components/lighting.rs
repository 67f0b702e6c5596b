use glam::{Quat, Vec3};
use umbra::Light;

/// A light in the scene. The light's name is the GLSL uniform it feeds.
pub struct SceneLight(pub Light);

/// How the renderer builds the shadow map of a [`SceneLight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowCaster {
    /// Cascaded orthographic maps fitted to the camera frustum.
    Cascaded,
    /// A single perspective map from the light's position.
    Perspective,
}

/// Swings a directional light back and forth around `axis`.
pub struct SunOrbit {
    pub axis: Vec3,
    /// Direction at the middle of the swing.
    pub base: Vec3,
    /// Largest angle away from `base`, radians.
    pub amplitude: f32,
    /// Radians of phase per second.
    pub speed: f32,
    pub phase: f32,
    pub paused: bool,
}

impl SunOrbit {
    pub fn new(base: Vec3, axis: Vec3, amplitude: f32, speed: f32) -> Self {
        Self {
            axis: axis.try_normalize().unwrap_or(Vec3::Z),
            base: base.try_normalize().unwrap_or(Vec3::NEG_Y),
            amplitude,
            speed,
            phase: 0.0,
            paused: false,
        }
    }

    pub fn direction(&self) -> Vec3 {
        Quat::from_axis_angle(self.axis, self.amplitude * self.phase.sin()) * self.base
    }
}
