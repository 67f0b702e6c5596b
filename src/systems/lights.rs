use glam::Vec3;
use hecs::World;

use crate::components::{SceneLight, SunOrbit};

const HORIZON_COLOR: Vec3 = Vec3::new(1.0, 0.55, 0.3);
const ZENITH_COLOR: Vec3 = Vec3::new(1.0, 0.97, 0.9);

/// Advances every orbiting sun and tints it by its elevation.
pub fn sun_orbit_system(world: &mut World, dt: f32) {
    for (_entity, (orbit, light)) in world.query_mut::<(&mut SunOrbit, &mut SceneLight)>() {
        if orbit.paused {
            continue;
        }
        orbit.phase = (orbit.phase + orbit.speed * dt) % std::f32::consts::TAU;

        let direction = orbit.direction();
        light.0.set_direction(direction);

        let elevation = (-direction.y).clamp(0.0, 1.0);
        light.0.color = HORIZON_COLOR.lerp(ZENITH_COLOR, elevation.sqrt());
    }
}

/// Pauses or resumes every orbiting sun.
pub fn toggle_sun_orbit(world: &mut World) {
    for (_entity, orbit) in world.query_mut::<&mut SunOrbit>() {
        orbit.paused = !orbit.paused;
        tracing::info!(paused = orbit.paused, "sun orbit toggled");
    }
}
