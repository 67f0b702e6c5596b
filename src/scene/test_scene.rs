use glam::Vec3;
use hecs::World;
use umbra::{Falloff, Light};

use crate::renderer::{MeshStore, SceneBounds};
use crate::scene::prefabs::{spawn_box, spawn_ground, spawn_sphere, spawn_spot_light, spawn_sun, spawn_tube_light};

const GROUND_SIZE: f32 = 60.0;

/// Build and populate the shadow test scene.
/// Returns the mesh store, which owns all GPU mesh data.
pub fn load_shadow_scene(world: &mut World) -> MeshStore {
    let mut meshes = MeshStore::new();

    spawn_ground(world, &mut meshes, GROUND_SIZE, Vec3::new(0.55, 0.55, 0.5));

    // A row of pillars receding from the camera crosses every cascade.
    let stone = Vec3::new(0.6, 0.58, 0.55);
    for i in 0..8 {
        let z = -4.0 - i as f32 * 6.0;
        let x = if i % 2 == 0 { -3.0 } else { 3.0 };
        spawn_box(world, &mut meshes, Vec3::new(x, 0.0, z), Vec3::new(0.8, 3.0 + i as f32 * 0.5, 0.8), 0.3 * i as f32, stone);
    }

    for &(x, z, w, h, d, yaw) in &[
        (6.0_f32, 2.0_f32, 2.5_f32, 1.5_f32, 3.5_f32, 0.4_f32),
        (-7.0, -2.0, 3.0, 2.5, 2.0, -0.2),
        (1.0, 6.0, 1.2, 0.6, 1.2, 0.0),
    ] {
        spawn_box(world, &mut meshes, Vec3::new(x, 0.0, z), Vec3::new(w, h, d), yaw, Vec3::new(0.45, 0.5, 0.6));
    }

    spawn_sphere(world, &mut meshes, Vec3::new(0.0, 1.0, 0.0), 1.0, Vec3::new(0.8, 0.25, 0.2));
    spawn_sphere(world, &mut meshes, Vec3::new(-3.5, 0.6, 3.0), 0.6, Vec3::new(0.25, 0.6, 0.3));
    spawn_sphere(world, &mut meshes, Vec3::new(4.0, 2.2, -9.0), 0.8, Vec3::new(0.9, 0.8, 0.3));

    // Light names match the uniform structs in lit.frag.
    let sun = Light::directional("dirLight", Vec3::new(-0.3, -1.0, -0.2)).with_color(Vec3::new(1.0, 0.97, 0.9));
    spawn_sun(world, sun, 1.1, 0.05);

    let spot = Light::spot_from_degrees(
        "spotLight",
        Vec3::new(6.0, 6.0, 6.0),
        Vec3::new(-0.4, -1.0, -0.4),
        Falloff::from_radius(30.0),
        20.0,
        30.0,
    )
    .with_color(Vec3::new(6.0, 5.0, 3.5));
    spawn_spot_light(world, &mut meshes, spot);

    let tube = Light::tube(
        "tubeLight",
        Vec3::new(-6.0, 3.5, 5.0),
        Vec3::NEG_Y,
        Falloff::from_radius(20.0),
        0.06,
        1.5,
    )
    .with_color(Vec3::new(1.5, 3.0, 5.0));
    spawn_tube_light(world, &mut meshes, tube);

    let half = GROUND_SIZE * 0.5;
    world.spawn((SceneBounds {
        min: Vec3::new(-half, 0.0, -half),
        max: Vec3::new(half, 6.0, half),
    },));

    meshes
}
