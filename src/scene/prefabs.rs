use glam::{Mat4, Quat, Vec3};
use hecs::{Entity, World};
use umbra::Light;

use crate::components::*;
use crate::renderer::mesh::{create_box, create_cylinder, create_plane, create_sphere};
use crate::renderer::MeshStore;

/// Flat ground of `size × size` centred on the origin at y = 0.
pub fn spawn_ground(world: &mut World, meshes: &mut MeshStore, size: f32, color: Vec3) -> Entity {
    let handle = meshes.add(create_plane(size, 16));
    world.spawn((
        LocalTransform::new(Vec3::ZERO),
        GlobalTransform(Mat4::IDENTITY),
        handle,
        Color(color),
    ))
}

/// Box resting on the ground. `size` is the full extent, `yaw` in radians.
pub fn spawn_box(world: &mut World, meshes: &mut MeshStore, base: Vec3, size: Vec3, yaw: f32, color: Vec3) -> Entity {
    let handle = meshes.add(create_box(size.x, size.y, size.z));
    let transform = LocalTransform::new(base + Vec3::Y * size.y * 0.5).with_rotation(Quat::from_rotation_y(yaw));
    world.spawn((transform, GlobalTransform(Mat4::IDENTITY), handle, Color(color)))
}

pub fn spawn_sphere(world: &mut World, meshes: &mut MeshStore, center: Vec3, radius: f32, color: Vec3) -> Entity {
    let handle = meshes.add(create_sphere(1.0, 16, 32));
    world.spawn((
        LocalTransform::new(center).with_scale(Vec3::splat(radius)),
        GlobalTransform(Mat4::IDENTITY),
        handle,
        Color(color),
    ))
}

/// Sun with cascaded shadows, swinging slowly across the sky.
pub fn spawn_sun(world: &mut World, light: Light, swing: f32, speed: f32) -> Entity {
    let orbit = SunOrbit::new(light.direction, Vec3::Z, swing, speed);
    world.spawn((SceneLight(light), ShadowCaster::Cascaded, orbit))
}

/// Spot light with a perspective shadow and a small emissive marker at its position.
pub fn spawn_spot_light(world: &mut World, meshes: &mut MeshStore, light: Light) -> Entity {
    let marker = meshes.add(create_sphere(0.12, 8, 12));
    world.spawn((
        LocalTransform::new(light.position),
        GlobalTransform(Mat4::IDENTITY),
        marker,
        Color(light.color.normalize_or_zero()),
        Emissive,
        NoShadow,
        SceneLight(light),
        ShadowCaster::Perspective,
    ))
}

/// Tube light drawn as an emissive cylinder along its axis.
pub fn spawn_tube_light(world: &mut World, meshes: &mut MeshStore, light: Light) -> Entity {
    let (width, length) = light.extent();
    let mesh = meshes.add(create_cylinder(width.max(0.02), length, 12));
    let rotation = Quat::from_rotation_arc(Vec3::Y, light.direction);
    world.spawn((
        LocalTransform::new(light.position).with_rotation(rotation),
        GlobalTransform(Mat4::IDENTITY),
        mesh,
        Color(light.color.normalize_or_zero()),
        Emissive,
        NoShadow,
        SceneLight(light),
        ShadowCaster::Perspective,
    ))
}
