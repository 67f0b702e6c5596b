use glam::{Mat4, Vec2, Vec3};

use super::frustum::FrustumQuad;
use crate::light::{Light, LightKind};

/// Smallest distance added in front of and behind a cascade along the light axis.
pub const MIN_DEPTH_PAD: f32 = 0.5;

const MIN_FOV: f32 = 1.0 * std::f32::consts::PI / 180.0;
const MAX_FOV: f32 = 170.0 * std::f32::consts::PI / 180.0;

/// Tuning for [`fit_light_matrix`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSettings {
    /// Multiplier on the depth range so casters just outside the cascade still land in the map.
    pub depth_margin: f32,
    /// Near-plane floor for perspective shadow projections.
    pub min_perspective_near: f32,
    /// Use this vertical field of view for perspective shadows instead of fitting one.
    pub fixed_fov: Option<f32>,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            depth_margin: 1.5,
            min_perspective_near: 0.05,
            fixed_fov: None,
        }
    }
}

/// World → light clip space transform for one cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSpace {
    pub view: Mat4,
    pub projection: Mat4,
    /// World-space width and height of the shadow map footprint.
    /// For perspective projections this is the footprint at the far plane.
    pub extent: Vec2,
    /// World units per shadow map texel. Zero when no texel snapping applied.
    pub texel_world_size: Vec2,
}

impl LightSpace {
    pub fn matrix(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for LightSpace {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            extent: Vec2::ZERO,
            texel_world_size: Vec2::ZERO,
        }
    }
}

/// Up vector for a light basis, switched off the light axis when they are near parallel.
fn light_up(direction: Vec3) -> Vec3 {
    if direction.y.abs() > 0.99 {
        Vec3::Z
    } else {
        Vec3::Y
    }
}

fn centroid(corners: &[Vec3]) -> Vec3 {
    corners.iter().copied().sum::<Vec3>() / corners.len().max(1) as f32
}

/// Longest distance between any two corners. Unchanged by camera translation or rotation.
pub fn bounding_diagonal(corners: &[Vec3]) -> f32 {
    let mut longest = 0.0_f32;
    for (i, a) in corners.iter().enumerate() {
        for b in &corners[i + 1..] {
            longest = longest.max(a.distance(*b));
        }
    }
    longest
}

/// Fits a light-space transform around the cascade bounded by `near_quad` and `far_quad`.
///
/// Directional lights get an orthographic box whose size is fixed by the
/// cascade's bounding diagonal and whose position snaps to whole shadow-map
/// texels, so shadow edges stay put while the camera moves. Other lights get
/// a perspective frustum from their position that contains the corners.
///
/// Light view space is right-handed and looks down `-Z`; near/far are
/// distances in front of the light eye.
pub fn fit_light_matrix(
    near_quad: &FrustumQuad,
    far_quad: &FrustumQuad,
    light: &Light,
    shadow_map_width: u32,
    shadow_map_height: u32,
    settings: &FitSettings,
) -> LightSpace {
    let mut corners = [Vec3::ZERO; 8];
    corners[..4].copy_from_slice(near_quad);
    corners[4..].copy_from_slice(far_quad);

    match light.kind() {
        LightKind::Directional => fit_orthographic(
            &corners,
            light.direction,
            shadow_map_width,
            shadow_map_height,
            settings,
        ),
        _ => fit_perspective(&corners, light, shadow_map_width, shadow_map_height, settings),
    }
}

fn fit_orthographic(
    corners: &[Vec3; 8],
    direction: Vec3,
    width: u32,
    height: u32,
    settings: &FitSettings,
) -> LightSpace {
    let direction = direction.try_normalize().unwrap_or(Vec3::NEG_Y);
    let up = light_up(direction);
    // rotation only: anchored to the world origin so the texel grid is too
    let basis = Mat4::look_at_rh(Vec3::ZERO, direction, up);

    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for corner in corners {
        let p = basis.transform_point3(*corner);
        min = min.min(p);
        max = max.max(p);
    }

    let resolution = Vec2::new(width.max(2) as f32, height.max(2) as f32);
    let diagonal = bounding_diagonal(corners);
    let (origin, size, texel) = if diagonal > f32::EPSILON {
        let texel = Vec2::splat(diagonal) / (resolution - Vec2::ONE);
        let origin = (min.truncate() / texel).floor() * texel;
        (origin, resolution * texel, texel)
    } else {
        tracing::warn!("cascade has no extent, shadow map texel snapping skipped");
        let center = (min.truncate() + max.truncate()) * 0.5;
        (center - Vec2::splat(0.5), Vec2::ONE, Vec2::ZERO)
    };

    let depth = max.z - min.z;
    let pad = (depth * (settings.depth_margin - 1.0)).max(MIN_DEPTH_PAD);

    // Equivalent to look_at_rh(eye, eye + direction, up) with the eye at the
    // snapped box centre, pulled back `pad` towards the light.
    let center = origin + size * 0.5;
    let eye = Vec3::new(center.x, center.y, max.z + pad);
    let view = Mat4::from_translation(-eye) * basis;

    let half = size * 0.5;
    let projection =
        Mat4::orthographic_rh_gl(-half.x, half.x, -half.y, half.y, 0.0, depth + 2.0 * pad);

    LightSpace {
        view,
        projection,
        extent: size,
        texel_world_size: texel,
    }
}

fn fit_perspective(
    corners: &[Vec3; 8],
    light: &Light,
    width: u32,
    height: u32,
    settings: &FitSettings,
) -> LightSpace {
    let eye = light.position;
    let forward = match light.kind() {
        LightKind::Point { .. } => (centroid(corners) - eye)
            .try_normalize()
            .unwrap_or(light.direction),
        _ => light.direction,
    };
    let forward = forward.try_normalize().unwrap_or(Vec3::NEG_Y);
    let view = Mat4::look_at_rh(eye, eye + forward, light_up(forward));
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    let min_near = settings.min_perspective_near.max(f32::EPSILON);

    let mut nearest = f32::MAX;
    let mut farthest = 0.0_f32;
    let mut tan_half = 0.0_f32;
    let mut behind = 0;
    for corner in corners {
        let p = view.transform_point3(*corner);
        let distance = -p.z;
        nearest = nearest.min(distance);
        farthest = farthest.max(distance);
        if distance > min_near {
            tan_half = tan_half.max(p.y.abs() / distance).max(p.x.abs() / (distance * aspect));
        } else {
            behind += 1;
        }
    }
    if behind > 0 && behind < corners.len() {
        tracing::debug!(
            light = light.name(),
            behind,
            "light sits inside the cascade, corners behind it fall outside the shadow frustum"
        );
    }

    let margin = settings.depth_margin.max(1.0);
    let near = (nearest / margin).max(min_near);
    let far = (farthest * margin).max(near + MIN_DEPTH_PAD);
    if farthest <= min_near {
        tracing::warn!(light = light.name(), "cascade lies behind the light, shadow frustum is empty");
    }

    let mut fov = match settings.fixed_fov {
        Some(fov) => fov,
        None if tan_half > 0.0 => 2.0 * tan_half.atan(),
        None => std::f32::consts::FRAC_PI_2,
    };
    if let Some(cone) = light.cone_angle() {
        fov = fov.min(cone);
    }
    let fov = fov.clamp(MIN_FOV, MAX_FOV);

    let projection = Mat4::perspective_rh_gl(fov, aspect, near, far);
    let far_height = 2.0 * far * (fov * 0.5).tan();

    LightSpace {
        view,
        projection,
        extent: Vec2::new(far_height * aspect, far_height),
        texel_world_size: Vec2::ZERO,
    }
}
