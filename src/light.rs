use std::sync::atomic::{AtomicU32, Ordering};

use glam::Vec3;

/// Cone cut-off value meaning "no cone restriction".
pub const NO_CUT_OFF: f32 = -1.0;

static NEXT_LIGHT_ID: AtomicU32 = AtomicU32::new(1);

/// Opaque identifier used to key per-program uniform caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(u32);

impl LightId {
    fn next() -> Self {
        Self(NEXT_LIGHT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Distance attenuation coefficients: `1 / (c + l*d + q*d^2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Falloff {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Falloff {
    pub const NONE: Falloff = Falloff {
        constant: 1.0,
        linear: 0.0,
        quadratic: 0.0,
    };

    pub fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    /// Coefficients that fade a light out around `radius`.
    pub fn from_radius(radius: f32) -> Self {
        let radius = radius.max(f32::EPSILON);
        Self {
            constant: 1.0,
            linear: 4.5 / radius,
            quadratic: 75.0 / (radius * radius),
        }
    }
}

impl Default for Falloff {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

/// Ambient/diffuse/specular multipliers for Phong-style shading paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhongTerms {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl PhongTerms {
    pub fn new(ambient: f32, diffuse: f32, specular: f32) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
        }
    }
}

/// What kind of emitter a light is. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Sun-like light; only `direction` matters.
    Directional,
    Point {
        falloff: Falloff,
    },
    /// Cone light. Cut-offs are cosines of the inner/outer half-angles.
    Spot {
        falloff: Falloff,
        cut_off: f32,
        outer_cut_off: f32,
    },
    /// Area light shaped as a capsule of radius `width` and length `length`.
    Tube {
        falloff: Falloff,
        width: f32,
        length: f32,
    },
}

/// A light source as the shaders see it.
///
/// `name` and `kind` are fixed once built. Position, direction and color are
/// scene state and may change every frame. Whatever the kind, the values
/// reported to shaders stay consistent: a directional light never attenuates
/// and never has a cone, point and tube lights never have a cone.
#[derive(Debug, Clone)]
pub struct Light {
    name: String,
    id: LightId,
    kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    /// Radiance (`cLight` in the shaders).
    pub color: Vec3,
    pub phong: Option<PhongTerms>,
}

impl Light {
    fn with_kind(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            id: LightId::next(),
            kind,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            phong: None,
        }
    }

    pub fn directional(name: impl Into<String>, direction: Vec3) -> Self {
        let mut light = Self::with_kind(name, LightKind::Directional);
        light.set_direction(direction);
        light
    }

    pub fn point(name: impl Into<String>, position: Vec3, falloff: Falloff) -> Self {
        let mut light = Self::with_kind(name, LightKind::Point { falloff });
        light.position = position;
        light
    }

    /// Spot light from cone cosines. The outer cone is kept at least as wide as the inner one.
    pub fn spot(
        name: impl Into<String>,
        position: Vec3,
        direction: Vec3,
        falloff: Falloff,
        cut_off: f32,
        outer_cut_off: f32,
    ) -> Self {
        let cut_off = cut_off.clamp(-1.0, 1.0);
        let outer_cut_off = outer_cut_off.clamp(-1.0, 1.0).min(cut_off);
        let mut light = Self::with_kind(
            name,
            LightKind::Spot {
                falloff,
                cut_off,
                outer_cut_off,
            },
        );
        light.position = position;
        light.set_direction(direction);
        light
    }

    pub fn spot_from_degrees(
        name: impl Into<String>,
        position: Vec3,
        direction: Vec3,
        falloff: Falloff,
        inner_deg: f32,
        outer_deg: f32,
    ) -> Self {
        Self::spot(
            name,
            position,
            direction,
            falloff,
            inner_deg.to_radians().cos(),
            outer_deg.to_radians().cos(),
        )
    }

    pub fn tube(
        name: impl Into<String>,
        position: Vec3,
        direction: Vec3,
        falloff: Falloff,
        width: f32,
        length: f32,
    ) -> Self {
        let mut light = Self::with_kind(
            name,
            LightKind::Tube {
                falloff,
                width: width.max(0.0),
                length: length.max(0.0),
            },
        );
        light.position = position;
        light.set_direction(direction);
        light
    }

    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_phong(mut self, phong: PhongTerms) -> Self {
        self.phong = Some(phong);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> LightId {
        self.id
    }

    pub fn kind(&self) -> LightKind {
        self.kind
    }

    pub fn is_directional(&self) -> bool {
        matches!(self.kind, LightKind::Directional)
    }

    /// Normalizes `direction`; a zero vector keeps the light pointing down.
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = match direction.try_normalize() {
            Some(dir) => dir,
            None => {
                tracing::warn!(light = %self.name, "zero-length light direction, using -Y");
                Vec3::NEG_Y
            }
        };
    }

    pub fn falloff(&self) -> Falloff {
        match self.kind {
            LightKind::Directional => Falloff::NONE,
            LightKind::Point { falloff }
            | LightKind::Spot { falloff, .. }
            | LightKind::Tube { falloff, .. } => falloff,
        }
    }

    /// Inner and outer cone cosines, `NO_CUT_OFF` for anything but spot lights.
    pub fn cut_offs(&self) -> (f32, f32) {
        match self.kind {
            LightKind::Spot {
                cut_off,
                outer_cut_off,
                ..
            } => (cut_off, outer_cut_off),
            _ => (NO_CUT_OFF, NO_CUT_OFF),
        }
    }

    /// Tube `(width, length)`, zero for non-area lights.
    pub fn extent(&self) -> (f32, f32) {
        match self.kind {
            LightKind::Tube { width, length, .. } => (width, length),
            _ => (0.0, 0.0),
        }
    }

    /// Full opening angle of the spot cone in radians.
    pub fn cone_angle(&self) -> Option<f32> {
        match self.kind {
            LightKind::Spot { outer_cut_off, .. } if outer_cut_off > NO_CUT_OFF => {
                Some(2.0 * outer_cut_off.acos())
            }
            _ => None,
        }
    }

    /// End points of a tube light along its direction.
    pub fn tube_endpoints(&self) -> Option<(Vec3, Vec3)> {
        match self.kind {
            LightKind::Tube { length, .. } => {
                let half = self.direction * (length * 0.5);
                Some((self.position - half, self.position + half))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_light_reports_no_falloff_or_cone() {
        let light = Light::directional("sun", Vec3::new(0.0, -2.0, 0.0));
        assert!(light.is_directional());
        assert_eq!(light.falloff(), Falloff::NONE);
        assert_eq!(light.cut_offs(), (NO_CUT_OFF, NO_CUT_OFF));
        assert_eq!(light.extent(), (0.0, 0.0));
        assert!((light.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn spot_outer_cone_is_never_narrower() {
        // inner 40 deg, outer 20 deg: outer gets widened to the inner cone
        let light = Light::spot_from_degrees(
            "spot",
            Vec3::Y,
            Vec3::NEG_Y,
            Falloff::default(),
            40.0,
            20.0,
        );
        let (inner, outer) = light.cut_offs();
        assert!(outer <= inner);
        let angle = light.cone_angle().unwrap();
        assert!((angle - 80.0_f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn zero_direction_falls_back_to_down() {
        let mut light = Light::point("p", Vec3::ZERO, Falloff::from_radius(10.0));
        light.set_direction(Vec3::ZERO);
        assert_eq!(light.direction, Vec3::NEG_Y);
    }

    #[test]
    fn ids_are_unique_and_shared_by_clones() {
        let a = Light::directional("a", Vec3::NEG_Y);
        let b = Light::directional("a", Vec3::NEG_Y);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn tube_endpoints_span_length() {
        let light = Light::tube("tube", Vec3::ZERO, Vec3::X, Falloff::default(), 0.15, 3.0);
        let (p0, p1) = light.tube_endpoints().unwrap();
        assert!((p0.distance(p1) - 3.0).abs() < 1e-5);
        assert!(light.cut_offs().0 == NO_CUT_OFF);
    }
}
