//! Light ↔ shader program uniform binding.
//!
//! A light is registered once per program: its quasi-static parameters are
//! uploaded by name and the locations of the per-frame fields (position and
//! direction) are cached. Per-frame updates then go straight to the cached
//! locations without any name lookup.

use std::collections::HashMap;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::light::{Light, LightId};

/// GL program object name. Zero is the null program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u32);

impl ProgramId {
    pub const NULL: ProgramId = ProgramId(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// A uniform location that the program actually exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

/// The slice of a shader program the binding protocol needs.
pub trait UniformProgram {
    fn id(&self) -> ProgramId;

    /// Makes this the current program. Global GPU state.
    fn bind(&self);

    /// `None` when the program has no active uniform of that name.
    fn uniform_location(&mut self, name: &str) -> Option<UniformLocation>;

    /// Writes to the currently bound program.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Looks the uniform up and writes it. Slow path, not for per-frame use.
    fn set_uniform_by_name(&mut self, name: &str, value: UniformValue) {
        match self.uniform_location(name) {
            Some(location) => self.set_uniform(location, value),
            None => tracing::debug!(uniform = name, "uniform not active in program, skipped"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("light '{light}' was updated before being registered with program {program}")]
    NotRegistered { light: String, program: u32 },
    #[error("cannot bind light '{light}' to the null program")]
    InvalidProgram { light: String },
}

/// Cached locations of the per-frame light fields in one program.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightSlots {
    pub position: Option<UniformLocation>,
    pub direction: Option<UniformLocation>,
}

/// Uniform location cache for every (program, light) pair that was registered.
#[derive(Debug, Default)]
pub struct LightBindings {
    slots: HashMap<(ProgramId, LightId), LightSlots>,
}

fn field(light: &Light, field: &str) -> String {
    format!("{}.{}", light.name(), field)
}

impl LightBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, program: ProgramId, light: LightId) -> bool {
        self.slots.contains_key(&(program, light))
    }

    pub fn slots(&self, program: ProgramId, light: LightId) -> Option<LightSlots> {
        self.slots.get(&(program, light)).copied()
    }

    /// Number of registered (program, light) pairs.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Uploads the light's static parameters and caches its per-frame locations.
    ///
    /// Registering the same pair again re-uploads and refreshes the cache.
    pub fn register_light<P: UniformProgram>(
        &mut self,
        program: &mut P,
        light: &Light,
    ) -> Result<(), BindingError> {
        let id = program.id();
        if id.is_null() {
            tracing::error!(light = light.name(), "register_light called with the null program");
            return Err(BindingError::InvalidProgram {
                light: light.name().to_string(),
            });
        }

        program.bind();

        let falloff = light.falloff();
        let (cut_off, outer_cut_off) = light.cut_offs();
        let (width, length) = light.extent();

        program.set_uniform_by_name(&field(light, "directional"), UniformValue::Bool(light.is_directional()));
        program.set_uniform_by_name(&field(light, "width"), UniformValue::Float(width));
        program.set_uniform_by_name(&field(light, "len"), UniformValue::Float(length));
        program.set_uniform_by_name(&field(light, "constant"), UniformValue::Float(falloff.constant));
        program.set_uniform_by_name(&field(light, "linear"), UniformValue::Float(falloff.linear));
        program.set_uniform_by_name(&field(light, "quadratic"), UniformValue::Float(falloff.quadratic));
        program.set_uniform_by_name(&field(light, "cutOff"), UniformValue::Float(cut_off));
        program.set_uniform_by_name(&field(light, "outerCutOff"), UniformValue::Float(outer_cut_off));
        upload_colors(program, light);

        let slots = LightSlots {
            position: program.uniform_location(&field(light, "position")),
            direction: program.uniform_location(&field(light, "direction")),
        };
        if self.slots.insert((id, light.id()), slots).is_some() {
            tracing::debug!(light = light.name(), program = id.0, "light re-registered");
        }
        Ok(())
    }

    /// Writes `transform * position` (with perspective divide) to the cached location.
    pub fn update_position<P: UniformProgram>(
        &self,
        program: &mut P,
        light: &Light,
        transform: &Mat4,
    ) -> Result<(), BindingError> {
        let slots = self.lookup(program.id(), light)?;
        let Some(location) = slots.position else {
            return Ok(());
        };

        let p = *transform * light.position.extend(1.0);
        let position = if p.w.abs() > f32::EPSILON {
            p.truncate() / p.w
        } else {
            p.truncate()
        };

        program.bind();
        program.set_uniform(location, UniformValue::Vec3(position));
        Ok(())
    }

    /// Writes `normal_matrix * direction` to the cached location.
    pub fn update_direction<P: UniformProgram>(
        &self,
        program: &mut P,
        light: &Light,
        normal_matrix: &Mat3,
    ) -> Result<(), BindingError> {
        let slots = self.lookup(program.id(), light)?;
        let Some(location) = slots.direction else {
            return Ok(());
        };

        program.bind();
        program.set_uniform(location, UniformValue::Vec3(*normal_matrix * light.direction));
        Ok(())
    }

    /// Re-uploads `cLight` and the Phong terms after the light's color changed.
    pub fn update_colors<P: UniformProgram>(
        &self,
        program: &mut P,
        light: &Light,
    ) -> Result<(), BindingError> {
        self.lookup(program.id(), light)?;
        program.bind();
        upload_colors(program, light);
        Ok(())
    }

    /// Drops every cached entry of a program, e.g. after it was deleted.
    pub fn forget_program(&mut self, program: ProgramId) {
        self.slots.retain(|(id, _), _| *id != program);
    }

    fn lookup(&self, program: ProgramId, light: &Light) -> Result<LightSlots, BindingError> {
        match self.slots.get(&(program, light.id())) {
            Some(slots) => Ok(*slots),
            None => {
                tracing::error!(
                    light = light.name(),
                    program = program.0,
                    "light updated before register_light, uniform write skipped"
                );
                Err(BindingError::NotRegistered {
                    light: light.name().to_string(),
                    program: program.0,
                })
            }
        }
    }
}

fn upload_colors<P: UniformProgram>(program: &mut P, light: &Light) {
    program.set_uniform_by_name(&field(light, "cLight"), UniformValue::Vec3(light.color));
    if let Some(phong) = light.phong {
        program.set_uniform_by_name(&field(light, "ambient"), UniformValue::Vec3(light.color * phong.ambient));
        program.set_uniform_by_name(&field(light, "diffuse"), UniformValue::Vec3(light.color * phong.diffuse));
        program.set_uniform_by_name(&field(light, "specular"), UniformValue::Vec3(light.color * phong.specular));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::light::{Falloff, PhongTerms, NO_CUT_OFF};

    /// Records every uniform write; knows the locations of a fixed set of names.
    struct MockProgram {
        id: ProgramId,
        names: Vec<String>,
        lookups: usize,
        binds: Cell<usize>,
        writes: Vec<(UniformLocation, UniformValue)>,
    }

    impl MockProgram {
        fn new(id: u32, names: &[&str]) -> Self {
            Self {
                id: ProgramId(id),
                names: names.iter().map(|n| n.to_string()).collect(),
                lookups: 0,
                binds: Cell::new(0),
                writes: Vec::new(),
            }
        }

        fn value_of(&self, name: &str) -> Option<UniformValue> {
            let index = self.names.iter().position(|n| n == name)? as i32;
            self.writes
                .iter()
                .rev()
                .find(|(loc, _)| loc.0 == index)
                .map(|(_, v)| *v)
        }
    }

    impl UniformProgram for MockProgram {
        fn id(&self) -> ProgramId {
            self.id
        }

        fn bind(&self) {
            self.binds.set(self.binds.get() + 1);
        }

        fn uniform_location(&mut self, name: &str) -> Option<UniformLocation> {
            self.lookups += 1;
            self.names
                .iter()
                .position(|n| n == name)
                .map(|i| UniformLocation(i as i32))
        }

        fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
            self.writes.push((location, value));
        }
    }

    fn spot_program(id: u32) -> MockProgram {
        MockProgram::new(
            id,
            &[
                "spot.directional",
                "spot.width",
                "spot.len",
                "spot.constant",
                "spot.linear",
                "spot.quadratic",
                "spot.cutOff",
                "spot.outerCutOff",
                "spot.cLight",
                "spot.position",
                "spot.direction",
            ],
        )
    }

    fn spot_light() -> Light {
        Light::spot(
            "spot",
            Vec3::new(1.0, 3.0, 2.0),
            Vec3::new(0.0, -1.0, -1.0),
            Falloff::new(1.0, 0.14, 0.07),
            0.9,
            0.8,
        )
        .with_color(Vec3::splat(10.0))
    }

    #[test]
    fn register_uploads_static_fields() {
        let mut program = spot_program(3);
        let light = spot_light();
        let mut bindings = LightBindings::new();

        bindings.register_light(&mut program, &light).unwrap();

        assert!(bindings.is_registered(ProgramId(3), light.id()));
        assert!(program.binds.get() > 0);
        assert_eq!(program.value_of("spot.directional"), Some(UniformValue::Bool(false)));
        assert_eq!(program.value_of("spot.linear"), Some(UniformValue::Float(0.14)));
        assert_eq!(program.value_of("spot.cutOff"), Some(UniformValue::Float(0.9)));
        assert_eq!(program.value_of("spot.outerCutOff"), Some(UniformValue::Float(0.8)));
        assert_eq!(program.value_of("spot.cLight"), Some(UniformValue::Vec3(Vec3::splat(10.0))));
        let slots = bindings.slots(ProgramId(3), light.id()).unwrap();
        assert_eq!(slots.position, Some(UniformLocation(9)));
        assert_eq!(slots.direction, Some(UniformLocation(10)));
    }

    #[test]
    fn updates_use_cached_locations() {
        let mut program = spot_program(3);
        let mut light = spot_light();
        let mut bindings = LightBindings::new();
        bindings.register_light(&mut program, &light).unwrap();
        let lookups_after_register = program.lookups;

        light.position = Vec3::new(1.0, 2.0, 3.0);
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        bindings.update_position(&mut program, &light, &view).unwrap();
        bindings
            .update_direction(&mut program, &light, &Mat3::from_mat4(view).inverse().transpose())
            .unwrap();

        assert_eq!(program.lookups, lookups_after_register);
        assert_eq!(
            program.value_of("spot.position"),
            Some(UniformValue::Vec3(Vec3::new(1.0, 2.0, -2.0)))
        );
        assert_eq!(program.value_of("spot.direction"), Some(UniformValue::Vec3(light.direction)));
    }

    #[test]
    fn position_is_divided_by_w() {
        let mut program = spot_program(3);
        let light = spot_light();
        let mut bindings = LightBindings::new();
        bindings.register_light(&mut program, &light).unwrap();

        let scale_w = Mat4::from_cols(Vec4::X, Vec4::Y, Vec4::Z, Vec4::new(0.0, 0.0, 0.0, 2.0));
        bindings.update_position(&mut program, &light, &scale_w).unwrap();
        assert_eq!(
            program.value_of("spot.position"),
            Some(UniformValue::Vec3(Vec3::new(0.5, 1.5, 1.0)))
        );
    }

    #[test]
    fn unregistered_update_writes_nothing() {
        let mut program = spot_program(3);
        let light = spot_light();
        let bindings = LightBindings::new();

        let err = bindings
            .update_position(&mut program, &light, &Mat4::IDENTITY)
            .unwrap_err();
        assert!(matches!(err, BindingError::NotRegistered { .. }));
        assert!(bindings
            .update_direction(&mut program, &light, &Mat3::IDENTITY)
            .is_err());
        assert!(program.writes.is_empty());
    }

    #[test]
    fn registration_is_per_program() {
        let mut first = spot_program(3);
        let mut second = spot_program(4);
        let light = spot_light();
        let mut bindings = LightBindings::new();
        bindings.register_light(&mut first, &light).unwrap();

        assert!(bindings
            .update_position(&mut second, &light, &Mat4::IDENTITY)
            .is_err());
        assert!(second.writes.is_empty());
    }

    #[test]
    fn null_program_leaves_cache_untouched() {
        let mut program = spot_program(0);
        let light = spot_light();
        let mut bindings = LightBindings::new();

        let err = bindings.register_light(&mut program, &light).unwrap_err();
        assert!(matches!(err, BindingError::InvalidProgram { .. }));
        assert!(bindings.is_empty());
        assert!(program.writes.is_empty());
        assert_eq!(program.binds.get(), 0);
    }

    #[test]
    fn directional_light_uploads_neutral_falloff_and_cone() {
        let mut program = MockProgram::new(
            7,
            &["sun.directional", "sun.constant", "sun.linear", "sun.cutOff", "sun.direction"],
        );
        let light = Light::directional("sun", Vec3::new(3.0, -4.0, 0.0));
        let mut bindings = LightBindings::new();
        bindings.register_light(&mut program, &light).unwrap();

        assert_eq!(program.value_of("sun.directional"), Some(UniformValue::Bool(true)));
        assert_eq!(program.value_of("sun.constant"), Some(UniformValue::Float(1.0)));
        assert_eq!(program.value_of("sun.linear"), Some(UniformValue::Float(0.0)));
        assert_eq!(program.value_of("sun.cutOff"), Some(UniformValue::Float(NO_CUT_OFF)));

        // no position uniform in this program: the update is a quiet no-op
        let slots = bindings.slots(ProgramId(7), light.id()).unwrap();
        assert_eq!(slots.position, None);
        let writes = program.writes.len();
        bindings
            .update_position(&mut program, &light, &Mat4::IDENTITY)
            .unwrap();
        assert_eq!(program.writes.len(), writes);
    }

    #[test]
    fn phong_terms_scale_color() {
        let mut program = MockProgram::new(2, &["lamp.ambient", "lamp.diffuse", "lamp.specular"]);
        let mut light = Light::point("lamp", Vec3::ZERO, Falloff::default())
            .with_color(Vec3::new(1.0, 0.5, 0.25))
            .with_phong(PhongTerms::new(0.1, 0.8, 1.0));
        let mut bindings = LightBindings::new();
        bindings.register_light(&mut program, &light).unwrap();
        assert_eq!(
            program.value_of("lamp.ambient"),
            Some(UniformValue::Vec3(Vec3::new(0.1, 0.05, 0.025)))
        );

        light.color = Vec3::ONE;
        bindings.update_colors(&mut program, &light).unwrap();
        assert_eq!(program.value_of("lamp.diffuse"), Some(UniformValue::Vec3(Vec3::splat(0.8))));
    }

    #[test]
    fn forget_program_drops_its_entries() {
        let mut first = spot_program(3);
        let mut second = spot_program(4);
        let light = spot_light();
        let mut bindings = LightBindings::new();
        bindings.register_light(&mut first, &light).unwrap();
        bindings.register_light(&mut second, &light).unwrap();

        bindings.forget_program(ProgramId(3));
        assert_eq!(bindings.len(), 1);
        assert!(bindings.is_registered(ProgramId(4), light.id()));
    }
}
