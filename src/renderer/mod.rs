pub mod mesh;
pub mod shader;
pub mod shadow_target;

use std::collections::HashMap;

use glam::{Mat3, Mat4, Vec3};
use hecs::World;
use mesh::Mesh;
use shader::ShaderProgram;
use shadow_target::{ShadowTarget, UniformBuffer};
use umbra::csm::uniforms::{
    CascadeMatrices, ShadowParams, CASCADE_MATRICES_BINDING, MAX_CASCADES, SHADOW_PARAMS_BINDING,
};
use umbra::csm::{fit_light_matrix, FitSettings, FrustumQuad};
use umbra::{CascadedShadowMap, CsmConfig, Light, LightBindings, LightId, LightKind, UniformProgram};

use crate::camera::Camera;
use crate::components::{Color, Emissive, GlobalTransform, MeshHandle, NoShadow, SceneLight, ShadowCaster};

const LIT_VERT: &str = include_str!("../../shaders/lit.vert");
const LIT_FRAG: &str = include_str!("../../shaders/lit.frag");
const DEPTH_VERT: &str = include_str!("../../shaders/depth.vert");
const DEPTH_FRAG: &str = include_str!("../../shaders/depth.frag");

const SKY_COLOR: Vec3 = Vec3::new(0.42, 0.55, 0.72);
const AMBIENT: Vec3 = Vec3::new(0.08, 0.09, 0.11);

const CASCADE_UNIT: u32 = 0;
const SPOT_UNIT: u32 = 1;
const TUBE_UNIT: u32 = 2;

/// Holds all loaded meshes. Entities reference meshes by MeshHandle index.
pub struct MeshStore {
    meshes: Vec<Mesh>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self { meshes: Vec::new() }
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshHandle {
        let handle = MeshHandle(self.meshes.len());
        self.meshes.push(mesh);
        handle
    }

    pub fn get(&self, handle: MeshHandle) -> &Mesh {
        &self.meshes[handle.0]
    }
}

/// World-space box the perspective shadows are fitted around.
#[derive(Debug, Clone, Copy)]
pub struct SceneBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl SceneBounds {
    /// Bottom and top faces, in the corner order the fitter expects.
    pub fn quads(&self) -> (FrustumQuad, FrustumQuad) {
        let face = |y: f32| {
            [
                Vec3::new(self.min.x, y, self.min.z),
                Vec3::new(self.min.x, y, self.max.z),
                Vec3::new(self.max.x, y, self.min.z),
                Vec3::new(self.max.x, y, self.max.z),
            ]
        };
        (face(self.min.y), face(self.max.y))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShadowSettings {
    pub csm: CsmConfig,
    pub perspective_size: u32,
    pub blocker_search_samples: u32,
    pub pcf_samples: u32,
    pub shadow_multiplier: f32,
    /// Field of view of tube light shadows, which have no cone to fit against.
    pub tube_fov: f32,
}

/// One perspective shadow map and the lit-pass uniform its matrix goes to.
struct PerspectiveShadow {
    target: ShadowTarget,
    unit: u32,
    matrix_uniform: &'static str,
    matrix: Mat4,
}

pub struct Renderer {
    lit: ShaderProgram,
    depth: ShaderProgram,
    bindings: LightBindings,
    uploaded_colors: HashMap<LightId, Vec3>,
    settings: ShadowSettings,
    csm: CascadedShadowMap,
    cascade_target: ShadowTarget,
    spot_shadow: PerspectiveShadow,
    tube_shadow: PerspectiveShadow,
    shadow_params: UniformBuffer,
    cascade_matrices: UniformBuffer,
    pub show_cascades: bool,
}

impl Renderer {
    pub fn init(settings: ShadowSettings) -> Result<Self, String> {
        unsafe {
            gl::Enable(gl::DEPTH_TEST);
            gl::ClearColor(SKY_COLOR.x, SKY_COLOR.y, SKY_COLOR.z, 1.0);
        }

        let mut lit = ShaderProgram::from_sources(LIT_VERT, LIT_FRAG)?;
        let depth = ShaderProgram::from_sources(DEPTH_VERT, DEPTH_FRAG)?;

        lit.bind();
        lit.bind_uniform_block("ShadowParams", SHADOW_PARAMS_BINDING);
        lit.bind_uniform_block("CascadeMatrices", CASCADE_MATRICES_BINDING);
        lit.set_int("u_cascade_maps", CASCADE_UNIT as i32);
        lit.set_int("u_spot_shadow_map", SPOT_UNIT as i32);
        lit.set_int("u_tube_shadow_map", TUBE_UNIT as i32);

        let csm = CascadedShadowMap::new(settings.csm);
        let cascade_target = ShadowTarget::cascades(
            settings.csm.shadow_map_width,
            settings.csm.shadow_map_height,
            csm.cascade_count() as u32,
        )?;
        let perspective = |unit: u32, matrix_uniform: &'static str| -> Result<PerspectiveShadow, String> {
            Ok(PerspectiveShadow {
                target: ShadowTarget::single(settings.perspective_size, settings.perspective_size)?,
                unit,
                matrix_uniform,
                matrix: Mat4::IDENTITY,
            })
        };
        let spot_shadow = perspective(SPOT_UNIT, "u_spot_space")?;
        let tube_shadow = perspective(TUBE_UNIT, "u_tube_space")?;

        let renderer = Self {
            lit,
            depth,
            bindings: LightBindings::new(),
            uploaded_colors: HashMap::new(),
            settings,
            csm,
            cascade_target,
            spot_shadow,
            tube_shadow,
            shadow_params: UniformBuffer::new(SHADOW_PARAMS_BINDING, std::mem::size_of::<ShadowParams>()),
            cascade_matrices: UniformBuffer::new(CASCADE_MATRICES_BINDING, std::mem::size_of::<CascadeMatrices>()),
            show_cascades: false,
        };
        renderer.upload_shadow_params();
        tracing::info!(
            cascades = renderer.csm.cascade_count(),
            splits = ?renderer.csm.splits(),
            "renderer ready"
        );
        Ok(renderer)
    }

    pub fn split_lambda(&self) -> f32 {
        self.csm.config().lambda
    }

    /// Moves the cascade boundaries between uniform (0) and logarithmic (1).
    pub fn set_split_lambda(&mut self, lambda: f32) {
        let config = CsmConfig {
            lambda: lambda.clamp(0.0, 1.0),
            ..*self.csm.config()
        };
        self.csm.set_config(config);
        self.settings.csm = config;
        self.upload_shadow_params();
        tracing::info!(lambda = config.lambda, splits = ?self.csm.splits(), "cascade splits changed");
    }

    fn upload_shadow_params(&self) {
        let config = self.csm.config();
        let params = ShadowParams::new(
            self.csm.splits(),
            config.shadow_map_width,
            config.shadow_map_height,
            self.settings.blocker_search_samples,
            self.settings.pcf_samples,
            self.settings.shadow_multiplier,
        );
        self.shadow_params.write(params.as_bytes());
    }

    pub fn draw_scene(&mut self, world: &World, meshes: &MeshStore, camera: &Camera, viewport: (u32, u32)) {
        let (width, height) = viewport;
        let aspect = width as f32 / height.max(1) as f32;
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(aspect);

        let lights: Vec<(Light, Option<ShadowCaster>)> = world
            .query::<(&SceneLight, Option<&ShadowCaster>)>()
            .iter()
            .map(|(_entity, (light, caster))| (light.0.clone(), caster.copied()))
            .collect();

        self.shadow_passes(world, meshes, &(projection * view), &lights);

        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            gl::Viewport(0, 0, width as i32, height as i32);
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }

        self.lit.bind();
        self.lit.set_mat4("u_view", &view);
        self.lit.set_mat4("u_projection", &projection);
        self.lit.set_vec3("u_ambient", AMBIENT);
        self.lit.set_int("u_show_cascades", self.show_cascades as i32);

        let normal_matrix = Mat3::from_mat4(view).inverse().transpose();
        for (light, _) in &lights {
            self.bind_light(light, &view, &normal_matrix);
        }

        self.cascade_target.bind_texture(CASCADE_UNIT);
        for shadow in [&self.spot_shadow, &self.tube_shadow] {
            shadow.target.bind_texture(shadow.unit);
            self.lit.set_mat4(shadow.matrix_uniform, &shadow.matrix);
        }

        for (_entity, (global_transform, mesh_handle, color, emissive)) in world
            .query::<(&GlobalTransform, &MeshHandle, &Color, Option<&Emissive>)>()
            .iter()
        {
            let model_view = view * global_transform.0;
            let normal = Mat3::from_mat4(model_view).inverse().transpose();
            self.lit.set_mat4("u_model", &global_transform.0);
            self.lit.set_uniform_by_name("u_normal_matrix", umbra::UniformValue::Mat3(normal));
            self.lit.set_vec3("u_object_color", color.0);
            self.lit.set_int("u_emissive", emissive.is_some() as i32);
            meshes.get(*mesh_handle).draw();
        }
    }

    /// Registers the light on first sight, then pushes its view-space
    /// position and direction through the cached locations.
    fn bind_light(&mut self, light: &Light, view: &Mat4, normal_matrix: &Mat3) {
        let program = self.lit.id();
        if !self.bindings.is_registered(program, light.id()) {
            if let Err(e) = self.bindings.register_light(&mut self.lit, light) {
                tracing::warn!(error = %e, "light skipped");
                return;
            }
            self.uploaded_colors.insert(light.id(), light.color);
            tracing::info!(light = light.name(), kind = ?light.kind(), "light registered");
        }

        if self.uploaded_colors.get(&light.id()) != Some(&light.color) {
            if self.bindings.update_colors(&mut self.lit, light).is_ok() {
                self.uploaded_colors.insert(light.id(), light.color);
            }
        }
        // Failures are already logged by the bindings.
        let _ = self.bindings.update_position(&mut self.lit, light, view);
        let _ = self.bindings.update_direction(&mut self.lit, light, normal_matrix);
    }

    fn shadow_passes(
        &mut self,
        world: &World,
        meshes: &MeshStore,
        view_proj: &Mat4,
        lights: &[(Light, Option<ShadowCaster>)],
    ) {
        unsafe {
            gl::Enable(gl::POLYGON_OFFSET_FILL);
            gl::PolygonOffset(2.0, 4.0);
        }
        self.depth.bind();

        let mut cascaded = false;
        for (light, caster) in lights {
            match caster {
                Some(ShadowCaster::Cascaded) if !cascaded => {
                    cascaded = true;
                    self.cascade_pass(world, meshes, view_proj, light);
                }
                Some(ShadowCaster::Cascaded) => {
                    tracing::debug!(light = light.name(), "only one cascaded light supported, skipped");
                }
                Some(ShadowCaster::Perspective) => self.perspective_pass(world, meshes, light),
                None => {}
            }
        }

        unsafe {
            gl::Disable(gl::POLYGON_OFFSET_FILL);
        }
    }

    fn cascade_pass(&mut self, world: &World, meshes: &MeshStore, view_proj: &Mat4, light: &Light) {
        self.csm.update(view_proj, light);
        let matrices = self.csm.matrices();
        self.cascade_matrices
            .write(CascadeMatrices::new(matrices).as_bytes());

        unsafe {
            // casters in front of a cascade's near plane still write depth
            gl::Enable(gl::DEPTH_CLAMP);
        }
        let layers = self.cascade_target.layers() as usize;
        for (layer, matrix) in matrices.iter().take(layers.min(MAX_CASCADES)).enumerate() {
            self.cascade_target.begin_layer(layer as u32);
            draw_casters(&mut self.depth, world, meshes, matrix);
        }
        unsafe {
            gl::Disable(gl::DEPTH_CLAMP);
        }
    }

    fn perspective_pass(&mut self, world: &World, meshes: &MeshStore, light: &Light) {
        let size = self.settings.perspective_size;
        let (shadow, settings) = match light.kind() {
            LightKind::Spot { .. } => (&mut self.spot_shadow, self.settings.csm.fit),
            LightKind::Tube { .. } => (
                &mut self.tube_shadow,
                FitSettings {
                    fixed_fov: Some(self.settings.tube_fov),
                    ..self.settings.csm.fit
                },
            ),
            kind => {
                tracing::debug!(light = light.name(), ?kind, "no perspective shadow slot for light");
                return;
            }
        };

        let bounds = world
            .query::<&SceneBounds>()
            .iter()
            .map(|(_entity, bounds)| *bounds)
            .next();
        let Some(bounds) = bounds else {
            tracing::debug!("scene has no bounds, perspective shadows skipped");
            return;
        };

        let (bottom, top) = bounds.quads();
        shadow.matrix = fit_light_matrix(&bottom, &top, light, size, size, &settings).matrix();
        shadow.target.begin_layer(0);
        draw_casters(&mut self.depth, world, meshes, &shadow.matrix);
    }
}

fn draw_casters(depth: &mut ShaderProgram, world: &World, meshes: &MeshStore, light_space: &Mat4) {
    depth.set_mat4("u_light_space", light_space);
    for (_entity, (global_transform, mesh_handle)) in world
        .query::<(&GlobalTransform, &MeshHandle)>()
        .without::<&NoShadow>()
        .iter()
    {
        depth.set_mat4("u_model", &global_transform.0);
        meshes.get(*mesh_handle).draw();
    }
}
