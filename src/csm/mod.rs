//! Cascaded shadow maps.
//!
//! Per frame: [`compute_splits`] places the cascade boundaries along the view
//! axis, [`world_corners`] turns the camera's view-projection into the
//! world-space quads at those boundaries, and [`fit_light_matrix`] fits one
//! light-space transform around each pair of consecutive quads.
//! [`CascadedShadowMap`] strings the three together and keeps the results.

mod fit;
mod frustum;
mod splits;
pub mod uniforms;

pub use fit::{bounding_diagonal, fit_light_matrix, FitSettings, LightSpace, MIN_DEPTH_PAD};
pub use frustum::{cascade_corners, world_corners, FrustumQuad};
pub use splits::{cascade_for_depth, compute_splits, compute_splits_with_lambda, DEFAULT_SPLIT_LAMBDA};

use glam::Mat4;

use crate::light::Light;

/// Camera range, cascade layout and shadow map size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsmConfig {
    pub near: f32,
    pub far: f32,
    pub cascade_count: usize,
    pub lambda: f32,
    pub shadow_map_width: u32,
    pub shadow_map_height: u32,
    pub fit: FitSettings,
}

impl Default for CsmConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 100.0,
            cascade_count: 5,
            lambda: DEFAULT_SPLIT_LAMBDA,
            shadow_map_width: 1024,
            shadow_map_height: 1024,
            fit: FitSettings::default(),
        }
    }
}

impl CsmConfig {
    pub fn splits(&self) -> Vec<f32> {
        compute_splits_with_lambda(self.near, self.far, self.cascade_count, self.lambda)
    }
}

/// One fitted light-space transform per cascade for `light`, seen through `view_proj`.
pub fn fit_cascades(view_proj: &Mat4, splits: &[f32], config: &CsmConfig, light: &Light) -> Vec<LightSpace> {
    let quads = world_corners(view_proj, splits, config.near, config.far);
    quads
        .windows(2)
        .map(|pair| {
            fit_light_matrix(
                &pair[0],
                &pair[1],
                light,
                config.shadow_map_width,
                config.shadow_map_height,
                &config.fit,
            )
        })
        .collect()
}

/// Fills `light_matrices` with one light-space matrix per cascade.
///
/// The vector is cleared first, so it can be reused frame after frame.
pub fn fit_to_frustum(view_proj: &Mat4, config: &CsmConfig, light: &Light, light_matrices: &mut Vec<Mat4>) {
    let splits = config.splits();
    light_matrices.clear();
    light_matrices.extend(
        fit_cascades(view_proj, &splits, config, light)
            .iter()
            .map(LightSpace::matrix),
    );
}

/// Cascade state for one shadow-casting light.
///
/// Split distances are only recomputed when the config changes.
pub struct CascadedShadowMap {
    config: CsmConfig,
    splits: Vec<f32>,
    cascades: Vec<LightSpace>,
    matrices: Vec<Mat4>,
}

impl CascadedShadowMap {
    pub fn new(config: CsmConfig) -> Self {
        let splits = config.splits();
        tracing::debug!(?splits, "cascade splits");
        let count = splits.len();
        Self {
            config,
            splits,
            cascades: vec![LightSpace::default(); count],
            matrices: vec![Mat4::IDENTITY; count],
        }
    }

    pub fn config(&self) -> &CsmConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: CsmConfig) {
        let resplit = config.near != self.config.near
            || config.far != self.config.far
            || config.cascade_count != self.config.cascade_count
            || config.lambda != self.config.lambda;
        self.config = config;
        if resplit {
            self.splits = config.splits();
            tracing::debug!(splits = ?self.splits, "cascade splits recomputed");
        }
        // Fits stay stale until the next update, but the counts always agree.
        let count = self.splits.len();
        self.cascades.resize(count, LightSpace::default());
        self.matrices.resize(count, Mat4::IDENTITY);
    }

    /// Far distance of each cascade.
    pub fn splits(&self) -> &[f32] {
        &self.splits
    }

    pub fn cascade_count(&self) -> usize {
        self.splits.len()
    }

    /// Refits every cascade for the current camera and light.
    pub fn update(&mut self, view_proj: &Mat4, light: &Light) {
        if !light.is_directional() {
            tracing::debug!(light = light.name(), "cascading a non-directional light, perspective fits used");
        }
        self.cascades = fit_cascades(view_proj, &self.splits, &self.config, light);
        self.matrices.clear();
        self.matrices.extend(self.cascades.iter().map(LightSpace::matrix));
    }

    pub fn cascades(&self) -> &[LightSpace] {
        &self.cascades
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn cascade_for_depth(&self, depth: f32) -> usize {
        cascade_for_depth(&self.splits, depth)
    }
}
