//! std140 layouts of the shadow uniform blocks.
//!
//! GLSL side:
//!
//! ```glsl
//! layout (std140) uniform ShadowParams {
//!     float cascadePlaneDistances[MAX_CASCADES]; // 16-byte stride
//!     vec2 texelSize;
//!     int numBlockerSearchSamples;
//!     int numPCFSamples;
//!     float shadowMultiplier;
//!     int numCascades;
//! };
//!
//! layout (std140) uniform CascadeMatrices {
//!     mat4 lightSpaceMatrices[MAX_CASCADES];
//! };
//! ```

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

/// Upper bound on cascades the shader blocks are declared with.
pub const MAX_CASCADES: usize = 8;

/// Binding point of the [`ShadowParams`] block.
pub const SHADOW_PARAMS_BINDING: u32 = 0;
/// Binding point of the cascade matrix block.
pub const CASCADE_MATRICES_BINDING: u32 = 1;

/// A float padded to a std140 array element.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PaddedFloat {
    pub value: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowParams {
    pub cascade_plane_distances: [PaddedFloat; MAX_CASCADES],
    pub texel_size: [f32; 2],
    pub blocker_search_samples: i32,
    pub pcf_samples: i32,
    pub shadow_multiplier: f32,
    pub cascade_count: i32,
    pub _pad: [f32; 2],
}

impl ShadowParams {
    /// `splits` beyond [`MAX_CASCADES`] are dropped with a warning.
    pub fn new(
        splits: &[f32],
        shadow_map_width: u32,
        shadow_map_height: u32,
        blocker_search_samples: u32,
        pcf_samples: u32,
        shadow_multiplier: f32,
    ) -> Self {
        if splits.len() > MAX_CASCADES {
            tracing::warn!(
                cascades = splits.len(),
                max = MAX_CASCADES,
                "more cascades than the shadow block holds, extra cascades ignored"
            );
        }

        let mut distances = [PaddedFloat::default(); MAX_CASCADES];
        for (slot, &split) in distances.iter_mut().zip(splits) {
            slot.value = split;
        }
        let texel = Vec2::ONE / Vec2::new(shadow_map_width.max(1) as f32, shadow_map_height.max(1) as f32);

        Self {
            cascade_plane_distances: distances,
            texel_size: texel.to_array(),
            blocker_search_samples: blocker_search_samples as i32,
            pcf_samples: pcf_samples as i32,
            shadow_multiplier,
            cascade_count: splits.len().min(MAX_CASCADES) as i32,
            _pad: [0.0; 2],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// The cascade matrix block; unused slots are identity.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CascadeMatrices {
    pub matrices: [Mat4; MAX_CASCADES],
}

impl CascadeMatrices {
    pub fn new(matrices: &[Mat4]) -> Self {
        let mut block = Self {
            matrices: [Mat4::IDENTITY; MAX_CASCADES],
        };
        for (slot, matrix) in block.matrices.iter_mut().zip(matrices) {
            *slot = *matrix;
        }
        block
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
