//! Cascaded shadow maps and light uniform binding for OpenGL renderers.

pub mod binding;
pub mod csm;
pub mod light;

pub use binding::{BindingError, LightBindings, ProgramId, UniformLocation, UniformProgram, UniformValue};
pub use csm::{CascadedShadowMap, CsmConfig, LightSpace};
pub use light::{Falloff, Light, LightId, LightKind, PhongTerms};
