mod lights;
mod transform;

pub use lights::{sun_orbit_system, toggle_sun_orbit};
pub use transform::transform_propagation_system;
