/// Embedded WGSL sources for the scene pipelines.
/// Both pipelines bind `SceneUniforms` at group 0, binding 0.

pub const MESH_WGSL: &str = include_str!("../shaders/mesh.wgsl");
pub const PARTICLES_WGSL: &str = include_str!("../shaders/particles.wgsl");
