use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::geometry::MeshKind;

/// Number of point lights the mesh shader evaluates.
pub const MAX_POINT_LIGHTS: usize = 2;

/// One point light as laid out in the scene uniform block.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightRaw {
    /// xyz = world position, w = falloff range (0 = infinite).
    pub position_range: [f32; 4],
    /// rgb = linear colour, a = intensity.
    pub color_intensity: [f32; 4],
}

/// Per-frame uniforms shared by every pipeline (bind group 0, binding 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera world position.
    pub camera_position: [f32; 4],
    /// rgb = ambient colour pre-multiplied by intensity.
    pub ambient: [f32; 4],
    pub point_lights: [PointLightRaw; MAX_POINT_LIGHTS],
    /// rgb = fog colour, a = exp2 density.
    pub fog: [f32; 4],
}

impl SceneUniforms {
    pub fn new(view_proj: Mat4, camera_position: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_position: camera_position.extend(1.0).to_array(),
            ambient: [0.0; 4],
            point_lights: [PointLightRaw::default(); MAX_POINT_LIGHTS],
            fog: [0.0; 4],
        }
    }
}

/// Surface parameters for a lit mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    pub color: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub metalness: f32,
    pub roughness: f32,
}

/// Per-instance vertex data for the instanced mesh pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// rgb = emissive colour pre-multiplied by intensity.
    pub emissive: [f32; 4],
    /// x = metalness, y = roughness.
    pub surface: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, material: &MaterialParams) -> Self {
        let e = material.emissive_intensity;
        Self {
            model: model.to_cols_array_2d(),
            color: [material.color[0], material.color[1], material.color[2], 1.0],
            emissive: [
                material.emissive[0] * e,
                material.emissive[1] * e,
                material.emissive[2] * e,
                0.0,
            ],
            surface: [material.metalness, material.roughness, 0.0, 0.0],
        }
    }
}

/// Billboard vertex for the particle pipeline: position, uv, rgba (9 floats).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// Vertices emitted per particle (two triangles).
pub const VERTICES_PER_PARTICLE: usize = 6;

/// All instances of one mesh kind drawn in a single call.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBatch {
    pub kind: MeshKind,
    pub instances: Vec<InstanceRaw>,
}

/// Everything the backend needs to draw one frame.
pub struct FrameData<'a> {
    pub uniforms: SceneUniforms,
    pub batches: &'a [MeshBatch],
    pub particles: &'a [ParticleVertex],
}
