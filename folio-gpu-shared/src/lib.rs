//! GPU-facing types shared by the Folio web runtime and its wgpu backend.
//!
//! Nothing in here touches a device: it is plain data (uniform, instance and
//! vertex layouts), procedural geometry, and the WGSL sources that consume them.

pub mod geometry;
pub mod gpu_types;
pub mod math;
pub mod shaders;
