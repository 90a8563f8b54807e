//! Folio wgpu backend.
//!
//! Owns the surface, device, pipelines and every GPU buffer the background
//! scene needs. The web runtime hands it a [`FrameData`] per frame and calls
//! [`SceneRenderer::release`] on teardown.

mod backend;
mod error;

pub use backend::{RendererOptions, SceneRenderer};
pub use error::RenderError;
pub use folio_gpu_shared::gpu_types::FrameData;

/// Re-exported so callers can name surface targets without their own wgpu dependency.
pub use wgpu;
