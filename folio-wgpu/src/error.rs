use std::fmt;

/// Failures raised while creating or driving the GPU backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The canvas could not be turned into a wgpu surface.
    Surface(String),
    /// No adapter compatible with the surface was found.
    NoAdapter,
    /// The adapter refused to create a device.
    Device(String),
    /// Acquiring the next frame failed in a way that reconfiguring cannot fix.
    Frame(String),
    /// The renderer was used after `release`.
    Released,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(e) => write!(f, "failed to create surface: {e}"),
            Self::NoAdapter => write!(f, "failed to find a suitable GPU adapter"),
            Self::Device(e) => write!(f, "failed to create device: {e}"),
            Self::Frame(e) => write!(f, "surface texture error: {e}"),
            Self::Released => write!(f, "renderer already released"),
        }
    }
}

impl std::error::Error for RenderError {}
