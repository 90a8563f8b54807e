use folio_gpu_shared::gpu_types::FrameData;

use crate::error::SceneError;

/// What the runtime needs from a renderer.
pub trait RenderBackend {
    /// Resize the drawing surface to a CSS-pixel viewport. Zero sizes are ignored.
    fn resize(&mut self, css_width: u32, css_height: u32);

    fn render(&mut self, frame: &FrameData<'_>) -> Result<(), SceneError>;

    /// Free every GPU resource. Safe to call more than once.
    fn release(&mut self);
}

/// Backend that draws nothing. Used for headless runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NullBackend {
    pub frames: u64,
    pub size: (u32, u32),
    pub released: bool,
}

impl RenderBackend for NullBackend {
    fn resize(&mut self, css_width: u32, css_height: u32) {
        if css_width == 0 || css_height == 0 {
            return;
        }
        self.size = (css_width, css_height);
    }

    fn render(&mut self, _frame: &FrameData<'_>) -> Result<(), SceneError> {
        if self.released {
            return Err(SceneError::Render("backend released".into()));
        }
        self.frames += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}
