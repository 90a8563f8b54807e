use crate::viewport::Viewport;

/// Last pointer position, as an offset from the viewport centre in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    /// Record a pointer event given in client coordinates.
    pub fn set_from_client(&mut self, client_x: f64, client_y: f64, viewport: Viewport) {
        let (half_w, half_h) = viewport.half_extent();
        self.x = client_x as f32 - half_w;
        self.y = client_y as f32 - half_h;
    }
}
