use glam::{Mat4, Vec3};

/// Upper bound for the device pixel ratio used when sizing render targets.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Right-handed perspective projection with a [0, 1] depth range (wgpu clip space).
pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far)
}

/// View matrix for an eye looking at `target` with +Y up.
///
/// Falls back to a -Z up vector when the eye sits directly above or below the
/// target, where +Y would be parallel to the view direction.
pub fn look_at(eye: Vec3, target: Vec3) -> Mat4 {
    let dir = (target - eye).normalize_or_zero();
    let up = if dir.cross(Vec3::Y).length_squared() < 1e-8 {
        Vec3::NEG_Z
    } else {
        Vec3::Y
    };
    Mat4::look_at_rh(eye, target, up)
}

/// Clamp a reported device pixel ratio into `(0, MAX_PIXEL_RATIO]`.
/// Non-finite or non-positive ratios are treated as 1.
pub fn clamp_pixel_ratio(ratio: f64) -> f64 {
    if !ratio.is_finite() || ratio <= 0.0 {
        return 1.0;
    }
    ratio.min(MAX_PIXEL_RATIO)
}

/// Physical surface size for a CSS viewport at the given pixel ratio.
/// Never returns a zero dimension.
pub fn physical_size(css_width: u32, css_height: u32, pixel_ratio: f64) -> (u32, u32) {
    let w = (css_width as f64 * pixel_ratio).round().max(1.0) as u32;
    let h = (css_height as f64 * pixel_ratio).round().max(1.0) as u32;
    (w, h)
}

/// Decode a `0xRRGGBB` colour into linear-space RGB.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b)]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
