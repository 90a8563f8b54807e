use glam::{Vec2, Vec3};

use crate::stage::Stage;

/// Reference refresh rate the per-frame motion constants were tuned at.
pub const REFERENCE_FPS: f32 = 60.0;

pub const ICON_FLOAT_AMPLITUDE: f32 = 0.3;
/// Idle yaw of the decoration group, radians per second.
pub const DECORATION_SPIN_RATE: f32 = 0.001 * REFERENCE_FPS;
/// Idle yaw of the icon group, radians per second.
pub const ICON_GROUP_SPIN_RATE: f32 = 0.002 * REFERENCE_FPS;

pub const CAMERA_PARALLAX_GAIN: f32 = 0.005;
pub const PARTICLE_PARALLAX_GAIN: f32 = 0.0001;
/// Fraction of the remaining parallax distance covered per reference frame.
pub const PARALLAX_EASE: f32 = 0.05;

/// Advance every animated property by one frame.
///
/// `elapsed` is seconds since the loop started, `dt` the frame delta and
/// `now` the clock reading tweens are sampled at.
pub fn update_frame(stage: &mut Stage, elapsed: f64, dt: f32, now: f64) {
    let graph = &mut stage.graph;

    for icon in &mut graph.icons.icons {
        icon.transform.rotation += icon.spin * dt;
        icon.transform.position.y = icon.base_position.y
            + ICON_FLOAT_AMPLITUDE * (elapsed as f32 + icon.float_phase).sin();
    }
    graph.icons.transform.rotation.y += ICON_GROUP_SPIN_RATE * dt;

    let (camera_pose, grid_offset) = stage.motion.advance(now);

    graph.decoration.spin_yaw += DECORATION_SPIN_RATE * dt;
    graph.decoration.transform.rotation.y = graph.decoration.spin_yaw + grid_offset;

    if stage.profile.pointer_parallax {
        let pointer = stage.pointer;
        graph.particles.transform.rotation.y = -pointer.x * PARTICLE_PARALLAX_GAIN;

        let target = Vec2::new(pointer.x, -pointer.y) * CAMERA_PARALLAX_GAIN;
        let ease = parallax_ease(dt);
        graph.camera.parallax += (target - graph.camera.parallax) * ease;
    }

    graph.camera.position = camera_pose;
    graph.camera.look_at(Vec3::ZERO);
}

/// Frame-rate independent form of the per-frame ease factor.
fn parallax_ease(dt: f32) -> f32 {
    1.0 - (1.0 - PARALLAX_EASE).powf(dt * REFERENCE_FPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::RenderProfile;
    use crate::rng::SceneRng;
    use crate::scene::{build_scene, Headless};
    use crate::viewport::Viewport;

    const FRAME: f32 = 1.0 / 60.0;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn stage(profile: RenderProfile) -> Stage {
        let viewport = Viewport::new(1280, 720);
        let mut rng = SceneRng::new(9);
        let built = build_scene(&profile, viewport, Some(Headless), "c", &mut rng).unwrap();
        Stage::new(built.graph, profile, viewport)
    }

    fn run(stage: &mut Stage, frames: usize) {
        for i in 1..=frames {
            let t = i as f64 * FRAME as f64;
            update_frame(stage, t, FRAME, t);
        }
    }

    // ── rotation ──

    #[test]
    fn test_one_reference_frame_matches_per_frame_rates() {
        let mut s = stage(RenderProfile::high());
        update_frame(&mut s, 0.0, FRAME, 0.0);

        let icons = &s.graph.icons.icons;
        assert!(approx_eq(icons[0].transform.rotation.x, 0.01));
        assert!(approx_eq(icons[0].transform.rotation.y, 0.01));
        assert!(approx_eq(icons[1].transform.rotation.y, -0.01));
        assert!(approx_eq(icons[2].transform.rotation.x, -0.005));
        assert!(approx_eq(icons[2].transform.rotation.y, -0.005));
        assert!(approx_eq(s.graph.decoration.spin_yaw, 0.001));
        assert!(approx_eq(s.graph.icons.transform.rotation.y, 0.002));
    }

    #[test]
    fn test_rates_independent_of_refresh_rate() {
        let mut a = stage(RenderProfile::high());
        let mut b = stage(RenderProfile::high());
        for i in 1..=60 {
            update_frame(&mut a, i as f64 / 60.0, 1.0 / 60.0, 0.0);
        }
        for i in 1..=120 {
            update_frame(&mut b, i as f64 / 120.0, 1.0 / 120.0, 0.0);
        }
        assert!(approx_eq(a.graph.decoration.spin_yaw, b.graph.decoration.spin_yaw));
        assert!(approx_eq(
            a.graph.icons.icons[2].transform.rotation.x,
            b.graph.icons.icons[2].transform.rotation.x
        ));
    }

    #[test]
    fn test_icons_bob_around_base() {
        let mut s = stage(RenderProfile::low());
        update_frame(&mut s, 1.0, FRAME, 1.0);
        for icon in &s.graph.icons.icons {
            let expected = icon.base_position.y + 0.3 * (1.0 + icon.float_phase).sin();
            assert!(approx_eq(icon.transform.position.y, expected));
            assert_eq!(icon.transform.position.x, icon.base_position.x);
        }
    }

    #[test]
    fn test_topology_unchanged_by_frames() {
        let mut s = stage(RenderProfile::high());
        let bars = s.graph.decoration.bars().to_vec();
        let particles = s.graph.particles.positions().to_vec();
        run(&mut s, 240);
        assert_eq!(s.graph.decoration.bars(), bars.as_slice());
        assert_eq!(s.graph.particles.positions(), particles.as_slice());
    }

    // ── parallax ──

    #[test]
    fn test_parallax_follows_pointer_on_capable_devices() {
        let mut s = stage(RenderProfile::high());
        s.pointer.x = 200.0;
        s.pointer.y = 100.0;
        run(&mut s, 600);

        assert!(approx_eq(s.graph.camera.parallax.x, 1.0));
        assert!(approx_eq(s.graph.camera.parallax.y, -0.5));
        assert!(approx_eq(s.graph.particles.transform.rotation.y, -0.02));
        let eye = s.graph.camera.eye();
        assert!((eye - Vec3::new(1.0, -0.5, 5.0)).length() < 1e-3);
    }

    #[test]
    fn test_parallax_first_step_uses_ease_factor() {
        let mut s = stage(RenderProfile::high());
        s.pointer.x = 100.0;
        update_frame(&mut s, 0.0, FRAME, 0.0);
        assert!(approx_eq(s.graph.camera.parallax.x, 0.5 * 0.05));
    }

    #[test]
    fn test_low_profile_ignores_pointer() {
        let mut s = stage(RenderProfile::low());
        s.pointer.x = 300.0;
        s.pointer.y = -300.0;
        run(&mut s, 60);
        assert_eq!(s.graph.camera.parallax, Vec2::ZERO);
        assert_eq!(s.graph.particles.transform.rotation.y, 0.0);
    }

    // ── navigation composition ──

    #[test]
    fn test_grid_yaw_is_spin_plus_navigation_offset() {
        let mut s = stage(RenderProfile::high());
        s.motion.grid_yaw.retarget(std::f32::consts::PI, 0.0, 1.5);
        run(&mut s, 120);
        let d = &s.graph.decoration;
        assert!(approx_eq(d.transform.rotation.y, d.spin_yaw + std::f32::consts::PI));
    }

    #[test]
    fn test_camera_follows_pose_tween() {
        let mut s = stage(RenderProfile::low());
        s.motion.camera.retarget(Vec3::new(4.0, 0.0, 4.0), 0.0, 1.5);
        run(&mut s, 120);
        assert_eq!(s.graph.camera.position, Vec3::new(4.0, 0.0, 4.0));
    }
}
