use crate::animation::update_frame;
use crate::render::RenderBackend;
use crate::scene::FrameScratch;
use crate::stage::Stage;

/// Delta used for the very first frame, when there is no previous timestamp.
pub const FIRST_FRAME_DT: f64 = 1.0 / 60.0;
/// Larger gaps (background tabs, debugger pauses) are clamped to this.
pub const MAX_FRAME_DT: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Per-frame driver: timing, update, render.
///
/// A render failure stops the loop for good; it is logged and never retried.
#[derive(Default)]
pub struct FrameLoop {
    start: Option<f64>,
    last: Option<f64>,
    frames: u64,
    stopped: bool,
    scratch: FrameScratch,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Run one frame at clock reading `now` (seconds).
    pub fn tick<B: RenderBackend + ?Sized>(
        &mut self,
        stage: &mut Stage,
        backend: &mut B,
        now: f64,
    ) -> LoopControl {
        if self.stopped {
            return LoopControl::Stop;
        }

        let start = *self.start.get_or_insert(now);
        let dt = match self.last {
            Some(last) => (now - last).clamp(0.0, MAX_FRAME_DT),
            None => FIRST_FRAME_DT,
        };
        self.last = Some(now);

        update_frame(stage, now - start, dt as f32, now);

        let frame = stage.graph.frame_data(&mut self.scratch);
        if let Err(e) = backend.render(&frame) {
            log::error!("Frame {} failed, stopping animation: {e}", self.frames);
            self.stopped = true;
            return LoopControl::Stop;
        }

        self.frames += 1;
        LoopControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::profile::RenderProfile;
    use crate::render::NullBackend;
    use crate::rng::SceneRng;
    use crate::scene::{build_scene, Headless};
    use crate::viewport::Viewport;
    use folio_gpu_shared::gpu_types::FrameData;

    fn stage() -> Stage {
        let viewport = Viewport::new(1024, 768);
        let profile = RenderProfile::high();
        let mut rng = SceneRng::new(4);
        let built = build_scene(&profile, viewport, Some(Headless), "c", &mut rng).unwrap();
        Stage::new(built.graph, profile, viewport)
    }

    /// Fails on the given frame index.
    struct FailingBackend {
        fail_at: u64,
        rendered: u64,
    }

    impl RenderBackend for FailingBackend {
        fn resize(&mut self, _w: u32, _h: u32) {}

        fn render(&mut self, _frame: &FrameData<'_>) -> Result<(), SceneError> {
            if self.rendered == self.fail_at {
                return Err(SceneError::Render("device lost".into()));
            }
            self.rendered += 1;
            Ok(())
        }

        fn release(&mut self) {}
    }

    #[test]
    fn test_renders_every_tick() {
        let mut s = stage();
        let mut backend = NullBackend::default();
        let mut frame_loop = FrameLoop::new();
        for i in 0..10 {
            assert_eq!(
                frame_loop.tick(&mut s, &mut backend, i as f64 / 60.0),
                LoopControl::Continue
            );
        }
        assert_eq!(backend.frames, 10);
        assert_eq!(frame_loop.frames(), 10);
    }

    #[test]
    fn test_first_frame_uses_nominal_delta() {
        let mut s = stage();
        let mut frame_loop = FrameLoop::new();
        frame_loop.tick(&mut s, &mut NullBackend::default(), 100.0);
        assert!((s.graph.decoration.spin_yaw - 0.001).abs() < 1e-6);
    }

    #[test]
    fn test_long_gap_is_clamped() {
        let mut s = stage();
        let mut backend = NullBackend::default();
        let mut frame_loop = FrameLoop::new();
        frame_loop.tick(&mut s, &mut backend, 0.0);
        let before = s.graph.decoration.spin_yaw;
        frame_loop.tick(&mut s, &mut backend, 30.0);
        let step = s.graph.decoration.spin_yaw - before;
        assert!((step - 0.06 * 0.1).abs() < 1e-6, "{step}");
    }

    #[test]
    fn test_render_failure_stops_loop() {
        let mut s = stage();
        let mut backend = FailingBackend { fail_at: 3, rendered: 0 };
        let mut frame_loop = FrameLoop::new();
        let results: Vec<LoopControl> = (0..6)
            .map(|i| frame_loop.tick(&mut s, &mut backend, i as f64 * 0.016))
            .collect();
        assert_eq!(&results[..3], &[LoopControl::Continue; 3]);
        assert!(results[3..].iter().all(|r| *r == LoopControl::Stop));
        assert!(frame_loop.is_stopped());
        assert_eq!(backend.rendered, 3);
        assert_eq!(frame_loop.frames(), 3);
    }

    #[test]
    fn test_stopped_loop_does_not_touch_stage() {
        let mut s = stage();
        let mut frame_loop = FrameLoop::new();
        frame_loop.stop();
        let yaw = s.graph.decoration.spin_yaw;
        assert_eq!(frame_loop.tick(&mut s, &mut NullBackend::default(), 1.0), LoopControl::Stop);
        assert_eq!(s.graph.decoration.spin_yaw, yaw);
    }
}
