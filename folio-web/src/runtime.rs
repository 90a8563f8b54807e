use crate::frame_loop::{FrameLoop, LoopControl};
use crate::lifecycle::Lifecycle;
use crate::render::RenderBackend;
use crate::resize::ResizeCoordinator;
use crate::stage::SceneHandle;

/// The running scene: frame loop, resize handling and owned resources.
pub struct SceneRuntime<B> {
    stage: SceneHandle,
    frame_loop: FrameLoop,
    resize: ResizeCoordinator,
    lifecycle: Lifecycle<B>,
}

impl<B: RenderBackend> SceneRuntime<B> {
    pub fn new(stage: SceneHandle, backend: B, resize_quiet_window: f64) -> Self {
        Self {
            stage,
            frame_loop: FrameLoop::new(),
            resize: ResizeCoordinator::new(resize_quiet_window),
            lifecycle: Lifecycle::with_backend(backend),
        }
    }

    pub fn stage(&self) -> &SceneHandle {
        &self.stage
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    pub fn lifecycle_mut(&mut self) -> &mut Lifecycle<B> {
        &mut self.lifecycle
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.lifecycle.backend_mut()
    }

    pub fn on_resize(&mut self, width: u32, height: u32, now: f64) {
        self.resize.on_resize(width, height, now);
    }

    pub fn on_pointer_move(&mut self, client_x: f64, client_y: f64) {
        self.stage.with_mut(|stage| {
            let viewport = stage.viewport;
            stage.pointer.set_from_client(client_x, client_y, viewport);
        });
    }

    /// Apply a due resize, if any. Called when the debounce timer fires.
    pub fn flush_resize(&mut self, now: f64) {
        let Some(backend) = self.lifecycle.backend_mut() else {
            return;
        };
        let resize = &mut self.resize;
        self.stage
            .with_mut(|stage| resize.poll(now, stage, backend));
    }

    /// One animation frame. `Stop` means no further frame should be requested.
    pub fn frame(&mut self, now: f64) -> LoopControl {
        let Some(backend) = self.lifecycle.backend_mut() else {
            return LoopControl::Stop;
        };
        let frame_loop = &mut self.frame_loop;
        let resize = &mut self.resize;
        self.stage.with_mut(|stage| {
            resize.poll(now, stage, backend);
            frame_loop.tick(stage, backend, now)
        })
    }

    pub fn teardown(&mut self) -> bool {
        self.frame_loop.stop();
        self.resize.cancel();
        self.lifecycle.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::RenderProfile;
    use crate::render::NullBackend;
    use crate::rng::SceneRng;
    use crate::scene::{build_scene, Headless};
    use crate::stage::Stage;
    use crate::viewport::Viewport;

    fn runtime() -> SceneRuntime<NullBackend> {
        let viewport = Viewport::new(1280, 720);
        let profile = RenderProfile::high();
        let mut rng = SceneRng::new(3);
        let built = build_scene(&profile, viewport, Some(Headless), "c", &mut rng).unwrap();
        let stage = SceneHandle::new(Stage::new(built.graph, profile, viewport));
        let mut backend = NullBackend::default();
        backend.resize(viewport.width, viewport.height);
        SceneRuntime::new(stage, backend, 0.25)
    }

    #[test]
    fn test_frames_render_until_teardown() {
        let mut rt = runtime();
        assert_eq!(rt.frame(0.0), LoopControl::Continue);
        assert_eq!(rt.frame(0.016), LoopControl::Continue);
        assert_eq!(rt.backend_mut().map(|b| b.frames), Some(2));

        assert!(rt.teardown());
        assert!(!rt.teardown());
        assert_eq!(rt.frame(0.032), LoopControl::Stop);
        assert!(rt.frame_loop().is_stopped());
    }

    #[test]
    fn test_pending_resize_applied_by_frame_after_window() {
        let mut rt = runtime();
        rt.on_resize(640, 480, 0.0);
        rt.frame(0.1);
        assert_eq!(rt.backend_mut().map(|b| b.size), Some((1280, 720)));
        rt.frame(0.3);
        assert_eq!(rt.backend_mut().map(|b| b.size), Some((640, 480)));
        assert_eq!(rt.stage().with(|s| s.viewport), Viewport::new(640, 480));
    }

    #[test]
    fn test_flush_resize_applies_due_viewport() {
        let mut rt = runtime();
        rt.on_resize(800, 600, 1.0);
        rt.flush_resize(1.1);
        assert_eq!(rt.backend_mut().map(|b| b.size), Some((1280, 720)));
        rt.flush_resize(1.25);
        assert_eq!(rt.backend_mut().map(|b| b.size), Some((800, 600)));
    }

    #[test]
    fn test_teardown_drops_pending_resize() {
        let mut rt = runtime();
        rt.on_resize(800, 600, 0.0);
        rt.teardown();
        rt.flush_resize(10.0);
        assert!(rt.backend_mut().is_none());
    }

    #[test]
    fn test_pointer_recorded_relative_to_viewport() {
        let mut rt = runtime();
        rt.on_pointer_move(1280.0, 0.0);
        let pointer = rt.stage().with(|s| s.pointer);
        assert_eq!((pointer.x, pointer.y), (640.0, -360.0));
    }
}
