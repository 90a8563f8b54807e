use crate::render::RenderBackend;
use crate::stage::Stage;
use crate::viewport::Viewport;

/// Single-slot delayed task. Scheduling replaces whatever was pending.
#[derive(Debug, Clone, PartialEq)]
pub struct DebounceSlot<T> {
    pending: Option<(T, f64)>,
}

impl<T> Default for DebounceSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> DebounceSlot<T> {
    pub fn schedule(&mut self, value: T, due: f64) {
        self.pending = Some((value, due));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the value if its quiet window has elapsed.
    pub fn take_due(&mut self, now: f64) -> Option<T> {
        match self.pending {
            Some((_, due)) if now >= due => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Collapses bursts of viewport changes into a single update.
#[derive(Debug, Clone)]
pub struct ResizeCoordinator {
    slot: DebounceSlot<Viewport>,
    quiet_window: f64,
    applied: u64,
}

impl ResizeCoordinator {
    pub fn new(quiet_window: f64) -> Self {
        Self {
            slot: DebounceSlot::default(),
            quiet_window,
            applied: 0,
        }
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn on_resize(&mut self, width: u32, height: u32, now: f64) {
        self.slot
            .schedule(Viewport::new(width, height), now + self.quiet_window);
    }

    /// Apply the pending viewport if it is due. Returns what was applied.
    pub fn poll<B: RenderBackend + ?Sized>(
        &mut self,
        now: f64,
        stage: &mut Stage,
        backend: &mut B,
    ) -> Option<Viewport> {
        let viewport = self.slot.take_due(now)?;
        if apply_viewport(stage, backend, viewport) {
            self.applied += 1;
            Some(viewport)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.slot.cancel();
    }
}

/// Push a new viewport into the camera and the render surface.
/// Degenerate sizes are skipped and leave everything untouched.
pub fn apply_viewport<B: RenderBackend + ?Sized>(
    stage: &mut Stage,
    backend: &mut B,
    viewport: Viewport,
) -> bool {
    if viewport.width == 0 || viewport.height == 0 {
        log::debug!("Ignoring zero-sized viewport {}x{}", viewport.width, viewport.height);
        return false;
    }
    stage.viewport = viewport;
    stage.graph.camera.set_aspect(viewport.aspect());
    backend.resize(viewport.width, viewport.height);
    log::info!("Viewport resized to {}x{}", viewport.width, viewport.height);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::profile::RenderProfile;
    use crate::render::NullBackend;
    use crate::rng::SceneRng;
    use crate::scene::{build_scene, Headless};

    fn stage() -> Stage {
        let viewport = Viewport::new(1280, 720);
        let profile = RenderProfile::high();
        let mut rng = SceneRng::new(2);
        let built = build_scene(&profile, viewport, Some(Headless), "c", &mut rng).unwrap();
        Stage::new(built.graph, profile, viewport)
    }

    // ── debounce slot ──

    #[test]
    fn test_slot_replaces_pending() {
        let mut slot = DebounceSlot::default();
        slot.schedule(1, 0.25);
        slot.schedule(2, 0.30);
        assert_eq!(slot.take_due(0.26), None);
        assert_eq!(slot.take_due(0.30), Some(2));
        assert!(!slot.is_pending());
    }

    #[test]
    fn test_slot_cancel() {
        let mut slot = DebounceSlot::default();
        slot.schedule("x", 0.0);
        slot.cancel();
        assert_eq!(slot.take_due(1.0), None);
    }

    // ── coordinator ──

    #[test]
    fn test_burst_applies_once_with_last_size() {
        let clock = ManualClock::new(0.0);
        let mut s = stage();
        let mut backend = NullBackend::default();
        let mut resize = ResizeCoordinator::new(0.25);

        for i in 0..10u32 {
            resize.on_resize(800 + i * 10, 600 + i, clock.now());
            clock.advance(0.01);
            assert_eq!(resize.poll(clock.now(), &mut s, &mut backend), None);
        }

        clock.advance(0.3);
        let applied = resize.poll(clock.now(), &mut s, &mut backend);
        assert_eq!(applied, Some(Viewport::new(890, 609)));
        assert_eq!(resize.poll(clock.now() + 1.0, &mut s, &mut backend), None);
        assert_eq!(resize.applied(), 1);
        assert_eq!(backend.size, (890, 609));
        assert_eq!(s.viewport, Viewport::new(890, 609));
        assert!((s.graph.camera.aspect - 890.0 / 609.0).abs() < 1e-6);
    }

    #[test]
    fn test_nothing_applied_inside_quiet_window() {
        let mut s = stage();
        let mut backend = NullBackend::default();
        let mut resize = ResizeCoordinator::new(0.25);
        resize.on_resize(640, 480, 1.0);
        assert_eq!(resize.poll(1.2, &mut s, &mut backend), None);
        assert!(resize.is_pending());
        assert_eq!(resize.poll(1.25, &mut s, &mut backend), Some(Viewport::new(640, 480)));
    }

    #[test]
    fn test_zero_size_ignored() {
        let mut s = stage();
        let mut backend = NullBackend::default();
        let aspect = s.graph.camera.aspect;
        assert!(!apply_viewport(&mut s, &mut backend, Viewport::new(0, 720)));
        assert_eq!(s.graph.camera.aspect, aspect);
        assert_eq!(backend.size, (0, 0));
        assert_eq!(s.viewport, Viewport::new(1280, 720));
    }
}
