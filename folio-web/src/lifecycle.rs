use crate::render::RenderBackend;

type Cleanup = Box<dyn FnOnce()>;

/// Owns the renderer and every page hook the scene installed, and gives
/// them all back exactly once.
pub struct Lifecycle<B> {
    backend: Option<B>,
    cleanups: Vec<Cleanup>,
    torn_down: bool,
}

impl<B: RenderBackend> Default for Lifecycle<B> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<B: RenderBackend> Lifecycle<B> {
    /// Nothing to release, as when construction never got as far as a renderer.
    pub fn empty() -> Self {
        Self {
            backend: None,
            cleanups: Vec::new(),
            torn_down: false,
        }
    }

    pub fn with_backend(backend: B) -> Self {
        Self {
            backend: Some(backend),
            ..Self::empty()
        }
    }

    /// Register something to undo at teardown (listener removal, timers).
    /// Registered after teardown, it runs immediately.
    pub fn on_teardown(&mut self, cleanup: impl FnOnce() + 'static) {
        if self.torn_down {
            cleanup();
        } else {
            self.cleanups.push(Box::new(cleanup));
        }
    }

    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Release everything. Returns false if this already happened.
    pub fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;

        let hooks = self.cleanups.len();
        for cleanup in self.cleanups.drain(..).rev() {
            cleanup();
        }
        let had_backend = match self.backend.take() {
            Some(mut backend) => {
                backend.release();
                true
            }
            None => false,
        };

        log::info!("Scene torn down ({hooks} page hooks, renderer released: {had_backend})");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use folio_gpu_shared::gpu_types::FrameData;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedBackend(Rc<RefCell<u32>>);

    impl RenderBackend for SharedBackend {
        fn resize(&mut self, _w: u32, _h: u32) {}

        fn render(&mut self, _frame: &FrameData<'_>) -> Result<(), SceneError> {
            Ok(())
        }

        fn release(&mut self) {
            *self.0.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let backend = SharedBackend::default();
        let releases = backend.0.clone();
        let mut lifecycle = Lifecycle::with_backend(backend);

        assert!(lifecycle.teardown());
        assert!(!lifecycle.teardown());
        assert_eq!(*releases.borrow(), 1);
        assert!(lifecycle.backend_mut().is_none());
    }

    #[test]
    fn test_teardown_without_backend() {
        let mut lifecycle = Lifecycle::<SharedBackend>::empty();
        assert!(lifecycle.teardown());
        assert!(lifecycle.is_torn_down());
    }

    #[test]
    fn test_cleanups_run_once_in_reverse_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut lifecycle = Lifecycle::<SharedBackend>::empty();
        for name in ["resize", "pointer", "popstate"] {
            let log = log.clone();
            lifecycle.on_teardown(move || log.borrow_mut().push(name));
        }
        lifecycle.teardown();
        lifecycle.teardown();
        assert_eq!(*log.borrow(), vec!["popstate", "pointer", "resize"]);
    }

    #[test]
    fn test_late_cleanup_runs_immediately() {
        let ran = Rc::new(RefCell::new(false));
        let mut lifecycle = Lifecycle::<SharedBackend>::empty();
        lifecycle.teardown();
        let flag = ran.clone();
        lifecycle.on_teardown(move || *flag.borrow_mut() = true);
        assert!(*ran.borrow());
    }
}
