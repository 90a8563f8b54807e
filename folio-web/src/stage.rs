use std::cell::RefCell;
use std::rc::Rc;

use crate::input::PointerState;
use crate::profile::RenderProfile;
use crate::scene::SceneGraph;
use crate::tween::MotionTargets;
use crate::viewport::Viewport;

/// Everything the frame loop, resize handling and navigation share.
pub struct Stage {
    pub graph: SceneGraph,
    pub motion: MotionTargets,
    pub pointer: PointerState,
    pub profile: RenderProfile,
    pub viewport: Viewport,
}

impl Stage {
    pub fn new(graph: SceneGraph, profile: RenderProfile, viewport: Viewport) -> Self {
        let motion = MotionTargets::new(graph.camera.position);
        Self {
            graph,
            motion,
            pointer: PointerState::default(),
            profile,
            viewport,
        }
    }
}

/// Shared handle to the stage, passed to each collaborator at construction.
#[derive(Clone)]
pub struct SceneHandle(Rc<RefCell<Stage>>);

impl SceneHandle {
    pub fn new(stage: Stage) -> Self {
        Self(Rc::new(RefCell::new(stage)))
    }

    pub fn with<R>(&self, f: impl FnOnce(&Stage) -> R) -> R {
        f(&self.0.borrow())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Stage) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}
