use std::cell::RefCell;
use std::rc::Rc;

use folio_wgpu::{wgpu, RendererOptions, SceneRenderer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, KeyboardEvent, MouseEvent, Window};

use crate::clock::Clock;
use crate::dom::{
    self, AnimationFrames, CanvasContainer, CanvasRenderer, DomNavigationHost, Listener,
    PerformanceClock, TimeoutSlot,
};
use crate::error::SceneError;
use crate::frame_loop::LoopControl;
use crate::navigation::NavigationBridge;
use crate::options::SceneOptions;
use crate::profile::derive_profile;
use crate::rng::SceneRng;
use crate::runtime::SceneRuntime;
use crate::scene::{build_scene, renderer_or_unmount};
use crate::section_ui::is_activation_key;
use crate::stage::{SceneHandle, Stage};

type Runtime = Rc<RefCell<SceneRuntime<CanvasRenderer>>>;
type Bridge = Rc<RefCell<NavigationBridge<DomNavigationHost, PerformanceClock>>>;

/// A running background scene.
#[wasm_bindgen]
pub struct SceneApp {
    runtime: Runtime,
    bridge: Bridge,
}

#[wasm_bindgen]
impl SceneApp {
    /// Navigate to a section, as if its nav item had been clicked.
    pub fn navigate_to(&self, section: &str) {
        self.bridge.borrow_mut().navigate_to(section);
    }

    pub fn active_section(&self) -> String {
        self.bridge.borrow().active_section().to_string()
    }

    /// Stop the scene and release the GPU. Returns false if already torn down.
    pub fn teardown(&self) -> bool {
        self.runtime.borrow_mut().teardown()
    }
}

impl SceneApp {
    /// Build everything in order: profile, scene, renderer, loop, navigation.
    ///
    /// `Ok(None)` means the page has no place for the scene or no usable GPU;
    /// the page carries on without a background.
    pub async fn start(options: SceneOptions) -> Result<Option<SceneApp>, SceneError> {
        let window = dom::window()?;
        let document = dom::document(&window)?;
        let viewport = dom::viewport_of(&window);
        let user_agent = window
            .navigator()
            .user_agent()
            .map_err(|e| SceneError::Environment(format!("user agent: {e:?}")))?;
        let profile = derive_profile(&user_agent, viewport.width)
            .with_pixel_ratio(window.device_pixel_ratio());
        log::info!(
            "Render profile: {} tier, {} particles, pixel ratio {}",
            profile.quality_tier.label(),
            profile.particle_count,
            profile.pixel_ratio,
        );

        let container =
            CanvasContainer::find(&document, &options.container_id, profile.pixel_ratio);
        let mut rng = match options.seed {
            Some(seed) => SceneRng::new(seed),
            None => SceneRng::from_entropy(),
        };
        let built = build_scene(&profile, viewport, container, &options.container_id, &mut rng);
        let built = match built {
            Ok(built) => built,
            Err(e @ SceneError::MissingContainer(_)) => {
                log::warn!("{e}; background scene disabled");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let canvas = built.surface;
        let created = SceneRenderer::new(
            wgpu::SurfaceTarget::Canvas(canvas.clone()),
            viewport.width,
            viewport.height,
            RendererOptions {
                antialias: profile.antialias_enabled,
                pixel_ratio: profile.pixel_ratio,
                particle_capacity: profile.particle_count,
            },
        )
        .await;
        let Some(renderer) = renderer_or_unmount(&canvas, created) else {
            return Ok(None);
        };
        let backend = CanvasRenderer::new(renderer, canvas, profile.pixel_ratio);

        let stage = SceneHandle::new(Stage::new(built.graph, profile, viewport));
        let clock = PerformanceClock::new(&window)?;
        let runtime: Runtime = Rc::new(RefCell::new(SceneRuntime::new(
            stage.clone(),
            backend,
            options.resize_debounce_seconds(),
        )));

        let host = DomNavigationHost::new(
            window.clone(),
            &document,
            &options.nav_item_selector,
            &options.section_selector,
        )?;
        let nav_items = host.nav_items().to_vec();
        let bridge: Bridge = Rc::new(RefCell::new(NavigationBridge::new(
            stage,
            host,
            clock.clone(),
            options.tween_seconds,
        )));

        let mut listeners = Vec::new();
        listeners.extend(resize_listener(&window, &runtime, &clock, options.resize_debounce_ms)?);
        if profile.pointer_parallax {
            listeners.push(pointer_listener(&window, &runtime)?);
        }
        for item in &nav_items {
            listeners.extend(nav_item_listeners(item, &bridge)?);
        }
        listeners.push(popstate_listener(&window, &bridge)?);

        let frames = {
            let runtime = runtime.clone();
            let clock = clock.clone();
            AnimationFrames::start(window.clone(), move || {
                runtime.borrow_mut().frame(clock.now()) == LoopControl::Continue
            })?
        };

        {
            let mut rt = runtime.borrow_mut();
            let lifecycle = rt.lifecycle_mut();
            for listener in listeners {
                lifecycle.on_teardown(move || listener.detach());
            }
            lifecycle.on_teardown(move || frames.borrow_mut().stop());
        }
        unload_listener(&window, &runtime)?.leak();

        // The scene exists now, so a deep link can take effect immediately.
        bridge
            .borrow_mut()
            .restore_initial(dom::location_hash(&window).as_deref());

        log::info!("Background scene running");
        Ok(Some(SceneApp { runtime, bridge }))
    }
}

fn resize_listener(
    window: &Window,
    runtime: &Runtime,
    clock: &PerformanceClock,
    debounce_ms: u32,
) -> Result<Vec<Listener>, SceneError> {
    let timer = Rc::new(RefCell::new(TimeoutSlot::new(window.clone())));
    let handler = {
        let window = window.clone();
        let runtime = runtime.clone();
        let clock = clock.clone();
        let timer = timer.clone();
        move |_: Event| {
            let viewport = dom::viewport_of(&window);
            runtime
                .borrow_mut()
                .on_resize(viewport.width, viewport.height, clock.now());

            let runtime = runtime.clone();
            let clock = clock.clone();
            timer.borrow_mut().schedule(debounce_ms, move || {
                runtime.borrow_mut().flush_resize(clock.now());
            });
        }
    };
    let listener = Listener::attach(window, "resize", handler)?;
    runtime
        .borrow_mut()
        .lifecycle_mut()
        .on_teardown(move || timer.borrow_mut().cancel());
    Ok(vec![listener])
}

fn pointer_listener(window: &Window, runtime: &Runtime) -> Result<Listener, SceneError> {
    let runtime = runtime.clone();
    Listener::attach(window, "mousemove", move |event: Event| {
        if let Some(event) = event.dyn_ref::<MouseEvent>() {
            runtime
                .borrow_mut()
                .on_pointer_move(event.client_x() as f64, event.client_y() as f64);
        }
    })
}

fn nav_item_listeners(
    item: &web_sys::Element,
    bridge: &Bridge,
) -> Result<Vec<Listener>, SceneError> {
    let target = |item: &web_sys::Element| item.get_attribute("data-target");

    let click = {
        let bridge = bridge.clone();
        let item = item.clone();
        move |_: Event| {
            if let Some(section) = target(&item) {
                bridge.borrow_mut().navigate_to(&section);
            }
        }
    };
    let keydown = {
        let bridge = bridge.clone();
        let item = item.clone();
        move |event: Event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
                return;
            };
            if is_activation_key(&key) {
                event.prevent_default();
                if let Some(section) = target(&item) {
                    bridge.borrow_mut().navigate_to(&section);
                }
            }
        }
    };

    Ok(vec![
        Listener::attach(item, "click", click)?,
        Listener::attach(item, "keydown", keydown)?,
    ])
}

fn popstate_listener(window: &Window, bridge: &Bridge) -> Result<Listener, SceneError> {
    let bridge = bridge.clone();
    let location_window = window.clone();
    Listener::attach(window, "popstate", move |_: Event| {
        let hash = dom::location_hash(&location_window);
        bridge.borrow_mut().on_history_pop(hash.as_deref());
    })
}

/// Tears the scene down when the page goes away. Holds the runtime weakly.
fn unload_listener(window: &Window, runtime: &Runtime) -> Result<Listener, SceneError> {
    let runtime = Rc::downgrade(runtime);
    Listener::attach(window, "beforeunload", move |_: Event| {
        if let Some(runtime) = runtime.upgrade() {
            runtime.borrow_mut().teardown();
        }
    })
}
