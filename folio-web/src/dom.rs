//! Browser bindings: canvas mounting, section UI, history, timers and
//! event listeners. Everything here is a thin adapter over the
//! platform-independent modules.

use std::cell::RefCell;
use std::rc::Rc;

use folio_gpu_shared::gpu_types::FrameData;
use folio_gpu_shared::math::physical_size;
use folio_wgpu::SceneRenderer;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlCanvasElement, Performance, Window};

use crate::clock::Clock;
use crate::error::SceneError;
use crate::navigation::NavigationHost;
use crate::render::RenderBackend;
use crate::scene::{MountedSurface, SurfaceHost};
use crate::section_ui::{self, ACTIVE_CLASS};
use crate::viewport::Viewport;

pub fn window() -> Result<Window, SceneError> {
    web_sys::window().ok_or_else(|| SceneError::Environment("no window".into()))
}

pub fn document(window: &Window) -> Result<Document, SceneError> {
    window
        .document()
        .ok_or_else(|| SceneError::Environment("no document".into()))
}

fn js_error(context: &str, value: JsValue) -> SceneError {
    SceneError::Environment(format!("{context}: {value:?}"))
}

/// Current CSS-pixel viewport size.
pub fn viewport_of(window: &Window) -> Viewport {
    let dimension = |value: Result<JsValue, JsValue>| {
        value
            .ok()
            .and_then(|v| v.as_f64())
            .map_or(0, |v| v.max(0.0) as u32)
    };
    Viewport::new(dimension(window.inner_width()), dimension(window.inner_height()))
}

/// Fragment of the current URL, including the leading `#` (empty when absent).
pub fn location_hash(window: &Window) -> Option<String> {
    window.location().hash().ok().filter(|hash| !hash.is_empty())
}

// ── canvas ──

/// The page element the scene canvas is appended to.
pub struct CanvasContainer {
    document: Document,
    element: Element,
    pixel_ratio: f64,
}

impl CanvasContainer {
    pub fn find(document: &Document, id: &str, pixel_ratio: f64) -> Option<Self> {
        let element = document.get_element_by_id(id)?;
        Some(Self {
            document: document.clone(),
            element,
            pixel_ratio,
        })
    }
}

impl SurfaceHost for CanvasContainer {
    type Surface = HtmlCanvasElement;

    fn attach_surface(&mut self, viewport: Viewport) -> Result<HtmlCanvasElement, SceneError> {
        let canvas = self
            .document
            .create_element("canvas")
            .map_err(|e| js_error("create canvas", e))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SceneError::Environment("created element is not a canvas".into()))?;

        let (width, height) = physical_size(viewport.width, viewport.height, self.pixel_ratio);
        canvas.set_width(width);
        canvas.set_height(height);
        let style = canvas.style();
        for (property, value) in [("width", "100%"), ("height", "100%"), ("display", "block")] {
            style
                .set_property(property, value)
                .map_err(|e| js_error("style canvas", e))?;
        }

        self.element
            .append_child(&canvas)
            .map_err(|e| js_error("append canvas", e))?;
        Ok(canvas)
    }
}

impl MountedSurface for HtmlCanvasElement {
    fn unmount(&self) {
        self.remove();
    }
}

/// The wgpu renderer plus the canvas whose backing size it keeps in step.
pub struct CanvasRenderer {
    renderer: SceneRenderer,
    canvas: HtmlCanvasElement,
    pixel_ratio: f64,
}

impl CanvasRenderer {
    pub fn new(renderer: SceneRenderer, canvas: HtmlCanvasElement, pixel_ratio: f64) -> Self {
        Self {
            renderer,
            canvas,
            pixel_ratio,
        }
    }
}

impl RenderBackend for CanvasRenderer {
    fn resize(&mut self, css_width: u32, css_height: u32) {
        if css_width == 0 || css_height == 0 {
            return;
        }
        let (width, height) = physical_size(css_width, css_height, self.pixel_ratio);
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.renderer.resize(css_width, css_height);
    }

    fn render(&mut self, frame: &FrameData<'_>) -> Result<(), SceneError> {
        self.renderer
            .render(frame)
            .map_err(|e| SceneError::Render(e.to_string()))
    }

    fn release(&mut self) {
        self.renderer.release();
    }
}

// ── clock ──

/// `performance.now()` in seconds.
#[derive(Clone)]
pub struct PerformanceClock(Performance);

impl PerformanceClock {
    pub fn new(window: &Window) -> Result<Self, SceneError> {
        window
            .performance()
            .map(Self)
            .ok_or_else(|| SceneError::Environment("no performance timer".into()))
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> f64 {
        self.0.now() / 1000.0
    }
}

// ── navigation ──

/// Section UI and history for the live page.
pub struct DomNavigationHost {
    window: Window,
    nav_items: Vec<Element>,
    panels: Vec<Element>,
}

fn select_all(document: &Document, selector: &str) -> Result<Vec<Element>, SceneError> {
    let list = document
        .query_selector_all(selector)
        .map_err(|e| js_error(selector, e))?;
    Ok((0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

impl DomNavigationHost {
    pub fn new(
        window: Window,
        document: &Document,
        nav_item_selector: &str,
        section_selector: &str,
    ) -> Result<Self, SceneError> {
        let nav_items = select_all(document, nav_item_selector)?;
        let panels = select_all(document, section_selector)?;
        log::debug!("{} nav items, {} section panels", nav_items.len(), panels.len());
        Ok(Self {
            window,
            nav_items,
            panels,
        })
    }

    pub fn nav_items(&self) -> &[Element] {
        &self.nav_items
    }
}

fn set_active(element: &Element, active: bool) -> Result<(), JsValue> {
    if active {
        element.class_list().add_1(ACTIVE_CLASS)
    } else {
        element.class_list().remove_1(ACTIVE_CLASS)
    }
}

impl NavigationHost for DomNavigationHost {
    fn mark_active(&mut self, section: &str) {
        let mut result = Ok(());
        for item in &self.nav_items {
            let target = item.get_attribute("data-target");
            let state = section_ui::nav_item_state(section, target.as_deref());
            result = result
                .and_then(|_| set_active(item, state.active))
                .and_then(|_| match state.aria_current() {
                    Some(value) => item.set_attribute("aria-current", value),
                    None => item.remove_attribute("aria-current"),
                });
        }
        for panel in &self.panels {
            let state = section_ui::panel_state(section, &panel.id());
            result = result
                .and_then(|_| set_active(panel, state.active))
                .and_then(|_| panel.set_attribute("aria-hidden", state.aria_hidden()));
        }
        if let Err(e) = result {
            log::warn!("Failed to update section UI: {e:?}");
        }
    }

    fn push_fragment(&mut self, section: &str) {
        let url = format!("#{section}");
        let pushed = self
            .window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(&url)));
        if let Err(e) = pushed {
            log::warn!("history.pushState failed: {e:?}");
        }
    }

    fn track_page_view(&mut self, section: &str) {
        let Ok(gtag) = js_sys::Reflect::get(&self.window, &JsValue::from_str("gtag")) else {
            return;
        };
        let Some(gtag) = gtag.dyn_ref::<js_sys::Function>() else {
            return;
        };

        let params = js_sys::Object::new();
        let href = self.window.location().href().unwrap_or_default();
        let sent = section_ui::page_view_fields(section, &href)
            .into_iter()
            .try_for_each(|(key, value)| {
                js_sys::Reflect::set(&params, &key.into(), &value.into()).map(|_| ())
            })
            .and_then(|_| {
                gtag.call3(
                    &JsValue::UNDEFINED,
                    &"event".into(),
                    &"page_view".into(),
                    &params,
                )
            });
        if let Err(e) = sent {
            log::debug!("gtag page_view failed: {e:?}");
        }
    }
}

// ── listeners and timers ──

/// An attached event listener that can be removed again.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn attach(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, SceneError> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|e| js_error(event, e))?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }

    /// Keep the listener for the life of the page.
    pub fn leak(self) {
        self.callback.forget();
    }

    pub fn detach(self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            log::warn!("Failed to detach {} listener: {e:?}", self.event);
        }
    }
}

/// One pending `setTimeout`. Scheduling clears the previous one.
pub struct TimeoutSlot {
    window: Window,
    handle: Option<i32>,
    callback: Option<Closure<dyn FnMut()>>,
}

impl TimeoutSlot {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            handle: None,
            callback: None,
        }
    }

    pub fn schedule(&mut self, delay_ms: u32, task: impl FnMut() + 'static) {
        self.cancel();
        let callback = Closure::wrap(Box::new(task) as Box<dyn FnMut()>);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay_ms as i32,
            ) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.callback = Some(callback);
            }
            Err(e) => log::warn!("setTimeout failed: {e:?}"),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        self.callback = None;
    }
}

/// Self-rescheduling `requestAnimationFrame` loop.
pub struct AnimationFrames {
    window: Window,
    handle: Option<i32>,
    callback: Option<Closure<dyn FnMut()>>,
}

impl AnimationFrames {
    /// Start calling `frame` once per display refresh for as long as it
    /// returns true.
    pub fn start(
        window: Window,
        mut frame: impl FnMut() -> bool + 'static,
    ) -> Result<Rc<RefCell<Self>>, SceneError> {
        let frames = Rc::new(RefCell::new(Self {
            window,
            handle: None,
            callback: None,
        }));

        let weak = Rc::downgrade(&frames);
        let callback = Closure::wrap(Box::new(move || {
            let Some(frames) = weak.upgrade() else {
                return;
            };
            frames.borrow_mut().handle = None;
            if frame() {
                frames.borrow_mut().request();
            } else {
                log::info!("Animation loop stopped");
            }
        }) as Box<dyn FnMut()>);

        {
            let mut state = frames.borrow_mut();
            state.callback = Some(callback);
            state.request();
        }
        Ok(frames)
    }

    fn request(&mut self) {
        let Some(callback) = self.callback.as_ref() else {
            return;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
    }

    /// Cancel the pending frame and drop the callback.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.window.cancel_animation_frame(handle) {
                log::warn!("cancelAnimationFrame failed: {e:?}");
            }
        }
        self.callback = None;
    }
}
