//! Folio ambient scene runtime
//!
//! Renders the animated 3D background behind the portfolio site and moves
//! the camera when the visitor navigates between sections. The scene model,
//! animation, resize, navigation and lifecycle logic is platform
//! independent; the browser bindings live behind `target_arch = "wasm32"`.

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;

pub mod animation;
pub mod clock;
pub mod error;
pub mod frame_loop;
pub mod input;
pub mod lifecycle;
pub mod navigation;
pub mod options;
pub mod particles;
pub mod profile;
pub mod render;
pub mod resize;
pub mod rng;
pub mod runtime;
pub mod scene;
pub mod section_ui;
pub mod stage;
pub mod transform;
pub mod tween;
pub mod viewport;

pub use error::SceneError;
pub use options::SceneOptions;
pub use profile::{derive_profile, QualityTier, RenderProfile};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point, called when the WASM module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Folio logger already initialized".into());
    }
    log::info!("Folio scene runtime initialized");
}

/// Start the background scene.
///
/// `options_json` is an optional JSON object overriding [`SceneOptions`]
/// defaults. Resolves to `undefined` when the page has no scene container
/// or no usable GPU.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn start_scene(options_json: Option<String>) -> Result<Option<app::SceneApp>, JsValue> {
    let options = SceneOptions::from_json(options_json.as_deref())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    app::SceneApp::start(options).await.map_err(|e| {
        log::error!("Background scene failed to start: {e}");
        JsValue::from_str(&e.to_string())
    })
}
