use serde::Deserialize;

use crate::error::SceneError;

/// Page-provided configuration. Every field has a default, so an absent or
/// empty JSON object yields the stock portfolio layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneOptions {
    /// Id of the element the canvas is appended to.
    pub container_id: String,
    /// Selector for navigation items carrying `data-target`.
    pub nav_item_selector: String,
    /// Selector for section panels, identified by their `id`.
    pub section_selector: String,
    /// Fixed seed for scene placement; random when absent.
    pub seed: Option<u64>,
    pub resize_debounce_ms: u32,
    pub tween_seconds: f64,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            container_id: "canvas-container".into(),
            nav_item_selector: ".nav-item".into(),
            section_selector: ".section-panel".into(),
            seed: None,
            resize_debounce_ms: 250,
            tween_seconds: 1.5,
        }
    }
}

impl SceneOptions {
    /// Parse options from an optional JSON string.
    pub fn from_json(json: Option<&str>) -> Result<Self, SceneError> {
        let options = match json.map(str::trim) {
            None | Some("") => Self::default(),
            Some(text) => serde_json::from_str::<Self>(text)
                .map_err(|e| SceneError::InvalidOptions(e.to_string()))?,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if self.container_id.is_empty() {
            return Err(SceneError::InvalidOptions("container_id is empty".into()));
        }
        if !(self.tween_seconds.is_finite() && self.tween_seconds > 0.0) {
            return Err(SceneError::InvalidOptions(format!(
                "tween_seconds must be positive, got {}",
                self.tween_seconds
            )));
        }
        Ok(())
    }

    pub fn resize_debounce_seconds(&self) -> f64 {
        self.resize_debounce_ms as f64 / 1000.0
    }
}
