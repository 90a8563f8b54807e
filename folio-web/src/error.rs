use std::fmt;

/// Everything that can stop the background scene from starting or running.
/// None of these are shown to the visitor; the page works without the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The designated display container is not in the page.
    MissingContainer(String),
    /// Options passed from the page could not be parsed or are out of range.
    InvalidOptions(String),
    /// The GPU backend could not be created or failed mid-frame.
    Render(String),
    /// A browser API the runtime depends on is unavailable.
    Environment(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContainer(id) => write!(f, "display container #{id} not found"),
            Self::InvalidOptions(e) => write!(f, "invalid scene options: {e}"),
            Self::Render(e) => write!(f, "render failure: {e}"),
            Self::Environment(e) => write!(f, "browser environment unavailable: {e}"),
        }
    }
}

impl std::error::Error for SceneError {}
