use std::path::{Path, PathBuf};

use folio_web::SceneOptions;
use serde::Deserialize;

/// What kind of directory tree we are operating in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectKind {
    /// The Folio workspace itself (Cargo.toml next to folio-web/)
    Workspace,
    /// A site that embeds the scene, with .folio/config.toml
    Site,
}

fn default_web_crate() -> String {
    "folio-web".into()
}

fn default_out_dir() -> String {
    "pkg".into()
}

/// Configuration read from .folio/config.toml
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectConfig {
    /// Path to the web runtime crate, relative to the project root
    #[serde(default = "default_web_crate")]
    pub web_crate: String,
    /// wasm-pack output directory, relative to the web crate
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    /// Scene option overrides used by `folio preview`
    #[serde(default)]
    pub scene: SceneOptions,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            web_crate: default_web_crate(),
            out_dir: default_out_dir(),
            scene: SceneOptions::default(),
        }
    }
}

/// The resolved project context.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub project_root: PathBuf,
    pub kind: ProjectKind,
    /// Absolute path of the web runtime crate
    pub web_crate_path: PathBuf,
    pub config: ProjectConfig,
}

/// Detect project context from the current directory, walking up.
pub fn detect_project_context() -> anyhow::Result<ProjectContext> {
    detect_project_context_from(&std::env::current_dir()?)
}

/// Detect project context starting from a specific directory, walking up.
pub fn detect_project_context_from(start: &Path) -> anyhow::Result<ProjectContext> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(".folio").join("config.toml");
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: ProjectConfig = toml::from_str(&content)?;
            config.scene.validate()?;
            return Ok(ProjectContext {
                web_crate_path: dir.join(&config.web_crate),
                project_root: dir,
                kind: ProjectKind::Site,
                config,
            });
        }
        if dir.join("Cargo.toml").exists() && dir.join("folio-web").join("Cargo.toml").exists() {
            return Ok(ProjectContext {
                web_crate_path: dir.join("folio-web"),
                project_root: dir,
                kind: ProjectKind::Workspace,
                config: ProjectConfig::default(),
            });
        }
        if !dir.pop() {
            anyhow::bail!(
                "Could not find a Folio project.\n\
                 Run `folio` from within the Folio workspace or a site with .folio/config.toml"
            );
        }
    }
}
