use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio ambient scene developer CLI",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Subcommand)]
pub enum Command {
    /// Show the render profile a browser would get
    Profile {
        /// User agent string to classify
        #[arg(long, default_value = DESKTOP_UA)]
        user_agent: String,
        /// Viewport width in CSS pixels
        #[arg(long, default_value_t = 1280)]
        width: u32,
        /// Device pixel ratio
        #[arg(long, default_value_t = 1.0)]
        pixel_ratio: f64,
    },
    /// Run the scene headlessly and report where it ends up
    Preview {
        /// Section to navigate to after the first frame
        #[arg(long)]
        section: Option<String>,
        /// Simulated run time in seconds
        #[arg(long, default_value_t = 2.0)]
        seconds: f64,
        /// Simulated frame rate
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// Placement seed (overrides the project config)
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 720)]
        height: u32,
        #[arg(long, default_value = DESKTOP_UA)]
        user_agent: String,
    },
    /// Build the web runtime with wasm-pack
    Build {
        /// Unoptimized debug build
        #[arg(long)]
        dev: bool,
    },
}
