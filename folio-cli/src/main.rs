mod cli;
mod commands;
mod project;

use clap::Parser;
use folio_web::viewport::Viewport;

use cli::{Cli, Command};
use commands::preview_cmd::PreviewParams;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Command::Profile {
            user_agent,
            width,
            pixel_ratio,
        } => commands::profile_cmd::run(&user_agent, width, pixel_ratio),
        Command::Preview {
            section,
            seconds,
            fps,
            seed,
            width,
            height,
            user_agent,
        } => {
            // Preview works anywhere; a project only contributes option overrides.
            let mut options = match project::detect_project_context() {
                Ok(ctx) => ctx.config.scene,
                Err(e) => {
                    log::debug!("No project config: {e}");
                    Default::default()
                }
            };
            if seed.is_some() {
                options.seed = seed;
            }
            commands::preview_cmd::run(PreviewParams {
                section,
                seconds,
                fps,
                viewport: Viewport::new(width, height),
                user_agent,
                options,
            })
        }
        Command::Build { dev } => {
            let ctx = project::detect_project_context()?;
            commands::build_cmd::run(dev, ctx).await
        }
    }
}
