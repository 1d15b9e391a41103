mod app;
mod backend;
mod cli;

use anyhow::Result;
use clap::Parser;
use cubefield_assets::AssetRoot;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_filter()))
        .init();

    tracing::info!("cubefield-desktop starting on {}", backend::platform_name());

    let assets = match &cli.assets {
        Some(dir) => AssetRoot::new(dir.clone()),
        None => AssetRoot::discover(),
    };
    tracing::debug!("asset root: {}", assets.base().display());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(app::AppOptions {
        backend: cli.backend,
        config: cli.renderer_config(),
        assets,
        width: cli.width,
        height: cli.height,
    });
    event_loop.run_app(&mut app)?;

    app.finish()
}
