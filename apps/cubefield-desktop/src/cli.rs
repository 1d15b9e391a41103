use crate::backend::BackendKind;
use clap::Parser;
use cubefield_render::{DEFAULT_CUBE_COUNT, RendererConfig, check_cube_count};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cubefield-desktop",
    about = "Fly through a field of procedurally placed cubes"
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Render backend
    #[arg(long, value_enum, default_value_t = BackendKind::Auto)]
    pub backend: BackendKind,

    /// Number of cubes to generate
    #[arg(long, default_value_t = DEFAULT_CUBE_COUNT, value_parser = parse_cube_count)]
    pub cubes: usize,

    /// Mesh seed (defaults to the wall clock)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Asset directory containing shaders/
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Wait for vertical sync when presenting
    #[arg(long)]
    pub vsync: bool,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

impl Cli {
    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            cube_count: self.cubes,
            seed: self.seed,
            vsync: self.vsync,
        }
    }

    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

fn parse_cube_count(arg: &str) -> Result<usize, String> {
    let count: usize = arg.parse().map_err(|e| format!("{e}"))?;
    check_cube_count(count).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["cubefield-desktop"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(cli.backend, BackendKind::Auto);
        assert_eq!(cli.cubes, 10_000);
        assert_eq!(cli.seed, None);
        assert_eq!((cli.width, cli.height), (1280, 720));
        assert_eq!(cli.log_filter(), "info");
        assert_eq!(cli.renderer_config(), RendererConfig::default());
    }

    #[test]
    fn explicit_options() {
        let cli = Cli::try_parse_from([
            "cubefield-desktop",
            "-v",
            "--backend",
            "opengl",
            "--cubes",
            "50",
            "--seed",
            "7",
            "--vsync",
            "--assets",
            "/tmp/assets",
        ])
        .unwrap();
        assert_eq!(cli.backend, BackendKind::OpenGl);
        assert_eq!(cli.log_filter(), "debug");
        assert_eq!(cli.assets, Some(PathBuf::from("/tmp/assets")));
        assert_eq!(
            cli.renderer_config(),
            RendererConfig {
                cube_count: 50,
                seed: Some(7),
                vsync: true,
            }
        );
    }

    #[test]
    fn cube_count_outside_limits_rejected() {
        assert!(Cli::try_parse_from(["cubefield-desktop", "--cubes", "0"]).is_err());
        let too_many = (cubefield_render::MAX_CUBE_COUNT + 1).to_string();
        assert!(Cli::try_parse_from(["cubefield-desktop", "--cubes", too_many.as_str()]).is_err());
        let cli = Cli::try_parse_from(["cubefield-desktop", "--cubes", "1"]).unwrap();
        assert_eq!(cli.cubes, 1);
    }

    #[test]
    fn unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["cubefield-desktop", "--backend", "vulkan"]).is_err());
    }
}
