use anyhow::Result;
use clap::{Parser, Subcommand};
use cubefield_assets::AssetRoot;
use cubefield_render::{
    DEFAULT_FRAGMENT_SHADER, DEFAULT_METAL_LIBRARY, DEFAULT_VERTEX_SHADER, ShaderSource,
};
use std::path::PathBuf;
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for cubefield")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, shaders, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Verify the shader assets the backends load at startup
    Shaders {
        /// Asset directory (defaults to the workspace assets/)
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_shaders(&AssetRoot::discover())?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Shaders { assets } => {
            let root = assets.map(AssetRoot::new).unwrap_or_else(AssetRoot::discover);
            run_shaders(&root)?;
        }
        Commands::Doc => run_doc()?,
        Commands::Build => run_build()?,
    }

    Ok(())
}

fn cargo(args: &[&str], what: &str) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {what} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], "fmt check")
}

fn run_clippy() -> Result<()> {
    cargo(
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
        "clippy",
    )
}

fn run_tests() -> Result<()> {
    cargo(&["test", "--workspace"], "test")
}

fn run_doc() -> Result<()> {
    cargo(&["doc", "--workspace", "--no-deps"], "doc")
}

fn run_build() -> Result<()> {
    cargo(&["build", "--workspace"], "build")
}

/// A shader asset and the identifiers the backends look up in it.
struct ShaderCheck {
    path: &'static str,
    required: &'static [&'static str],
}

const SHADER_CHECKS: [ShaderCheck; 3] = [
    ShaderCheck {
        path: DEFAULT_VERTEX_SHADER,
        required: &["#version 330", "uniform Uniforms u", "model", "view", "projection"],
    },
    ShaderCheck {
        path: DEFAULT_FRAGMENT_SHADER,
        required: &["#version 330"],
    },
    ShaderCheck {
        path: DEFAULT_METAL_LIBRARY,
        required: &["vertex_main", "fragment_main", "[[buffer(1)]]"],
    },
];

fn run_shaders(root: &AssetRoot) -> Result<()> {
    println!("==> Checking shader assets in {}", root.base().display());
    let problems = shader_problems(root);
    for problem in &problems {
        eprintln!("    {problem}");
    }
    if !problems.is_empty() {
        anyhow::bail!("{} shader asset problem(s)", problems.len());
    }
    Ok(())
}

fn shader_problems(root: &AssetRoot) -> Vec<String> {
    let mut problems = Vec::new();
    for check in &SHADER_CHECKS {
        let text = match root.try_load_text(check.path) {
            Ok(text) => text,
            Err(e) => {
                problems.push(e.to_string());
                continue;
            }
        };
        let source = match ShaderSource::new(check.path, text) {
            Ok(source) => source,
            Err(e) => {
                problems.push(e.to_string());
                continue;
            }
        };
        for needle in check.required {
            if !source.text().contains(needle) {
                problems.push(format!("{}: missing `{needle}`", check.path));
            }
        }
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn workspace_shaders_pass() {
        let root = AssetRoot::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../assets"));
        assert!(shader_problems(&root).is_empty());
    }

    #[test]
    fn missing_and_empty_shaders_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("shaders")).unwrap();
        fs::write(dir.path().join(DEFAULT_FRAGMENT_SHADER), "  \n").unwrap();
        let problems = shader_problems(&AssetRoot::new(dir.path()));
        // vertex missing, fragment empty, metal missing
        assert_eq!(problems.len(), 3);
        assert!(problems.iter().any(|p| p.contains("empty")));
    }

    #[test]
    fn missing_identifier_reported() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = AssetRoot::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../assets"));
        fs::create_dir_all(dir.path().join("shaders")).unwrap();
        for check in &SHADER_CHECKS {
            let text = workspace.try_load_text(check.path).unwrap();
            fs::write(dir.path().join(check.path), text).unwrap();
        }
        fs::write(
            dir.path().join(DEFAULT_METAL_LIBRARY),
            "vertex float4 vertex_main() {}",
        )
        .unwrap();
        let problems = shader_problems(&AssetRoot::new(dir.path()));
        assert_eq!(problems.len(), 2);
    }
}
