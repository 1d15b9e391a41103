//! Asset loading: resolves relative asset paths against an asset root and
//! reads them as text.
//!
//! The renderer consumes shader sources through this crate and never builds
//! platform paths itself.
//!
//! # Layout
//! ```text
//! assets/
//!   shaders/
//!     default.vert   - GLSL vertex stage
//!     default.frag   - GLSL fragment stage
//!     default.metal  - Metal shading language library
//! ```

use std::path::{Path, PathBuf};

/// Asset directory baked in at compile time: `<workspace>/assets`.
const WORKSPACE_ASSETS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets");

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Base directory relative asset paths resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoot {
    base: PathBuf,
}

impl AssetRoot {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Pick the first existing candidate: `assets/` next to the executable,
    /// then the workspace `assets/` directory.
    pub fn discover() -> Self {
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("assets")));

        let candidates = beside_exe
            .into_iter()
            .chain(std::iter::once(PathBuf::from(WORKSPACE_ASSETS)));

        for candidate in candidates {
            if candidate.is_dir() {
                tracing::debug!("asset root: {}", candidate.display());
                return Self::new(candidate);
            }
        }

        tracing::warn!("no asset directory found, falling back to {WORKSPACE_ASSETS}");
        Self::new(WORKSPACE_ASSETS)
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.base.join(relative)
    }

    /// Read an asset as text.
    pub fn try_load_text(&self, relative: impl AsRef<Path>) -> Result<String, AssetError> {
        read_text(self.resolve(relative))
    }

    /// Read an asset as text; a missing or unreadable file is logged and
    /// yields an empty string.
    pub fn load_text(&self, relative: impl AsRef<Path>) -> String {
        load_text(self.resolve(relative))
    }
}

impl Default for AssetRoot {
    fn default() -> Self {
        Self::discover()
    }
}

/// Read a file as text; failures are logged and yield an empty string.
pub fn load_text(path: impl AsRef<Path>) -> String {
    match read_text(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("{e}");
            String::new()
        }
    }
}

fn read_text(path: impl AsRef<Path>) -> Result<String, AssetError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_existing_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "#version 330 core\nvoid main() {{}}\n").unwrap();
        let text = load_text(tmp.path());
        assert!(text.starts_with("#version 330"));
    }

    #[test]
    fn missing_file_yields_empty_string() {
        let dir = tempfile::tempdir().unwrap();
        let root = AssetRoot::new(dir.path());
        assert_eq!(root.load_text("shaders/nope.vert"), "");
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = AssetRoot::new(dir.path());
        let err = root.try_load_text("shaders/nope.frag").unwrap_err();
        let AssetError::Io { path, source } = err;
        assert!(path.ends_with("shaders/nope.frag"));
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn resolve_joins_relative_path() {
        let root = AssetRoot::new("/opt/cubefield/assets");
        assert_eq!(
            root.resolve("shaders/default.vert"),
            PathBuf::from("/opt/cubefield/assets/shaders/default.vert")
        );
    }

    #[test]
    fn nested_asset_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("shaders")).unwrap();
        std::fs::write(dir.path().join("shaders/a.frag"), "void main() {}").unwrap();
        let root = AssetRoot::new(dir.path());
        assert_eq!(root.try_load_text("shaders/a.frag").unwrap(), "void main() {}");
    }

    #[test]
    fn workspace_shaders_are_present() {
        let root = AssetRoot::new(WORKSPACE_ASSETS);
        for rel in ["shaders/default.vert", "shaders/default.frag", "shaders/default.metal"] {
            assert!(!root.load_text(rel).trim().is_empty(), "{rel} missing");
        }
    }
}
