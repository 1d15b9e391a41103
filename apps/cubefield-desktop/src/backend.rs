use clap::ValueEnum;
use cubefield_assets::AssetRoot;
use cubefield_render::{RenderError, Renderer, RendererConfig, SurfaceTarget};
use cubefield_render_gl::GlRenderer;
#[cfg(target_os = "macos")]
use cubefield_render_metal::MetalRenderer;
use glam::{Mat4, Vec4};

/// Backend requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Metal on macOS, OpenGL elsewhere.
    Auto,
    #[value(name = "opengl")]
    OpenGl,
    Metal,
}

impl BackendKind {
    /// Resolve `Auto` for the host platform.
    pub fn resolve(self) -> BackendKind {
        match self {
            BackendKind::Auto if cfg!(target_os = "macos") => BackendKind::Metal,
            BackendKind::Auto => BackendKind::OpenGl,
            other => other,
        }
    }
}

/// The closed set of backends, chosen once at startup.
pub enum RenderBackend {
    OpenGl(GlRenderer),
    #[cfg(target_os = "macos")]
    Metal(MetalRenderer),
}

impl RenderBackend {
    pub fn select(
        kind: BackendKind,
        assets: AssetRoot,
        config: RendererConfig,
    ) -> Result<Self, RenderError> {
        match kind.resolve() {
            BackendKind::OpenGl | BackendKind::Auto => {
                Ok(RenderBackend::OpenGl(GlRenderer::new(assets, config)))
            }
            #[cfg(target_os = "macos")]
            BackendKind::Metal => Ok(RenderBackend::Metal(MetalRenderer::new(assets, config))),
            #[cfg(not(target_os = "macos"))]
            BackendKind::Metal => Err(RenderError::Unsupported("Metal")),
        }
    }

    fn inner(&mut self) -> &mut dyn Renderer {
        match self {
            RenderBackend::OpenGl(r) => r,
            #[cfg(target_os = "macos")]
            RenderBackend::Metal(r) => r,
        }
    }
}

impl Renderer for RenderBackend {
    fn name(&self) -> &'static str {
        match self {
            RenderBackend::OpenGl(r) => r.name(),
            #[cfg(target_os = "macos")]
            RenderBackend::Metal(r) => r.name(),
        }
    }

    fn initialize(&mut self, target: &SurfaceTarget) -> Result<(), RenderError> {
        self.inner().initialize(target)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.inner().resize(width, height);
    }

    fn clear(&mut self, color: Vec4) {
        self.inner().clear(color);
    }

    fn flush(&mut self, view: &Mat4, projection: &Mat4) {
        self.inner().flush(view, projection);
    }

    fn present(&mut self) {
        self.inner().present();
    }

    fn destroy(&mut self) {
        self.inner().destroy();
    }
}

/// Human-readable host platform, derived from the OS identifier.
pub fn platform_name() -> &'static str {
    platform_label(std::env::consts::OS)
}

fn platform_label(os: &'static str) -> &'static str {
    match os {
        "macos" => "macOS",
        "linux" => "Linux",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        "dragonfly" => "DragonFly BSD",
        other => other,
    }
}

pub fn window_title() -> String {
    format!("OpenGL/Metal Renderer Interface - {}", platform_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> AssetRoot {
        AssetRoot::new(std::env::temp_dir())
    }

    #[test]
    fn auto_resolves_per_platform() {
        let resolved = BackendKind::Auto.resolve();
        if cfg!(target_os = "macos") {
            assert_eq!(resolved, BackendKind::Metal);
        } else {
            assert_eq!(resolved, BackendKind::OpenGl);
        }
        assert_eq!(BackendKind::OpenGl.resolve(), BackendKind::OpenGl);
        assert_eq!(BackendKind::Metal.resolve(), BackendKind::Metal);
    }

    #[test]
    fn opengl_is_always_available() {
        let backend =
            RenderBackend::select(BackendKind::OpenGl, assets(), RendererConfig::default())
                .unwrap();
        assert_eq!(backend.name(), "OpenGL");
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn metal_is_unsupported_off_macos() {
        let result = RenderBackend::select(BackendKind::Metal, assets(), RendererConfig::default());
        assert!(matches!(result, Err(RenderError::Unsupported("Metal"))));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn metal_selected_on_macos() {
        let backend =
            RenderBackend::select(BackendKind::Auto, assets(), RendererConfig::default()).unwrap();
        assert_eq!(backend.name(), "Metal");
    }

    #[test]
    fn platform_labels() {
        assert_eq!(platform_label("macos"), "macOS");
        assert_eq!(platform_label("linux"), "Linux");
        assert_eq!(platform_label("windows"), "Windows");
        assert_eq!(platform_label("haiku"), "haiku");
    }

    #[test]
    fn title_names_platform() {
        let title = window_title();
        assert!(title.starts_with("OpenGL/Metal Renderer Interface - "));
        assert!(title.ends_with(platform_name()));
    }

    #[test]
    fn frame_calls_before_initialize_are_harmless() {
        let mut backend =
            RenderBackend::select(BackendKind::OpenGl, assets(), RendererConfig::default())
                .unwrap();
        cubefield_render::draw_frame(&mut backend, Vec4::ONE, &Mat4::IDENTITY, &Mat4::IDENTITY);
        backend.resize(0, 0);
        backend.destroy();
    }
}
