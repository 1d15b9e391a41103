use cubefield_render::{RenderError, SurfaceTarget};
use glow::HasContext;
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{Display, DisplayApiPreference, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use std::num::NonZeroU32;

pub(crate) const KHR_DEBUG: &str = "GL_KHR_debug";

/// Requested context version.
pub(crate) const GL_VERSION: Version = Version::new(3, 3);

/// A current OpenGL context bound to one window surface.
///
/// Owns the glutin display/context/surface and the `glow` function table.
/// Every GL call goes through [`GlContext::gl`]; nothing relies on ambient
/// current-context state elsewhere. Dropping it releases the context.
pub(crate) struct GlContext {
    gl: glow::Context,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    _display: Display,
}

impl GlContext {
    /// Create a double-buffered context with a 24-bit depth buffer on the
    /// target window and make it current.
    pub(crate) fn create(target: &SurfaceTarget, vsync: bool) -> Result<Self, RenderError> {
        // SAFETY: the raw handles come from a live window owned by the driver,
        // which outlives the renderer.
        let display = unsafe { Display::new(target.display, display_preference(target)) }
            .map_err(|e| RenderError::Context(format!("no OpenGL display for window: {e}")))?;

        let template = ConfigTemplateBuilder::new()
            .with_depth_size(24)
            .compatible_with_native_window(target.window)
            .build();
        let config = unsafe { display.find_configs(template) }
            .map_err(|e| RenderError::Context(format!("no OpenGL config: {e}")))?
            .reduce(|best, c| {
                if c.num_samples() < best.num_samples() {
                    c
                } else {
                    best
                }
            })
            .ok_or_else(|| RenderError::Context("no OpenGL config with a depth buffer".into()))?;

        let attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(GL_VERSION)))
            .with_profile(profile())
            .build(Some(target.window));
        let not_current = unsafe { display.create_context(&config, &attributes) }.map_err(|e| {
            RenderError::Context(format!(
                "OpenGL {}.{} context: {e}",
                GL_VERSION.major, GL_VERSION.minor
            ))
        })?;

        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            target.window,
            non_zero(target.width),
            non_zero(target.height),
        );
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .map_err(|e| RenderError::Context(format!("window surface: {e}")))?;
        let context = not_current
            .make_current(&surface)
            .map_err(|e| RenderError::Context(format!("make current: {e}")))?;

        let interval = if vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            tracing::warn!("could not set swap interval: {e}");
        }

        // SAFETY: the context created above is current on this thread.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name))
        };

        Ok(Self {
            gl,
            surface,
            context,
            _display: display,
        })
    }

    pub(crate) fn gl(&self) -> &glow::Context {
        &self.gl
    }

    pub(crate) fn log_info(&self) {
        let version = self.gl.version();
        tracing::info!("OpenGL version {}.{}", version.major, version.minor);
        unsafe {
            tracing::info!("Vendor: {}", self.gl.get_parameter_string(glow::VENDOR));
            tracing::info!("Renderer: {}", self.gl.get_parameter_string(glow::RENDERER));
        }
    }

    /// Route driver diagnostics into the log when `GL_KHR_debug` is present.
    /// Returns whether the callback was installed.
    pub(crate) fn enable_debug_output(&mut self) -> bool {
        let extensions = self.gl.supported_extensions();
        tracing::debug!("{} OpenGL extensions available", extensions.len());

        if !extensions.iter().any(|ext| ext.eq_ignore_ascii_case(KHR_DEBUG)) {
            tracing::warn!("{KHR_DEBUG} not supported, validation messages disabled");
            return false;
        }

        tracing::info!("{KHR_DEBUG} supported, enabling validation messages");
        unsafe {
            self.gl.enable(glow::DEBUG_OUTPUT);
            self.gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
            self.gl.debug_message_callback(log_debug_message);
        }
        true
    }

    pub(crate) fn resize(&self, width: u32, height: u32) {
        self.surface
            .resize(&self.context, non_zero(width), non_zero(height));
        unsafe {
            self.gl
                .viewport(0, 0, width.max(1) as i32, height.max(1) as i32);
        }
    }

    pub(crate) fn swap_buffers(&self) -> Result<(), glutin::error::Error> {
        self.surface.swap_buffers(&self.context)
    }
}

fn non_zero(v: u32) -> NonZeroU32 {
    NonZeroU32::new(v).unwrap_or(NonZeroU32::MIN)
}

#[cfg(target_os = "windows")]
fn display_preference(target: &SurfaceTarget) -> DisplayApiPreference {
    DisplayApiPreference::Wgl(Some(target.window))
}

#[cfg(target_os = "macos")]
fn display_preference(_target: &SurfaceTarget) -> DisplayApiPreference {
    DisplayApiPreference::Cgl
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn display_preference(_target: &SurfaceTarget) -> DisplayApiPreference {
    DisplayApiPreference::Egl
}

// CGL only offers 3.x contexts with the core profile.
#[cfg(target_os = "macos")]
fn profile() -> GlProfile {
    GlProfile::Core
}

#[cfg(not(target_os = "macos"))]
fn profile() -> GlProfile {
    GlProfile::Compatibility
}

/// Notifications are chatty and informational only.
pub(crate) fn should_log(severity: u32) -> bool {
    severity != glow::DEBUG_SEVERITY_NOTIFICATION
}

fn log_debug_message(_source: u32, kind: u32, id: u32, severity: u32, message: &str) {
    if !should_log(severity) {
        return;
    }
    if severity == glow::DEBUG_SEVERITY_HIGH || kind == glow::DEBUG_TYPE_ERROR {
        tracing::error!("GL debug type 0x{kind:x} severity 0x{severity:x} id {id}: {message}");
    } else {
        tracing::warn!("GL debug type 0x{kind:x} severity 0x{severity:x} id {id}: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_are_filtered() {
        assert!(!should_log(glow::DEBUG_SEVERITY_NOTIFICATION));
        assert!(should_log(glow::DEBUG_SEVERITY_LOW));
        assert!(should_log(glow::DEBUG_SEVERITY_MEDIUM));
        assert!(should_log(glow::DEBUG_SEVERITY_HIGH));
    }

    #[test]
    fn zero_sizes_become_one() {
        assert_eq!(non_zero(0).get(), 1);
        assert_eq!(non_zero(720).get(), 720);
    }
}
