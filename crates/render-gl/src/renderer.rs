use crate::context::GlContext;
use crate::mesh::GpuMesh;
use crate::program::ShaderProgram;
use cubefield_assets::AssetRoot;
use cubefield_render::{
    CubeField, DEFAULT_FRAGMENT_SHADER, DEFAULT_VERTEX_SHADER, Lifecycle, RenderError, Renderer,
    RendererConfig, ShaderSource, SurfaceTarget, Uniforms,
};
use glam::{Mat4, Vec4};
use glow::HasContext;

/// OpenGL 3.3 backend.
///
/// Owns its context, program and mesh exclusively. Each resource is held in
/// an `Option` and released independently, so `destroy` is idempotent and
/// also cleans up after a failed `initialize`.
pub struct GlRenderer {
    assets: AssetRoot,
    config: RendererConfig,
    state: Lifecycle,
    // Declared before `context`: GL objects go first.
    program: Option<ShaderProgram>,
    mesh: Option<GpuMesh>,
    context: Option<GlContext>,
}

impl GlRenderer {
    pub fn new(assets: AssetRoot, config: RendererConfig) -> Self {
        Self {
            assets,
            config,
            state: Lifecycle::Uninitialized,
            program: None,
            mesh: None,
            context: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    fn try_initialize(&mut self, target: &SurfaceTarget) -> Result<(), RenderError> {
        let mut context = GlContext::create(target, self.config.vsync)?;
        context.log_info();
        context.enable_debug_output();

        let gl = context.gl();
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.viewport(0, 0, target.width as i32, target.height as i32);
        }

        let program = self.setup_default_shaders(gl)?;
        let mesh = match self.create_cube_mesh(gl) {
            Ok(mesh) => mesh,
            Err(e) => {
                program.delete(gl);
                return Err(e);
            }
        };

        self.program = Some(program);
        self.mesh = Some(mesh);
        self.context = Some(context);
        Ok(())
    }

    fn setup_default_shaders(&self, gl: &glow::Context) -> Result<ShaderProgram, RenderError> {
        let vertex = ShaderSource::new(
            DEFAULT_VERTEX_SHADER,
            self.assets.load_text(DEFAULT_VERTEX_SHADER),
        )?;
        let fragment = ShaderSource::new(
            DEFAULT_FRAGMENT_SHADER,
            self.assets.load_text(DEFAULT_FRAGMENT_SHADER),
        )?;
        let program = ShaderProgram::build(gl, &vertex, &fragment)?;
        tracing::info!("default shaders compiled and linked");
        Ok(program)
    }

    fn create_cube_mesh(&self, gl: &glow::Context) -> Result<GpuMesh, RenderError> {
        let seed = self.config.mesh_seed();
        tracing::debug!("generating {} cubes with seed {seed}", self.config.cube_count);
        let field = CubeField::generate(self.config.cube_count, seed)?;
        GpuMesh::upload(gl, &field)
    }

    fn active_context(&self) -> Option<&GlContext> {
        if !self.state.is_initialized() {
            return None;
        }
        self.context.as_ref()
    }
}

impl Renderer for GlRenderer {
    fn name(&self) -> &'static str {
        "OpenGL"
    }

    fn initialize(&mut self, target: &SurfaceTarget) -> Result<(), RenderError> {
        if self.state.is_initialized() {
            tracing::warn!("OpenGL renderer already initialized, recreating");
            self.destroy();
        }

        match self.try_initialize(target) {
            Ok(()) => {
                self.state = Lifecycle::Initialized;
                Ok(())
            }
            Err(e) => {
                tracing::error!("OpenGL renderer initialization failed: {e}");
                self.destroy();
                Err(e)
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(context) = self.active_context() {
            context.resize(width, height);
        }
    }

    fn clear(&mut self, color: Vec4) {
        let Some(context) = self.active_context() else {
            return;
        };
        let gl = context.gl();
        unsafe {
            gl.clear_color(color.x, color.y, color.z, color.w);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn flush(&mut self, view: &Mat4, projection: &Mat4) {
        let (Some(context), Some(program), Some(mesh)) =
            (self.active_context(), &self.program, &self.mesh)
        else {
            return;
        };
        let gl = context.gl();
        program.bind(gl);
        program.set_uniforms(gl, &Uniforms::new(view, projection));
        mesh.draw(gl);
    }

    fn present(&mut self) {
        let Some(context) = self.active_context() else {
            return;
        };
        if let Err(e) = context.swap_buffers() {
            tracing::error!("swap buffers failed: {e}");
        }
    }

    fn destroy(&mut self) {
        match &self.context {
            Some(context) => {
                let gl = context.gl();
                if let Some(program) = self.program.take() {
                    program.delete(gl);
                }
                if let Some(mesh) = self.mesh.take() {
                    mesh.delete(gl);
                }
                self.context = None;
                tracing::debug!("OpenGL renderer destroyed");
            }
            // Without a context the objects are already gone with it.
            None => {
                self.program = None;
                self.mesh = None;
            }
        }

        if self.state != Lifecycle::Uninitialized {
            self.state = Lifecycle::Destroyed;
        }
    }
}

impl Drop for GlRenderer {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_render::raw_window_handle::{
        RawDisplayHandle, RawWindowHandle, WebDisplayHandle, WebWindowHandle,
    };

    fn renderer() -> GlRenderer {
        let dir = tempfile::tempdir().unwrap();
        GlRenderer::new(AssetRoot::new(dir.path()), RendererConfig::default())
    }

    fn foreign_target() -> SurfaceTarget {
        SurfaceTarget::new(
            RawWindowHandle::Web(WebWindowHandle::new(7)),
            RawDisplayHandle::Web(WebDisplayHandle::new()),
            1280,
            720,
        )
    }

    #[test]
    fn starts_uninitialized() {
        let r = renderer();
        assert_eq!(r.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(r.name(), "OpenGL");
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut r = renderer();
        r.destroy();
        r.destroy();
        assert_eq!(r.lifecycle(), Lifecycle::Uninitialized);
    }

    #[test]
    fn frame_calls_before_initialize_are_ignored() {
        let mut r = renderer();
        r.clear(Vec4::new(0.2, 0.4, 0.8, 1.0));
        r.flush(&Mat4::IDENTITY, &Mat4::IDENTITY);
        r.present();
        r.resize(800, 600);
        assert_eq!(r.lifecycle(), Lifecycle::Uninitialized);
    }

    #[test]
    fn invalid_window_fails_without_panicking() {
        let mut r = renderer();
        let result = r.initialize(&foreign_target());
        assert!(matches!(result, Err(RenderError::Context(_))));
        assert!(!r.lifecycle().is_initialized());

        r.destroy();
        r.destroy();
        r.clear(Vec4::ONE);
        r.present();
    }

    #[cfg(any(target_os = "linux", target_os = "windows"))]
    fn hidden_window_loop() -> winit::event_loop::EventLoop<()> {
        let mut builder = winit::event_loop::EventLoop::builder();
        #[cfg(target_os = "linux")]
        {
            use winit::platform::x11::EventLoopBuilderExtX11;
            builder.with_any_thread(true);
        }
        #[cfg(target_os = "windows")]
        {
            use winit::platform::windows::EventLoopBuilderExtWindows;
            builder.with_any_thread(true);
        }
        builder.build().unwrap()
    }

    // winit only allows event loops off the main thread on these platforms.
    #[cfg(any(target_os = "linux", target_os = "windows"))]
    #[test]
    #[ignore = "needs a display server and an OpenGL 3.3 driver"]
    fn destroy_twice_after_successful_initialize() {
        let event_loop = hidden_window_loop();
        #[allow(deprecated)]
        let window = event_loop
            .create_window(winit::window::Window::default_attributes().with_visible(false))
            .unwrap();
        let size = window.inner_size();
        let target = SurfaceTarget::from_window(&window, size.width, size.height).unwrap();

        let config = RendererConfig {
            cube_count: 64,
            seed: Some(1),
            vsync: false,
        };
        let mut r = GlRenderer::new(AssetRoot::discover(), config);
        r.initialize(&target).unwrap();
        assert_eq!(r.lifecycle(), Lifecycle::Initialized);

        cubefield_render::draw_frame(
            &mut r,
            Vec4::new(0.2, 0.4, 0.8, 1.0),
            &Mat4::IDENTITY,
            &Mat4::IDENTITY,
        );
        let error = unsafe { r.active_context().unwrap().gl().get_error() };
        assert_eq!(error, glow::NO_ERROR);

        r.destroy();
        assert_eq!(r.lifecycle(), Lifecycle::Destroyed);
        assert!(r.program.is_none() && r.mesh.is_none() && r.context.is_none());
        r.destroy();
        assert_eq!(r.lifecycle(), Lifecycle::Destroyed);

        r.clear(Vec4::ONE);
        r.present();
        drop(r);
        drop(window);
    }
}
