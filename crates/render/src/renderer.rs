use crate::mesh::DEFAULT_CUBE_COUNT;
use crate::shader::ShaderStage;
use glam::{Mat4, Vec4};
use raw_window_handle::{
    HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle,
};

/// Errors from backend initialization.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid window handle: {0}")]
    InvalidWindow(String),
    #[error("graphics context creation failed: {0}")]
    Context(String),
    #[error("shader source '{0}' is empty")]
    EmptyShaderSource(String),
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program link failed: {0}")]
    Link(String),
    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
    #[error("GPU resource allocation failed: {0}")]
    Resource(String),
    #[error("{0} backend is not available on this platform")]
    Unsupported(&'static str),
}

impl From<HandleError> for RenderError {
    fn from(e: HandleError) -> Self {
        RenderError::InvalidWindow(e.to_string())
    }
}

/// Window surface a backend binds its context or device to.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceTarget {
    pub window: RawWindowHandle,
    pub display: RawDisplayHandle,
    pub width: u32,
    pub height: u32,
}

impl SurfaceTarget {
    pub fn new(window: RawWindowHandle, display: RawDisplayHandle, width: u32, height: u32) -> Self {
        Self {
            window,
            display,
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn from_window<W>(window: &W, width: u32, height: u32) -> Result<Self, RenderError>
    where
        W: HasWindowHandle + HasDisplayHandle + ?Sized,
    {
        let raw_window = window.window_handle()?.as_raw();
        let raw_display = window.display_handle()?.as_raw();
        Ok(Self::new(raw_window, raw_display, width, height))
    }
}

/// Backend settings chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererConfig {
    pub cube_count: usize,
    /// Fixed mesh seed; `None` seeds from the wall clock.
    pub seed: Option<u64>,
    pub vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            cube_count: DEFAULT_CUBE_COUNT,
            seed: None,
            vsync: false,
        }
    }
}

impl RendererConfig {
    pub fn mesh_seed(&self) -> u64 {
        self.seed.unwrap_or_else(crate::mesh::wall_clock_seed)
    }
}

/// Backend lifecycle. Frame calls only act in `Initialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Initialized,
    Destroyed,
}

impl Lifecycle {
    pub fn is_initialized(self) -> bool {
        self == Lifecycle::Initialized
    }
}

/// Renderer-agnostic interface. All backends implement this trait.
///
/// Per frame the driver calls `clear`, `flush` and `present`, exactly once
/// each and in that order (see [`crate::draw_frame`]). Out-of-order calls may
/// draw garbage but never corrupt backend state.
pub trait Renderer {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Bind to the window surface, build the default pipeline and upload the
    /// static mesh. On error everything acquired so far is already released.
    fn initialize(&mut self, target: &SurfaceTarget) -> Result<(), RenderError>;

    /// Track a new drawable size in pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Clear color and depth of the current frame.
    fn clear(&mut self, color: Vec4);

    /// Draw the whole mesh with the given camera matrices (model = identity).
    fn flush(&mut self, view: &Mat4, projection: &Mat4);

    /// Present the finished frame.
    fn present(&mut self);

    /// Release every GPU resource. Safe to call repeatedly.
    fn destroy(&mut self);
}
