//! OpenGL render backend.
//!
//! Creates an OpenGL 3.3 context on the window through glutin, compiles the
//! default GLSL program from the asset root, uploads the cube field once and
//! draws it with a single indexed call per frame.
//!
//! # Invariants
//! - All GL calls go through the backend's own `glow::Context`.
//! - GL objects are deleted before the context that owns them.
//! - `destroy` is idempotent and runs on drop.

mod context;
mod mesh;
mod program;
mod renderer;

pub use renderer::GlRenderer;
