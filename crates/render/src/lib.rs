//! Shared core of the cube-field renderer, independent of any graphics API.
//!
//! Holds everything the backends share: the first-person [`Camera`], the
//! [`Renderer`] contract, the procedurally generated [`CubeField`] and the
//! frame sequencing helper [`draw_frame`].
//!
//! # Invariants
//! - Per frame: `clear` → `flush` → `present`, once each.
//! - Every mesh index refers to a vertex pushed by the same cube.
//! - A field holds between 1 and [`MAX_CUBE_COUNT`] cubes.
//! - The model matrix is identity; backends only receive view and projection.

mod camera;
mod frame;
mod mesh;
mod renderer;
mod shader;

pub use camera::{Camera, FOV_Y_DEGREES, PITCH_LIMIT, PITCH_MARGIN, Z_FAR, Z_NEAR};
pub use frame::draw_frame;
pub use mesh::{
    CubeField, DEFAULT_CUBE_COUNT, FieldBounds, INDICES_PER_CUBE, IndexData, IndexFormat,
    MAX_CUBE_COUNT, SplitMix64, Uniforms, VERTICES_PER_CUBE, Vertex, VertexAttribute,
    check_cube_count, wall_clock_seed,
};
pub use renderer::{Lifecycle, RenderError, Renderer, RendererConfig, SurfaceTarget};
pub use shader::{
    DEFAULT_FRAGMENT_SHADER, DEFAULT_METAL_LIBRARY, DEFAULT_VERTEX_SHADER, ShaderSource,
    ShaderStage, UNIFORM_MODEL, UNIFORM_PROJECTION, UNIFORM_VIEW,
};

pub use glam::{Mat4, Vec3, Vec4};
pub use raw_window_handle;
