//! Metal render backend (macOS only).
//!
//! Attaches a `CAMetalLayer` to the window's `NSView`, builds the default
//! pipeline from `shaders/default.metal`, uploads the cube field into shared
//! buffers and encodes one indexed draw per frame.
//!
//! On other targets this crate is empty; the driver never selects it there.
//!
//! # Invariants
//! - Same mesh, uniforms and draw order as the OpenGL backend.
//! - Every native handle is a `Retained` owned by one renderer instance and
//!   released on `destroy`, on drop, and on any `initialize` failure.

#[cfg(target_os = "macos")]
mod layer;
#[cfg(target_os = "macos")]
mod pipeline;
#[cfg(target_os = "macos")]
mod renderer;

#[cfg(target_os = "macos")]
pub use renderer::MetalRenderer;

// MTLCreateSystemDefaultDevice returns nil unless CoreGraphics is linked.
#[cfg(target_os = "macos")]
#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {}
