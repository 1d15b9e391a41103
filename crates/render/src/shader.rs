use crate::renderer::RenderError;
use std::fmt;

/// Relative asset paths of the default shaders.
pub const DEFAULT_VERTEX_SHADER: &str = "shaders/default.vert";
pub const DEFAULT_FRAGMENT_SHADER: &str = "shaders/default.frag";
pub const DEFAULT_METAL_LIBRARY: &str = "shaders/default.metal";

/// Uniform names of the `u` struct in the default GLSL program.
pub const UNIFORM_MODEL: &str = "u.model";
pub const UNIFORM_VIEW: &str = "u.view";
pub const UNIFORM_PROJECTION: &str = "u.projection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Non-empty shader text plus a label for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    label: String,
    text: String,
}

impl ShaderSource {
    /// Rejects empty or whitespace-only text. A missing shader file loads as
    /// an empty string, so this is where it stops before reaching the GPU.
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Result<Self, RenderError> {
        let label = label.into();
        let text = text.into();
        if text.trim().is_empty() {
            tracing::error!("shader source '{label}' is empty");
            return Err(RenderError::EmptyShaderSource(label));
        }
        Ok(Self { label, text })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
