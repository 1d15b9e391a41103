use cubefield_render::{
    RenderError, ShaderSource, ShaderStage, UNIFORM_MODEL, UNIFORM_PROJECTION, UNIFORM_VIEW,
    Uniforms,
};
use glow::HasContext;

/// Locations of the `u.model`, `u.view` and `u.projection` uniforms.
/// A missing location makes the matching upload a no-op.
#[derive(Debug, Default)]
pub(crate) struct UniformLocations {
    model: Option<glow::UniformLocation>,
    view: Option<glow::UniformLocation>,
    projection: Option<glow::UniformLocation>,
}

impl UniformLocations {
    fn resolve(gl: &glow::Context, program: glow::Program) -> Self {
        let locations = unsafe {
            Self {
                model: gl.get_uniform_location(program, UNIFORM_MODEL),
                view: gl.get_uniform_location(program, UNIFORM_VIEW),
                projection: gl.get_uniform_location(program, UNIFORM_PROJECTION),
            }
        };
        let missing = locations.missing();
        if !missing.is_empty() {
            tracing::warn!("uniforms not found in shader: {}", missing.join(", "));
        }
        locations
    }

    pub(crate) fn missing(&self) -> Vec<&'static str> {
        [
            (UNIFORM_MODEL, self.model.is_some()),
            (UNIFORM_VIEW, self.view.is_some()),
            (UNIFORM_PROJECTION, self.projection.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, found)| (!found).then_some(name))
        .collect()
    }
}

/// Linked vertex + fragment program with its uniform locations.
pub(crate) struct ShaderProgram {
    program: glow::Program,
    uniforms: UniformLocations,
}

impl ShaderProgram {
    /// Compile both stages and link them. Intermediate shader objects are
    /// deleted on every path; a failed link deletes the program.
    pub(crate) fn build(
        gl: &glow::Context,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<Self, RenderError> {
        let vs = compile_shader(gl, ShaderStage::Vertex, vertex)?;
        let fs = match compile_shader(gl, ShaderStage::Fragment, fragment) {
            Ok(fs) => fs,
            Err(e) => {
                unsafe { gl.delete_shader(vs) };
                return Err(e);
            }
        };

        let linked = link_program(gl, vs, fs);
        unsafe {
            gl.delete_shader(vs);
            gl.delete_shader(fs);
        }
        let program = linked?;

        let uniforms = UniformLocations::resolve(gl, program);
        Ok(Self { program, uniforms })
    }

    pub(crate) fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
    }

    /// Upload all three matrices. The program must be bound.
    pub(crate) fn set_uniforms(&self, gl: &glow::Context, uniforms: &Uniforms) {
        unsafe {
            gl.uniform_matrix_4_f32_slice(
                self.uniforms.model.as_ref(),
                false,
                uniforms.model.as_flattened(),
            );
            gl.uniform_matrix_4_f32_slice(
                self.uniforms.view.as_ref(),
                false,
                uniforms.view.as_flattened(),
            );
            gl.uniform_matrix_4_f32_slice(
                self.uniforms.projection.as_ref(),
                false,
                uniforms.projection.as_flattened(),
            );
        }
    }

    pub(crate) fn delete(self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }
}

fn stage_kind(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn compile_shader(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &ShaderSource,
) -> Result<glow::Shader, RenderError> {
    unsafe {
        let shader = gl
            .create_shader(stage_kind(stage))
            .map_err(RenderError::Resource)?;
        gl.shader_source(shader, source.text());
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            tracing::error!(
                "{stage} shader '{}' failed to compile: {}",
                source.label(),
                log.trim()
            );
            gl.delete_shader(shader);
            return Err(RenderError::ShaderCompile { stage, log });
        }
        Ok(shader)
    }
}

fn link_program(
    gl: &glow::Context,
    vs: glow::Shader,
    fs: glow::Shader,
) -> Result<glow::Program, RenderError> {
    unsafe {
        let program = gl.create_program().map_err(RenderError::Resource)?;
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            tracing::error!("shader program failed to link: {}", log.trim());
            gl.delete_program(program);
            return Err(RenderError::Link(log));
        }
        Ok(program)
    }
}
