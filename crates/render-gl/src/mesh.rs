use cubefield_render::{CubeField, IndexFormat, RenderError, Vertex};
use glow::HasContext;

/// Static vertex array + vertex/index buffers holding the whole cube field.
pub(crate) struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: i32,
    index_type: u32,
}

impl GpuMesh {
    /// Upload the field once as `STATIC_DRAW` buffers. Objects created before
    /// a failure are deleted before returning the error.
    pub(crate) fn upload(gl: &glow::Context, field: &CubeField) -> Result<Self, RenderError> {
        let index_count = i32::try_from(field.index_count()).map_err(|_| {
            RenderError::Resource(format!("{} indices exceed GL limits", field.index_count()))
        })?;
        let indices = field.index_data();

        unsafe {
            let vao = gl.create_vertex_array().map_err(RenderError::Resource)?;
            let vbo = match gl.create_buffer() {
                Ok(b) => b,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(RenderError::Resource(e));
                }
            };
            let ebo = match gl.create_buffer() {
                Ok(b) => b,
                Err(e) => {
                    gl.delete_buffer(vbo);
                    gl.delete_vertex_array(vao);
                    return Err(RenderError::Resource(e));
                }
            };

            gl.bind_vertex_array(Some(vao));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, field.vertex_bytes(), glow::STATIC_DRAW);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                indices.as_bytes(),
                glow::STATIC_DRAW,
            );

            for attribute in Vertex::ATTRIBUTES {
                gl.enable_vertex_attrib_array(attribute.location);
                gl.vertex_attrib_pointer_f32(
                    attribute.location,
                    attribute.components as i32,
                    glow::FLOAT,
                    false,
                    Vertex::STRIDE as i32,
                    attribute.offset as i32,
                );
            }

            gl.bind_vertex_array(None);

            tracing::info!(
                "created cube mesh with {} vertices and {} indices",
                field.vertex_count(),
                field.index_count()
            );

            Ok(Self {
                vao,
                vbo,
                ebo,
                index_count,
                index_type: index_type(indices.format()),
            })
        }
    }

    /// One indexed triangle-list draw over every index.
    pub(crate) fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, self.index_count, self.index_type, 0);
            gl.bind_vertex_array(None);
        }
    }

    pub(crate) fn delete(self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.ebo);
            gl.delete_buffer(self.vbo);
        }
    }
}

fn index_type(format: IndexFormat) -> u32 {
    match format {
        IndexFormat::U16 => glow::UNSIGNED_SHORT,
        IndexFormat::U32 => glow::UNSIGNED_INT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_format_maps_to_gl_type() {
        assert_eq!(index_type(IndexFormat::U16), glow::UNSIGNED_SHORT);
        assert_eq!(index_type(IndexFormat::U32), glow::UNSIGNED_INT);
    }

    #[test]
    fn default_field_needs_32_bit_indices() {
        let field = CubeField::generate(cubefield_render::DEFAULT_CUBE_COUNT, 3).unwrap();
        assert_eq!(index_type(field.index_format()), glow::UNSIGNED_INT);
    }
}
