use bytemuck::{Pod, Zeroable};
use crate::renderer::RenderError;
use glam::{Mat4, Vec3};
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of cubes in the default scene.
pub const DEFAULT_CUBE_COUNT: usize = 10_000;

pub const VERTICES_PER_CUBE: usize = 8;
pub const INDICES_PER_CUBE: usize = 36;

/// Largest field whose index count still fits a signed 32-bit draw count.
/// Vertex indices (8N) then fit in `u32` as well.
pub const MAX_CUBE_COUNT: usize = i32::MAX as usize / INDICES_PER_CUBE;

/// Unit cube corner offsets around the cube center.
#[rustfmt::skip]
const CUBE_CORNERS: [[f32; 3]; VERTICES_PER_CUBE] = [
    [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
    [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
];

/// Cycled by corner index mod 4.
const CUBE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Twelve triangles over the eight corners, counter-clockwise from outside.
#[rustfmt::skip]
const CUBE_INDICES: [u32; INDICES_PER_CUBE] = [
    0, 1, 2, 2, 3, 0, // +Z
    1, 5, 6, 6, 2, 1, // +X
    5, 4, 7, 7, 6, 5, // -Z
    4, 0, 3, 3, 7, 4, // -X
    3, 2, 6, 6, 7, 3, // +Y
    4, 5, 1, 1, 0, 4, // -Y
];

/// Interleaved vertex: position, color, uv. Tightly packed, 32 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

/// One float attribute of [`Vertex`] as seen by a vertex shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub offset: usize,
}

impl Vertex {
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();

    pub const ATTRIBUTES: [VertexAttribute; 3] = [
        VertexAttribute {
            location: 0,
            components: 3,
            offset: std::mem::offset_of!(Vertex, position),
        },
        VertexAttribute {
            location: 1,
            components: 3,
            offset: std::mem::offset_of!(Vertex, color),
        },
        VertexAttribute {
            location: 2,
            components: 2,
            offset: std::mem::offset_of!(Vertex, uv),
        },
    ];
}

/// Per-draw shader inputs. `model` is always identity in this scene.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl Uniforms {
    pub fn new(view: &Mat4, projection: &Mat4) -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }
}

/// Axis-aligned volume cube centers are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(-25.0, -25.0, -50.0),
            max: Vec3::new(25.0, 25.0, 0.0),
        }
    }
}

/// Width of the index buffer handed to the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    pub fn size(self) -> usize {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// Index data narrowed to its [`IndexFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum IndexData {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexData {
    pub fn format(&self) -> IndexFormat {
        match self {
            IndexData::U16(_) => IndexFormat::U16,
            IndexData::U32(_) => IndexFormat::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexData::U16(v) => v.len(),
            IndexData::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexData::U16(v) => bytemuck::cast_slice(v),
            IndexData::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// The static scene: many unit cubes at random positions with random colors,
/// flattened into one vertex/index buffer pair.
#[derive(Debug, Clone, Default)]
pub struct CubeField {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl CubeField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate `count` cubes inside the default bounds.
    pub fn generate(count: usize, seed: u64) -> Result<Self, RenderError> {
        Self::generate_in(count, seed, FieldBounds::default())
    }

    /// Generate `count` cubes inside `bounds`. Same seed, same field.
    ///
    /// `count` must lie in `1..=MAX_CUBE_COUNT`; both backends reject an
    /// empty scene the same way.
    pub fn generate_in(
        count: usize,
        seed: u64,
        bounds: FieldBounds,
    ) -> Result<Self, RenderError> {
        check_cube_count(count)?;
        let mut rng = SplitMix64::new(seed);
        let mut field = Self {
            vertices: Vec::with_capacity(count * VERTICES_PER_CUBE),
            indices: Vec::with_capacity(count * INDICES_PER_CUBE),
        };
        let extent = bounds.max - bounds.min;
        for _ in 0..count {
            let center = bounds.min
                + Vec3::new(
                    rng.next_f32() * extent.x,
                    rng.next_f32() * extent.y,
                    rng.next_f32() * extent.z,
                );
            let color = Vec3::new(rng.next_f32(), rng.next_f32(), rng.next_f32());
            field.push_cube(center, color);
        }
        Ok(field)
    }

    /// Append one cube. Its indices reference only the eight vertices it
    /// pushes, offset by the vertex count before the push.
    fn push_cube(&mut self, center: Vec3, color: Vec3) {
        let base = self.vertices.len() as u32;
        for (i, corner) in CUBE_CORNERS.iter().enumerate() {
            self.vertices.push(Vertex {
                position: (center + Vec3::from_array(*corner)).to_array(),
                color: color.to_array(),
                uv: CUBE_UVS[i % CUBE_UVS.len()],
            });
        }
        self.indices
            .extend(CUBE_INDICES.iter().map(|local| base + local));
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn cube_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_CUBE
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// 16-bit while every vertex is addressable with 16 bits, else 32-bit.
    pub fn index_format(&self) -> IndexFormat {
        if self.vertices.len() <= usize::from(u16::MAX) + 1 {
            IndexFormat::U16
        } else {
            IndexFormat::U32
        }
    }

    pub fn index_data(&self) -> IndexData {
        match self.index_format() {
            IndexFormat::U16 => IndexData::U16(self.indices.iter().map(|&i| i as u16).collect()),
            IndexFormat::U32 => IndexData::U32(self.indices.clone()),
        }
    }
}

/// Validate a requested cube count before anything is allocated.
pub fn check_cube_count(count: usize) -> Result<usize, RenderError> {
    if count == 0 {
        tracing::error!("cube count must be at least 1");
        return Err(RenderError::Resource("empty cube field".into()));
    }
    if count > MAX_CUBE_COUNT {
        tracing::error!("{count} cubes exceed the limit of {MAX_CUBE_COUNT}");
        return Err(RenderError::Resource(format!(
            "{count} cubes exceed the limit of {MAX_CUBE_COUNT}"
        )));
    }
    Ok(count)
}

/// Seed derived from the current wall-clock time, so runs usually differ.
pub fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// SplitMix64 generator: small, fast and reproducible across platforms.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits fill the f32 mantissa exactly.
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}
