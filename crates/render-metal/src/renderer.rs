use crate::layer::MetalLayer;
use crate::pipeline::{DEPTH_FORMAT, Pipeline, UNIFORM_BUFFER_INDEX, VERTEX_BUFFER_INDEX};
use cubefield_assets::AssetRoot;
use cubefield_render::{
    CubeField, DEFAULT_METAL_LIBRARY, IndexFormat, Lifecycle, RenderError, Renderer,
    RendererConfig, ShaderSource, SurfaceTarget, Uniforms,
};
use glam::{Mat4, Vec4};
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::{
    MTLBuffer, MTLClearColor, MTLCommandBuffer, MTLCommandEncoder, MTLCommandQueue,
    MTLCreateSystemDefaultDevice, MTLDevice, MTLIndexType, MTLLoadAction, MTLPrimitiveType,
    MTLRenderCommandEncoder, MTLRenderPassDescriptor, MTLResourceOptions, MTLStorageMode,
    MTLStoreAction, MTLTexture, MTLTextureDescriptor, MTLTextureUsage,
};
use objc2_quartz_core::CAMetalDrawable;
use std::ffi::c_void;
use std::ptr::NonNull;

type Device = Retained<ProtocolObject<dyn MTLDevice>>;
type Buffer = Retained<ProtocolObject<dyn MTLBuffer>>;
type Texture = Retained<ProtocolObject<dyn MTLTexture>>;

/// Static vertex + index buffers of the cube field.
struct MetalMesh {
    vertices: Buffer,
    indices: Buffer,
    index_count: usize,
    index_type: MTLIndexType,
}

/// Everything created by a successful `initialize`. Field order is release
/// order: GPU objects first, then the layer, then the device.
struct DeviceResources {
    depth: Texture,
    mesh: MetalMesh,
    pipeline: Pipeline,
    queue: Retained<ProtocolObject<dyn MTLCommandQueue>>,
    layer: MetalLayer,
    device: Device,
}

/// Frame between `clear` and `present`.
struct PendingFrame {
    drawable: Retained<ProtocolObject<dyn CAMetalDrawable>>,
    clear_color: Vec4,
    commands: Option<Retained<ProtocolObject<dyn MTLCommandBuffer>>>,
}

/// Metal backend.
///
/// `clear` acquires the next drawable and records the clear color, `flush`
/// encodes the clear plus the indexed draw, `present` schedules the drawable
/// and commits.
pub struct MetalRenderer {
    assets: AssetRoot,
    config: RendererConfig,
    state: Lifecycle,
    frame: Option<PendingFrame>,
    resources: Option<DeviceResources>,
}

impl MetalRenderer {
    pub fn new(assets: AssetRoot, config: RendererConfig) -> Self {
        Self {
            assets,
            config,
            state: Lifecycle::Uninitialized,
            frame: None,
            resources: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    fn try_initialize(&self, target: &SurfaceTarget) -> Result<DeviceResources, RenderError> {
        if !matches!(
            target.window,
            cubefield_render::raw_window_handle::RawWindowHandle::AppKit(_)
        ) {
            return Err(RenderError::InvalidWindow(
                "Metal needs an AppKit window".into(),
            ));
        }

        let device = MTLCreateSystemDefaultDevice()
            .ok_or_else(|| RenderError::Context("no Metal device available".into()))?;
        tracing::info!("Metal device: {}", device.name());

        let layer = MetalLayer::attach(target, &device, self.config.vsync)?;
        let queue = device
            .newCommandQueue()
            .ok_or_else(|| RenderError::Context("command queue creation failed".into()))?;

        let pipeline = self.setup_default_shaders(&device)?;
        let mesh = self.create_cube_mesh(&device)?;
        let depth = depth_texture(&device, target.width, target.height)?;

        Ok(DeviceResources {
            depth,
            mesh,
            pipeline,
            queue,
            layer,
            device,
        })
    }

    fn setup_default_shaders(&self, device: &Device) -> Result<Pipeline, RenderError> {
        let source = ShaderSource::new(
            DEFAULT_METAL_LIBRARY,
            self.assets.load_text(DEFAULT_METAL_LIBRARY),
        )?;
        let pipeline = Pipeline::build(device, &source)?;
        tracing::info!("default Metal pipeline built");
        Ok(pipeline)
    }

    fn create_cube_mesh(&self, device: &Device) -> Result<MetalMesh, RenderError> {
        let seed = self.config.mesh_seed();
        tracing::debug!("generating {} cubes with seed {seed}", self.config.cube_count);
        let field = CubeField::generate(self.config.cube_count, seed)?;
        let indices = field.index_data();

        let mesh = MetalMesh {
            vertices: buffer_with_bytes(device, field.vertex_bytes(), "vertex")?,
            indices: buffer_with_bytes(device, indices.as_bytes(), "index")?,
            index_count: field.index_count(),
            index_type: match indices.format() {
                IndexFormat::U16 => MTLIndexType::UInt16,
                IndexFormat::U32 => MTLIndexType::UInt32,
            },
        };
        tracing::info!(
            "created cube mesh with {} vertices and {} indices",
            field.vertex_count(),
            field.index_count()
        );
        Ok(mesh)
    }

    /// Encode one pass into a fresh command buffer: clear, then draw when
    /// uniforms are given.
    fn encode(
        resources: &DeviceResources,
        frame: &PendingFrame,
        uniforms: Option<&Uniforms>,
    ) -> Option<Retained<ProtocolObject<dyn MTLCommandBuffer>>> {
        let commands = resources.queue.commandBuffer()?;
        let pass = MTLRenderPassDescriptor::new();
        unsafe {
            let color = pass.colorAttachments().objectAtIndexedSubscript(0);
            color.setTexture(Some(&frame.drawable.texture()));
            color.setLoadAction(MTLLoadAction::Clear);
            color.setStoreAction(MTLStoreAction::Store);
            color.setClearColor(MTLClearColor {
                red: frame.clear_color.x as f64,
                green: frame.clear_color.y as f64,
                blue: frame.clear_color.z as f64,
                alpha: frame.clear_color.w as f64,
            });

            let depth = pass.depthAttachment();
            depth.setTexture(Some(&resources.depth));
            depth.setLoadAction(MTLLoadAction::Clear);
            depth.setStoreAction(MTLStoreAction::DontCare);
            depth.setClearDepth(1.0);
        }

        let encoder = commands.renderCommandEncoderWithDescriptor(&pass)?;
        if let Some(uniforms) = uniforms {
            let mesh = &resources.mesh;
            encoder.setRenderPipelineState(&resources.pipeline.state);
            encoder.setDepthStencilState(Some(&resources.pipeline.depth));
            unsafe {
                encoder.setVertexBuffer_offset_atIndex(
                    Some(&mesh.vertices),
                    0,
                    VERTEX_BUFFER_INDEX,
                );
                encoder.setVertexBytes_length_atIndex(
                    NonNull::from(uniforms).cast::<c_void>(),
                    std::mem::size_of::<Uniforms>(),
                    UNIFORM_BUFFER_INDEX,
                );
                encoder.drawIndexedPrimitives_indexCount_indexType_indexBuffer_indexBufferOffset(
                    MTLPrimitiveType::Triangle,
                    mesh.index_count,
                    mesh.index_type,
                    &mesh.indices,
                    0,
                );
            }
        }
        encoder.endEncoding();
        Some(commands)
    }

    fn active(&self) -> Option<&DeviceResources> {
        if !self.state.is_initialized() {
            return None;
        }
        self.resources.as_ref()
    }
}

impl Renderer for MetalRenderer {
    fn name(&self) -> &'static str {
        "Metal"
    }

    fn initialize(&mut self, target: &SurfaceTarget) -> Result<(), RenderError> {
        if self.state.is_initialized() {
            tracing::warn!("Metal renderer already initialized, recreating");
            self.destroy();
        }

        // Partially built resources are dropped inside `try_initialize`.
        match self.try_initialize(target) {
            Ok(resources) => {
                self.resources = Some(resources);
                self.state = Lifecycle::Initialized;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Metal renderer initialization failed: {e}");
                self.destroy();
                Err(e)
            }
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if !self.state.is_initialized() {
            return;
        }
        let Some(resources) = self.resources.as_mut() else {
            return;
        };
        resources.layer.resize(width, height);
        match depth_texture(&resources.device, width, height) {
            Ok(depth) => resources.depth = depth,
            Err(e) => tracing::error!("depth texture resize failed: {e}"),
        }
    }

    fn clear(&mut self, color: Vec4) {
        let Some(resources) = self.active() else {
            return;
        };
        let Some(drawable) = resources.layer.next_drawable() else {
            tracing::warn!("no drawable available, skipping frame");
            self.frame = None;
            return;
        };
        if self.frame.is_some() {
            tracing::debug!("previous frame was never presented, dropping it");
        }
        self.frame = Some(PendingFrame {
            drawable,
            clear_color: color,
            commands: None,
        });
    }

    fn flush(&mut self, view: &Mat4, projection: &Mat4) {
        let Some(resources) = self.active() else {
            return;
        };
        let Some(frame) = self.frame.as_ref() else {
            return;
        };
        let uniforms = Uniforms::new(view, projection);
        let commands = Self::encode(resources, frame, Some(&uniforms));
        if let Some(frame) = self.frame.as_mut() {
            frame.commands = commands;
        }
    }

    fn present(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        let Some(resources) = self.active() else {
            return;
        };
        // A frame without `flush` still shows its clear color.
        let commands = match frame.commands.clone() {
            Some(commands) => Some(commands),
            None => Self::encode(resources, &frame, None),
        };
        let Some(commands) = commands else {
            tracing::error!("could not encode frame");
            return;
        };
        commands.presentDrawable(ProtocolObject::from_ref(&*frame.drawable));
        commands.commit();
    }

    fn destroy(&mut self) {
        self.frame = None;
        if self.resources.take().is_some() {
            tracing::debug!("Metal renderer destroyed");
        }
        if self.state != Lifecycle::Uninitialized {
            self.state = Lifecycle::Destroyed;
        }
    }
}

impl Drop for MetalRenderer {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn buffer_with_bytes(device: &Device, bytes: &[u8], what: &str) -> Result<Buffer, RenderError> {
    let pointer = NonNull::new(bytes.as_ptr().cast_mut().cast::<c_void>())
        .filter(|_| !bytes.is_empty())
        .ok_or_else(|| RenderError::Resource(format!("empty {what} data")))?;
    unsafe {
        device.newBufferWithBytes_length_options(
            pointer,
            bytes.len(),
            MTLResourceOptions::StorageModeShared,
        )
    }
    .ok_or_else(|| RenderError::Resource(format!("{what} buffer of {} bytes", bytes.len())))
}

fn depth_texture(device: &Device, width: u32, height: u32) -> Result<Texture, RenderError> {
    let descriptor = unsafe {
        MTLTextureDescriptor::texture2DDescriptorWithPixelFormat_width_height_mipmapped(
            DEPTH_FORMAT,
            width.max(1) as usize,
            height.max(1) as usize,
            false,
        )
    };
    descriptor.setUsage(MTLTextureUsage::RenderTarget);
    descriptor.setStorageMode(MTLStorageMode::Private);
    device
        .newTextureWithDescriptor(&descriptor)
        .ok_or_else(|| RenderError::Resource("depth texture".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_render::raw_window_handle::{
        RawDisplayHandle, RawWindowHandle, WebDisplayHandle, WebWindowHandle,
    };

    fn renderer() -> MetalRenderer {
        let dir = tempfile::tempdir().unwrap();
        MetalRenderer::new(AssetRoot::new(dir.path()), RendererConfig::default())
    }

    #[test]
    fn destroy_is_idempotent() {
        let mut r = renderer();
        r.destroy();
        r.destroy();
        assert_eq!(r.lifecycle(), Lifecycle::Uninitialized);
    }

    #[test]
    fn non_appkit_window_is_rejected() {
        let mut r = renderer();
        let target = SurfaceTarget::new(
            RawWindowHandle::Web(WebWindowHandle::new(3)),
            RawDisplayHandle::Web(WebDisplayHandle::new()),
            800,
            600,
        );
        let result = r.initialize(&target);
        assert!(matches!(result, Err(RenderError::InvalidWindow(_))));
        assert!(!r.lifecycle().is_initialized());
        r.clear(Vec4::ONE);
        r.flush(&Mat4::IDENTITY, &Mat4::IDENTITY);
        r.present();
        r.destroy();
        r.destroy();
    }
}
