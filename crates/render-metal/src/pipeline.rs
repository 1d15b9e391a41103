use crate::layer::COLOR_FORMAT;
use cubefield_render::{RenderError, ShaderSource, Vertex};
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_foundation::NSString;
use objc2_metal::{
    MTLCompareFunction, MTLDepthStencilDescriptor, MTLDepthStencilState, MTLDevice, MTLFunction,
    MTLLibrary, MTLPixelFormat, MTLRenderPipelineDescriptor, MTLRenderPipelineState,
    MTLVertexDescriptor, MTLVertexFormat, MTLVertexStepFunction,
};

pub(crate) const DEPTH_FORMAT: MTLPixelFormat = MTLPixelFormat::Depth32Float;

/// Buffer argument slots of `vertex_main`.
pub(crate) const VERTEX_BUFFER_INDEX: usize = 0;
pub(crate) const UNIFORM_BUFFER_INDEX: usize = 1;

const VERTEX_FUNCTION: &str = "vertex_main";
const FRAGMENT_FUNCTION: &str = "fragment_main";

/// Render pipeline plus the depth test it draws with.
pub(crate) struct Pipeline {
    pub(crate) state: Retained<ProtocolObject<dyn MTLRenderPipelineState>>,
    pub(crate) depth: Retained<ProtocolObject<dyn MTLDepthStencilState>>,
}

impl Pipeline {
    pub(crate) fn build(
        device: &ProtocolObject<dyn MTLDevice>,
        source: &ShaderSource,
    ) -> Result<Self, RenderError> {
        let library = unsafe {
            device.newLibraryWithSource_options_error(&NSString::from_str(source.text()), None)
        }
        .map_err(|e| {
            let log = e.localizedDescription().to_string();
            tracing::error!("Metal library '{}' failed to compile: {log}", source.label());
            RenderError::Pipeline(log)
        })?;

        let vertex_fn = function(&library, VERTEX_FUNCTION)?;
        let fragment_fn = function(&library, FRAGMENT_FUNCTION)?;

        let descriptor = MTLRenderPipelineDescriptor::new();
        unsafe {
            descriptor.setVertexFunction(Some(&vertex_fn));
            descriptor.setFragmentFunction(Some(&fragment_fn));
            descriptor.setVertexDescriptor(Some(&vertex_descriptor()));
            descriptor
                .colorAttachments()
                .objectAtIndexedSubscript(0)
                .setPixelFormat(COLOR_FORMAT);
            descriptor.setDepthAttachmentPixelFormat(DEPTH_FORMAT);
        }

        let state = device
            .newRenderPipelineStateWithDescriptor_error(&descriptor)
            .map_err(|e| {
                let log = e.localizedDescription().to_string();
                tracing::error!("Metal pipeline creation failed: {log}");
                RenderError::Pipeline(log)
            })?;

        let depth_descriptor = MTLDepthStencilDescriptor::new();
        depth_descriptor.setDepthCompareFunction(MTLCompareFunction::Less);
        depth_descriptor.setDepthWriteEnabled(true);
        let depth = device
            .newDepthStencilStateWithDescriptor(&depth_descriptor)
            .ok_or_else(|| RenderError::Pipeline("depth-stencil state creation failed".into()))?;

        Ok(Self { state, depth })
    }
}

fn function(
    library: &ProtocolObject<dyn MTLLibrary>,
    name: &str,
) -> Result<Retained<ProtocolObject<dyn MTLFunction>>, RenderError> {
    library
        .newFunctionWithName(&NSString::from_str(name))
        .ok_or_else(|| {
            tracing::error!("Metal function '{name}' not found in library");
            RenderError::Pipeline(format!("missing function {name}"))
        })
}

/// position(float3), color(float3), uv(float2) interleaved in buffer 0.
fn vertex_descriptor() -> Retained<MTLVertexDescriptor> {
    let descriptor = MTLVertexDescriptor::new();
    unsafe {
        for attribute in Vertex::ATTRIBUTES {
            let slot = descriptor
                .attributes()
                .objectAtIndexedSubscript(attribute.location as usize);
            slot.setFormat(if attribute.components == 3 {
                MTLVertexFormat::Float3
            } else {
                MTLVertexFormat::Float2
            });
            slot.setOffset(attribute.offset);
            slot.setBufferIndex(VERTEX_BUFFER_INDEX);
        }
        let layout = descriptor
            .layouts()
            .objectAtIndexedSubscript(VERTEX_BUFFER_INDEX);
        layout.setStride(Vertex::STRIDE);
        layout.setStepFunction(MTLVertexStepFunction::PerVertex);
    }
    descriptor
}
