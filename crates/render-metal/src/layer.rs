use cubefield_render::raw_window_handle::RawWindowHandle;
use cubefield_render::{RenderError, SurfaceTarget};
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_app_kit::NSView;
use objc2_core_foundation::CGSize;
use objc2_metal::{MTLDevice, MTLPixelFormat};
use objc2_quartz_core::{CAMetalDrawable, CAMetalLayer};

pub(crate) const COLOR_FORMAT: MTLPixelFormat = MTLPixelFormat::BGRA8Unorm;

/// A `CAMetalLayer` installed as the backing layer of the window's view.
/// Dropping it detaches the layer again.
pub(crate) struct MetalLayer {
    layer: Retained<CAMetalLayer>,
    view: Retained<NSView>,
}

impl MetalLayer {
    pub(crate) fn attach(
        target: &SurfaceTarget,
        device: &ProtocolObject<dyn MTLDevice>,
        vsync: bool,
    ) -> Result<Self, RenderError> {
        let RawWindowHandle::AppKit(handle) = target.window else {
            return Err(RenderError::InvalidWindow(format!(
                "Metal needs an AppKit window, got {:?}",
                target.window
            )));
        };

        // SAFETY: the handle points at the live NSView of the driver's window,
        // and winit delivers events on the main thread.
        let view = unsafe { Retained::retain(handle.ns_view.as_ptr().cast::<NSView>()) }
            .ok_or_else(|| RenderError::InvalidWindow("null NSView".into()))?;

        let layer = CAMetalLayer::new();
        unsafe {
            layer.setDevice(Some(device));
            layer.setPixelFormat(COLOR_FORMAT);
            layer.setFramebufferOnly(true);
            layer.setDisplaySyncEnabled(vsync);
            layer.setDrawableSize(CGSize::new(target.width as f64, target.height as f64));
            view.setWantsLayer(true);
            view.setLayer(Some(&layer));
        }

        Ok(Self { layer, view })
    }

    pub(crate) fn resize(&self, width: u32, height: u32) {
        unsafe {
            self.layer
                .setDrawableSize(CGSize::new(width.max(1) as f64, height.max(1) as f64));
        }
    }

    pub(crate) fn next_drawable(&self) -> Option<Retained<ProtocolObject<dyn CAMetalDrawable>>> {
        unsafe { self.layer.nextDrawable() }
    }
}

impl Drop for MetalLayer {
    fn drop(&mut self) {
        unsafe { self.view.setLayer(None) };
    }
}
