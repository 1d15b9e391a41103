use crate::renderer::Renderer;
use glam::{Mat4, Vec4};

/// Render one frame: `clear`, `flush`, `present`, in that order.
pub fn draw_frame<R>(renderer: &mut R, clear_color: Vec4, view: &Mat4, projection: &Mat4)
where
    R: Renderer + ?Sized,
{
    renderer.clear(clear_color);
    renderer.flush(view, projection);
    renderer.present();
}
