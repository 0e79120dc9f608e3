use crate::VRViewport;
use std::rc::Rc;

pub type GraphicsDevicePtr = Rc<dyn GraphicsDevice>;

/// The GL calls backends issue on the render target.
///
/// Implementations wrap the context that owns the render loop; every call
/// must happen while that context is current.
pub trait GraphicsDevice {
    /// Makes the owned context current on the calling thread
    fn make_current(&self) -> bool;

    fn is_current(&self) -> bool;

    fn create_framebuffer(&self) -> u32;

    fn delete_framebuffer(&self, framebuffer: u32);

    /// Binds `framebuffer` for drawing, 0 restores the default one
    fn bind_framebuffer(&self, framebuffer: u32);

    /// Allocates a DEPTH24_STENCIL8 renderbuffer
    fn create_depth_renderbuffer(&self, width: u32, height: u32) -> u32;

    fn delete_renderbuffer(&self, renderbuffer: u32);

    /// Allocates an RGBA8 texture
    fn create_color_texture(&self, width: u32, height: u32) -> u32;

    fn delete_texture(&self, texture: u32);

    /// Linear filtering and clamp-to-edge wrapping
    fn configure_texture(&self, texture: u32);

    fn attach_color_texture(&self, framebuffer: u32, texture: u32);

    fn attach_depth_renderbuffer(&self, framebuffer: u32, renderbuffer: u32);

    fn is_framebuffer_complete(&self, framebuffer: u32) -> bool;

    fn set_viewport(&self, viewport: &VRViewport);
}
