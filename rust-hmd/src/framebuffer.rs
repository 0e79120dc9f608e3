use rust_hmd_api::{GraphicsDevice, RenderTargetSize, VRError, VRViewport};

/// Offscreen target with an RGBA8 color texture and a depth-stencil buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct Framebuffer {
    framebuffer: u32,
    color_texture: u32,
    depth_renderbuffer: u32,
    size: RenderTargetSize,
}

impl Framebuffer {
    pub fn new(gl: &dyn GraphicsDevice, size: RenderTargetSize) -> Result<Framebuffer, VRError> {
        if size.is_empty() {
            return Err(VRError::Initialization(format!("empty render target {}x{}", size.width, size.height)));
        }

        let framebuffer = gl.create_framebuffer();
        let color_texture = gl.create_color_texture(size.width, size.height);
        gl.configure_texture(color_texture);
        let depth_renderbuffer = gl.create_depth_renderbuffer(size.width, size.height);
        gl.attach_color_texture(framebuffer, color_texture);
        gl.attach_depth_renderbuffer(framebuffer, depth_renderbuffer);

        let result = Framebuffer {
            framebuffer: framebuffer,
            color_texture: color_texture,
            depth_renderbuffer: depth_renderbuffer,
            size: size,
        };

        if !gl.is_framebuffer_complete(framebuffer) {
            result.delete(gl);
            return Err(VRError::Initialization("incomplete framebuffer".into()));
        }
        gl.bind_framebuffer(0);
        Ok(result)
    }

    pub fn bind(&self, gl: &dyn GraphicsDevice) {
        gl.bind_framebuffer(self.framebuffer);
        gl.set_viewport(&VRViewport::new(0, 0, self.size.width as i32, self.size.height as i32));
    }

    pub fn texture_id(&self) -> u32 {
        self.color_texture
    }

    /// Releases the GL objects. Consumes the framebuffer so it cannot be freed twice.
    pub fn delete(self, gl: &dyn GraphicsDevice) {
        gl.delete_framebuffer(self.framebuffer);
        gl.delete_texture(self.color_texture);
        gl.delete_renderbuffer(self.depth_renderbuffer);
    }
}
