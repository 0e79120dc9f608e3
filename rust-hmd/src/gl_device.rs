use gleam::gl;
use gleam::gl::Gl;
use rust_hmd_api::{GraphicsDevice, VRViewport};
use std::cell::Cell;
use std::rc::Rc;

/// `GraphicsDevice` on top of a gleam GL function table.
///
/// The window system owns the context; `make_current` is the embedder's hook
/// to make it current on the render thread.
pub struct GleamDevice {
    gl: Rc<dyn Gl>,
    make_current: Box<dyn Fn() -> bool>,
    current: Cell<bool>,
}

impl GleamDevice {
    pub fn new<F>(gl: Rc<dyn Gl>, make_current: F) -> GleamDevice where F: Fn() -> bool + 'static {
        GleamDevice {
            gl: gl,
            make_current: Box::new(make_current),
            current: Cell::new(false),
        }
    }
}

impl GraphicsDevice for GleamDevice {
    fn make_current(&self) -> bool {
        let current = (self.make_current)();
        if !current {
            error!("Failed to make the GL context current");
        }
        self.current.set(current);
        current
    }

    fn is_current(&self) -> bool {
        self.current.get()
    }

    fn create_framebuffer(&self) -> u32 {
        self.gl.gen_framebuffers(1)[0]
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.gl.delete_framebuffers(&[framebuffer]);
    }

    fn bind_framebuffer(&self, framebuffer: u32) {
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, framebuffer);
    }

    fn create_depth_renderbuffer(&self, width: u32, height: u32) -> u32 {
        let renderbuffer = self.gl.gen_renderbuffers(1)[0];
        self.gl.bind_renderbuffer(gl::RENDERBUFFER, renderbuffer);
        self.gl.renderbuffer_storage(gl::RENDERBUFFER, gl::DEPTH24_STENCIL8,
                                     width as gl::GLsizei, height as gl::GLsizei);
        self.gl.bind_renderbuffer(gl::RENDERBUFFER, 0);
        renderbuffer
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        self.gl.delete_renderbuffers(&[renderbuffer]);
    }

    fn create_color_texture(&self, width: u32, height: u32) -> u32 {
        let texture = self.gl.gen_textures(1)[0];
        self.gl.bind_texture(gl::TEXTURE_2D, texture);
        self.gl.tex_image_2d(gl::TEXTURE_2D, 0, gl::RGBA8 as gl::GLint,
                             width as gl::GLsizei, height as gl::GLsizei, 0,
                             gl::RGBA, gl::UNSIGNED_BYTE, None);
        self.gl.bind_texture(gl::TEXTURE_2D, 0);
        texture
    }

    fn delete_texture(&self, texture: u32) {
        self.gl.delete_textures(&[texture]);
    }

    fn configure_texture(&self, texture: u32) {
        self.gl.bind_texture(gl::TEXTURE_2D, texture);
        self.gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as gl::GLint);
        self.gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as gl::GLint);
        self.gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as gl::GLint);
        self.gl.tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as gl::GLint);
        self.gl.bind_texture(gl::TEXTURE_2D, 0);
    }

    fn attach_color_texture(&self, framebuffer: u32, texture: u32) {
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, framebuffer);
        self.gl.framebuffer_texture_2d(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0, gl::TEXTURE_2D, texture, 0);
    }

    fn attach_depth_renderbuffer(&self, framebuffer: u32, renderbuffer: u32) {
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, framebuffer);
        self.gl.framebuffer_renderbuffer(gl::FRAMEBUFFER, gl::DEPTH_STENCIL_ATTACHMENT,
                                         gl::RENDERBUFFER, renderbuffer);
    }

    fn is_framebuffer_complete(&self, framebuffer: u32) -> bool {
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, framebuffer);
        let status = self.gl.check_frame_buffer_status(gl::FRAMEBUFFER);
        if status != gl::FRAMEBUFFER_COMPLETE {
            warn!("Framebuffer {} incomplete: 0x{:x}", framebuffer, status);
            return false;
        }
        true
    }

    fn set_viewport(&self, viewport: &VRViewport) {
        self.gl.viewport(viewport.x, viewport.y, viewport.width, viewport.height);
    }
}
