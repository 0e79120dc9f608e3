use super::runtime::{OculusRuntime, Sizei, SwapChainHandle};
use rust_hmd_api::{GraphicsDevice, RenderTargetSize, VRError, VRViewport};

/// Ring of framebuffers wrapping the textures of an `ovrTextureSwapChain`.
///
/// The runtime decides which slot is writable; every bind asks it first.
/// All slots share one depth-stencil renderbuffer.
#[derive(Debug)]
pub struct OvrSwapChain {
    chain: SwapChainHandle,
    size: RenderTargetSize,
    depth_renderbuffer: u32,
    framebuffers: Vec<u32>,
}

impl OvrSwapChain {
    pub fn new(runtime: &mut dyn OculusRuntime,
               gl: &dyn GraphicsDevice,
               size: RenderTargetSize) -> Result<OvrSwapChain, VRError> {
        if size.is_empty() {
            return Err(VRError::SwapChain(format!("empty render target {}x{}", size.width, size.height)));
        }
        let chain = runtime.create_texture_swap_chain(Sizei { w: size.width, h: size.height })?;
        let mut swap_chain = OvrSwapChain {
            chain: chain,
            size: size,
            depth_renderbuffer: 0,
            framebuffers: Vec::new(),
        };

        match swap_chain.allocate_slots(runtime, gl) {
            Ok(()) => Ok(swap_chain),
            Err(e) => {
                swap_chain.destroy(runtime, gl);
                Err(e)
            }
        }
    }

    fn allocate_slots(&mut self, runtime: &dyn OculusRuntime, gl: &dyn GraphicsDevice) -> Result<(), VRError> {
        let length = runtime.swap_chain_length(self.chain)?;
        if length == 0 {
            return Err(VRError::SwapChain("runtime returned an empty swap chain".into()));
        }

        self.depth_renderbuffer = gl.create_depth_renderbuffer(self.size.width, self.size.height);
        for index in 0..length {
            let texture = runtime.swap_chain_buffer(self.chain, index)?;
            let framebuffer = gl.create_framebuffer();
            self.framebuffers.push(framebuffer);

            gl.configure_texture(texture);
            gl.attach_depth_renderbuffer(framebuffer, self.depth_renderbuffer);
            gl.attach_color_texture(framebuffer, texture);
            if !gl.is_framebuffer_complete(framebuffer) {
                return Err(VRError::SwapChain(format!("slot {} framebuffer incomplete", index)));
            }
        }
        gl.bind_framebuffer(0);
        debug!("Oculus swap chain of {} slots at {}x{}", length, self.size.width, self.size.height);
        Ok(())
    }

    /// Binds the slot the runtime currently hands out and returns its index
    pub fn bind_current_chain_index_framebuffer(&self,
                                                runtime: &dyn OculusRuntime,
                                                gl: &dyn GraphicsDevice) -> Result<u32, VRError> {
        let index = runtime.swap_chain_current_index(self.chain)?;
        if self.bind_framebuffer(index, gl) {
            Ok(index)
        } else {
            Err(VRError::SwapChain(format!("runtime reported slot {} of {}", index, self.chain_length())))
        }
    }

    /// Binds a slot by index, false if out of range
    pub fn bind_framebuffer(&self, index: u32, gl: &dyn GraphicsDevice) -> bool {
        match self.framebuffers.get(index as usize) {
            Some(&framebuffer) => {
                gl.bind_framebuffer(framebuffer);
                gl.set_viewport(&VRViewport::new(0, 0, self.size.width as i32, self.size.height as i32));
                true
            }
            None => false,
        }
    }

    pub fn chain_length(&self) -> u32 {
        self.framebuffers.len() as u32
    }

    /// Hands the current slot back to the runtime. Once per frame, before submission.
    pub fn commit(&self, runtime: &mut dyn OculusRuntime) -> Result<(), VRError> {
        runtime.commit_swap_chain(self.chain)
    }

    pub fn handle(&self) -> SwapChainHandle {
        self.chain
    }

    pub fn size(&self) -> RenderTargetSize {
        self.size
    }

    /// Releases the vendor chain, then the GL objects wrapping it.
    /// Slot textures belong to the runtime.
    pub fn destroy(self, runtime: &mut dyn OculusRuntime, gl: &dyn GraphicsDevice) {
        runtime.destroy_swap_chain(self.chain);
        for framebuffer in &self.framebuffers {
            gl.delete_framebuffer(*framebuffer);
        }
        if self.depth_renderbuffer != 0 {
            gl.delete_renderbuffer(self.depth_renderbuffer);
        }
    }
}
