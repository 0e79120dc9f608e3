use super::next_sequence;
use rust_hmd_api::{GraphicsDevice, VRViewport};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

/// A GL call issued on the mock device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlCall {
    MakeCurrent,
    CreateFramebuffer(u32),
    DeleteFramebuffer(u32),
    BindFramebuffer(u32),
    CreateDepthRenderbuffer(u32, u32, u32),
    DeleteRenderbuffer(u32),
    CreateColorTexture(u32, u32, u32),
    DeleteTexture(u32),
    ConfigureTexture(u32),
    AttachColorTexture(u32, u32),
    AttachDepthRenderbuffer(u32, u32),
    CheckFramebufferStatus(u32),
    Viewport(VRViewport),
}

/// Records GL calls instead of issuing them.
pub struct MockGraphicsDevice {
    calls: RefCell<Vec<(usize, GlCall)>>,
    next_id: Cell<u32>,
    current: Cell<bool>,
    context_available: Cell<bool>,
    incomplete: Cell<bool>,
    live_framebuffers: RefCell<HashSet<u32>>,
}

impl MockGraphicsDevice {
    pub fn new() -> Rc<MockGraphicsDevice> {
        Rc::new(MockGraphicsDevice {
            calls: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            current: Cell::new(false),
            context_available: Cell::new(true),
            incomplete: Cell::new(false),
            live_framebuffers: RefCell::new(HashSet::new()),
        })
    }

    /// Device whose context is already current
    pub fn current() -> Rc<MockGraphicsDevice> {
        let device = MockGraphicsDevice::new();
        device.make_current();
        device
    }

    /// Makes `make_current` fail, as when the context was lost
    pub fn set_context_available(&self, available: bool) {
        self.context_available.set(available);
        if !available {
            self.current.set(false);
        }
    }

    /// Makes every completeness check fail
    pub fn set_framebuffers_incomplete(&self, incomplete: bool) {
        self.incomplete.set(incomplete);
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().iter().map(|&(_, ref call)| call.clone()).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Sequence number of the first call matching `pred`
    pub fn call_sequence<F: Fn(&GlCall) -> bool>(&self, pred: F) -> Option<usize> {
        self.calls.borrow().iter().find(|&&(_, ref call)| pred(call)).map(|&(seq, _)| seq)
    }

    /// Framebuffer bound by the last bind call, 0 if none
    pub fn bound_framebuffer(&self) -> u32 {
        self.calls.borrow().iter().rev()
            .filter_map(|&(_, ref call)| match *call {
                GlCall::BindFramebuffer(framebuffer) => Some(framebuffer),
                _ => None,
            })
            .next()
            .unwrap_or(0)
    }

    pub fn viewports(&self) -> Vec<VRViewport> {
        self.calls.borrow().iter()
            .filter_map(|&(_, ref call)| match *call {
                GlCall::Viewport(viewport) => Some(viewport),
                _ => None,
            })
            .collect()
    }

    /// Framebuffers created and not yet deleted
    pub fn live_framebuffer_count(&self) -> usize {
        self.live_framebuffers.borrow().len()
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push((next_sequence(), call));
    }

    fn new_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn make_current(&self) -> bool {
        self.record(GlCall::MakeCurrent);
        let available = self.context_available.get();
        self.current.set(available);
        available
    }

    fn is_current(&self) -> bool {
        self.current.get()
    }

    fn create_framebuffer(&self) -> u32 {
        let id = self.new_id();
        self.live_framebuffers.borrow_mut().insert(id);
        self.record(GlCall::CreateFramebuffer(id));
        id
    }

    fn delete_framebuffer(&self, framebuffer: u32) {
        self.live_framebuffers.borrow_mut().remove(&framebuffer);
        self.record(GlCall::DeleteFramebuffer(framebuffer));
    }

    fn bind_framebuffer(&self, framebuffer: u32) {
        self.record(GlCall::BindFramebuffer(framebuffer));
    }

    fn create_depth_renderbuffer(&self, width: u32, height: u32) -> u32 {
        let id = self.new_id();
        self.record(GlCall::CreateDepthRenderbuffer(id, width, height));
        id
    }

    fn delete_renderbuffer(&self, renderbuffer: u32) {
        self.record(GlCall::DeleteRenderbuffer(renderbuffer));
    }

    fn create_color_texture(&self, width: u32, height: u32) -> u32 {
        let id = self.new_id();
        self.record(GlCall::CreateColorTexture(id, width, height));
        id
    }

    fn delete_texture(&self, texture: u32) {
        self.record(GlCall::DeleteTexture(texture));
    }

    fn configure_texture(&self, texture: u32) {
        self.record(GlCall::ConfigureTexture(texture));
    }

    fn attach_color_texture(&self, framebuffer: u32, texture: u32) {
        self.record(GlCall::AttachColorTexture(framebuffer, texture));
    }

    fn attach_depth_renderbuffer(&self, framebuffer: u32, renderbuffer: u32) {
        self.record(GlCall::AttachDepthRenderbuffer(framebuffer, renderbuffer));
    }

    fn is_framebuffer_complete(&self, framebuffer: u32) -> bool {
        self.record(GlCall::CheckFramebufferStatus(framebuffer));
        !self.incomplete.get()
    }

    fn set_viewport(&self, viewport: &VRViewport) {
        self.record(GlCall::Viewport(*viewport));
    }
}
