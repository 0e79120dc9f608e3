/// Per-frame bookkeeping shared by every backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameState {
    /// Number of frames handed to the compositor so far
    pub frame_index: u64,
    /// True once poses were sampled for the current frame
    pub poses_fresh: bool,
}

impl FrameState {
    /// Closes the current frame. Called once per `swap_to_headset`.
    pub fn advance(&mut self) {
        self.frame_index += 1;
        self.poses_fresh = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Uninitialized,
    Initialized,
    /// `initialize` ran and failed. Per-frame calls report failure quietly
    /// and `shutdown` releases whatever was opened.
    Failed,
    /// Terminal
    Shutdown,
}

impl Default for BackendState {
    fn default() -> BackendState {
        BackendState::Uninitialized
    }
}
