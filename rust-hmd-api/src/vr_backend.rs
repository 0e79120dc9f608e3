use crate::{BackendState, FrameState, GraphicsDevicePtr, HmdConfig, Matrix4, MirrorTexture, ModelTexture,
            RenderTargetSize, TrackedObjectType, VREvent};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to the single backend of a running session.
/// Every scene consumer holds a clone of the same pointer.
pub type VRBackendPtr = Rc<RefCell<dyn VRBackend>>;

/// Vendor runtimes a backend can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum VRBackendType {
    OculusVR,
    OpenVR,
}

impl VRBackendType {
    /// Order in which runtimes are tried when no backend is configured.
    pub const AUTO_SELECT_ORDER: [VRBackendType; 2] = [VRBackendType::OculusVR, VRBackendType::OpenVR];
}

impl fmt::Display for VRBackendType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            VRBackendType::OculusVR => write!(f, "Oculus"),
            VRBackendType::OpenVR => write!(f, "OpenVR"),
        }
    }
}

/// The VRBackend trait forms the base of all vendor runtime adapters.
///
/// Every call must be issued from the thread that owns the graphics context.
/// Per-frame calls made before `initialize` are programmer errors.
pub trait VRBackend {

    /// Returns the vendor runtime this backend drives
    fn backend_type(&self) -> VRBackendType;

    /// Returns the lifecycle state of the backend
    fn state(&self) -> BackendState;

    /// Fast probe for a connected headset.
    /// OpenVR has no session side effects, Oculus performs a lightweight session probe.
    fn is_hmd_present(&mut self) -> bool;

    /// Establishes the vendor session and allocates the render target.
    /// Requires a current graphics context. Not re-entrant.
    fn initialize(&mut self) -> bool;

    /// Releases the session and GPU resources in the vendor specific order.
    /// Safe after a partially failed `initialize`, never frees twice.
    fn shutdown(&mut self);

    /// Binds the writable render target for this frame.
    /// Returns false if the backend has no valid target.
    fn bind_framebuffer_object(&mut self, hmd_id: u32) -> bool;

    /// Display refresh rate in Hz, constant for the session
    fn refresh_rate(&self, hmd_id: u32) -> f32;

    /// Combined size of both eyes laid out side by side
    fn render_target_size(&self) -> RenderTargetSize;

    /// Milliseconds left before the next scan-out, never negative.
    /// Advisory only.
    fn time_until_next_frame(&self) -> i32;

    /// World-from-head transform of the headset for the current frame
    fn head_pose(&mut self, hmd_id: u32) -> Matrix4;

    /// Per-eye view matrices for the current frame.
    /// Samples the vendor runtime at most once between two `swap_to_headset` calls.
    fn eye_matrices(&mut self, left: &mut Matrix4, right: &mut Matrix4);

    /// Per-eye projections, recomputed only when the clip planes change
    fn projection_matrices(&mut self, left: &mut Matrix4, right: &mut Matrix4);

    /// Updates the clip planes used by `projection_matrices`
    fn set_clip_planes(&mut self, near: f32, far: f32);

    /// Ids of the devices connected and tracked this frame
    fn currently_tracked_objects(&mut self) -> Vec<u32>;

    /// Writes the world transform of a tracked object.
    /// Leaves `transform` untouched and returns false for invalid or disconnected ids.
    fn tracked_object(&mut self, id: u32, transform: &mut Matrix4) -> bool;

    fn tracked_object_type(&mut self, id: u32) -> TrackedObjectType;

    /// Loads the render model of a tracked object, once per id.
    /// Blocks the caller while the vendor runtime streams the model in.
    fn tracked_object_model(&mut self,
                            id: u32,
                            vertices: &mut Vec<f32>,
                            indices: &mut Vec<u32>,
                            texture: &mut ModelTexture) -> bool;

    /// Commits the current image to the compositor and starts a new frame
    fn swap_to_headset(&mut self);

    /// Texture holding a preview of what the headset shows, if supported
    fn mirror_texture(&mut self, _texture: &mut MirrorTexture) -> bool {
        false
    }

    /// Drains pending device notifications
    fn poll_events(&mut self) -> Vec<VREvent> {
        Vec::new()
    }

    fn frame_state(&self) -> FrameState;
}

/// Entry point used by the backend manager to probe and build a vendor backend.
pub trait VRBackendCreator {
    fn backend_type(&self) -> VRBackendType;

    /// Checks that the vendor runtime is installed without opening a session
    fn is_runtime_installed(&self) -> bool;

    fn new_backend(&self, graphics: GraphicsDevicePtr, config: &HmdConfig) -> VRBackendPtr;
}
