use rust_hmd_api::{utils, Matrix4, VREye, VRError, VRViewport};

/// Adapter LUID a session runs on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphicsLuid(pub [u8; 8]);

/// Tangents of the half angles of one eye's field of view
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FovPort {
    pub up_tan: f32,
    pub down_tan: f32,
    pub left_tan: f32,
    pub right_tan: f32,
}

impl FovPort {
    pub fn projection(&self, near: f32, far: f32) -> Matrix4 {
        utils::frustum_from_tangents(self.up_tan, self.down_tan, self.left_tan, self.right_tan, near, far)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sizei {
    pub w: u32,
    pub h: u32,
}

/// Rigid pose: unit quaternion `[x, y, z, w]` and position in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posef {
    pub orientation: [f32; 4],
    pub position: [f32; 3],
}

impl Default for Posef {
    fn default() -> Self {
        Posef {
            orientation: [0.0, 0.0, 0.0, 1.0],
            position: [0.0, 0.0, 0.0],
        }
    }
}

impl Posef {
    /// World-from-device transform
    pub fn to_matrix(&self) -> Matrix4 {
        utils::matrix_from_pose(&self.orientation, &self.position)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HmdDesc {
    pub product_name: String,
    pub resolution: Sizei,
    pub display_refresh_rate: f32,
    pub default_eye_fov: [FovPort; 2],
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EyeRenderDesc {
    pub fov: FovPort,
    pub hmd_to_eye_pose: Posef,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackingState {
    pub head_pose: Posef,
    pub head_tracked: bool,
    pub hand_poses: [Posef; 2],
    pub hands_tracked: [bool; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingOrigin {
    EyeLevel,
    FloorLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapChainHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MirrorTextureHandle(pub u64);

/// An `ovrLayerEyeFov` submitted once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerEyeFov {
    pub color_texture: SwapChainHandle,
    pub viewports: [VRViewport; 2],
    pub fov: [FovPort; 2],
    pub render_poses: [Posef; 2],
    pub sensor_sample_time: f64,
    /// Set for GL textures
    pub texture_origin_at_bottom_left: bool,
}

/// The part of the Oculus PC SDK the adapter drives.
pub trait OculusRuntime {
    /// `ovr_Initialize` probe
    fn is_runtime_installed(&self) -> bool;

    /// `ovr_Initialize`
    fn initialize(&mut self) -> Result<(), VRError>;

    /// `ovr_Create`, returns the LUID of the adapter the headset is on
    fn create_session(&mut self) -> Result<GraphicsLuid, VRError>;

    /// LUID of the adapter GL renders on
    fn default_adapter_luid(&self) -> GraphicsLuid;

    fn destroy_session(&mut self);

    /// `ovr_Shutdown`
    fn shutdown(&mut self);

    fn hmd_desc(&self) -> HmdDesc;

    fn set_tracking_origin(&mut self, origin: TrackingOrigin) -> Result<(), VRError>;

    fn fov_texture_size(&self, eye: VREye, fov: &FovPort) -> Sizei;

    fn eye_render_desc(&self, eye: VREye, fov: &FovPort) -> EyeRenderDesc;

    /// Absolute time in seconds at which `frame_index` reaches the display
    fn predicted_display_time(&self, frame_index: u64) -> f64;

    fn time_in_seconds(&self) -> f64;

    fn tracking_state(&mut self, absolute_time: f64) -> TrackingState;

    /// `ovr_GetEyePoses`, returns the eye poses and the sensor sample time
    fn eye_poses(&mut self, frame_index: u64, hmd_to_eye: &[Posef; 2]) -> ([Posef; 2], f64);

    fn tracker_count(&self) -> u32;

    /// Pose of a tracking sensor, `None` when it is not connected
    fn tracker_pose(&self, index: u32) -> Option<Posef>;

    fn create_texture_swap_chain(&mut self, size: Sizei) -> Result<SwapChainHandle, VRError>;

    fn swap_chain_length(&self, chain: SwapChainHandle) -> Result<u32, VRError>;

    /// GL texture of one slot
    fn swap_chain_buffer(&self, chain: SwapChainHandle, index: u32) -> Result<u32, VRError>;

    fn swap_chain_current_index(&self, chain: SwapChainHandle) -> Result<u32, VRError>;

    fn commit_swap_chain(&mut self, chain: SwapChainHandle) -> Result<(), VRError>;

    fn destroy_swap_chain(&mut self, chain: SwapChainHandle);

    fn submit_frame(&mut self, frame_index: u64, layer: &LayerEyeFov) -> Result<(), VRError>;

    fn create_mirror_texture(&mut self, size: Sizei) -> Result<MirrorTextureHandle, VRError>;

    fn mirror_texture_gl(&self, mirror: MirrorTextureHandle) -> Result<u32, VRError>;

    fn destroy_mirror_texture(&mut self, mirror: MirrorTextureHandle);
}
