use rust_hmd_api::{VREye, VRError, MAX_TRACKED_OBJECTS};

/// Row-major 3x4 affine transform as OpenVR reports it
pub type HmdMatrix34 = [[f32; 4]; 3];
/// Row-major 4x4 matrix as OpenVR reports it
pub type HmdMatrix44 = [[f32; 4]; 4];

pub const MAX_TRACKED_DEVICE_COUNT: usize = MAX_TRACKED_OBJECTS as usize;

/// Index of the headset in the OpenVR device table
pub const TRACKED_DEVICE_INDEX_HMD: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedDevicePose {
    pub device_to_absolute_tracking: HmdMatrix34,
    pub pose_is_valid: bool,
    pub device_is_connected: bool,
}

impl Default for TrackedDevicePose {
    fn default() -> Self {
        TrackedDevicePose {
            device_to_absolute_tracking: [[1.0, 0.0, 0.0, 0.0],
                                          [0.0, 1.0, 0.0, 0.0],
                                          [0.0, 0.0, 1.0, 0.0]],
            pose_is_valid: false,
            device_is_connected: false,
        }
    }
}

/// `ETrackedDeviceClass`, open ended so new runtime values survive the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedDeviceClass {
    Invalid,
    Hmd,
    Controller,
    GenericTracker,
    TrackingReference,
    DisplayRedirect,
    Unknown(u32),
}

impl TrackedDeviceClass {
    pub fn from_raw(value: u32) -> TrackedDeviceClass {
        match value {
            0 => TrackedDeviceClass::Invalid,
            1 => TrackedDeviceClass::Hmd,
            2 => TrackedDeviceClass::Controller,
            3 => TrackedDeviceClass::GenericTracker,
            4 => TrackedDeviceClass::TrackingReference,
            5 => TrackedDeviceClass::DisplayRedirect,
            other => TrackedDeviceClass::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerRole {
    Invalid,
    LeftHand,
    RightHand,
}

/// Region of the submitted texture shown to one eye, in uv space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureBounds {
    pub u_min: f32,
    pub v_min: f32,
    pub u_max: f32,
    pub v_max: f32,
}

impl TextureBounds {
    /// Converts `[x, y, width, height]` into min/max bounds
    pub fn from_rect(rect: &[f32; 4]) -> TextureBounds {
        TextureBounds {
            u_min: rect[0],
            v_min: rect[1],
            u_max: rect[0] + rect[2],
            v_max: rect[1] + rect[3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texture_coord: [f32; 2],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRenderModel {
    pub vertices: Vec<RenderModelVertex>,
    pub indices: Vec<u16>,
    pub diffuse_texture_id: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTexture {
    pub width: u16,
    pub height: u16,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    TrackedDeviceActivated(u32),
    TrackedDeviceDeactivated(u32),
    TrackedDeviceUpdated(u32),
    Other(u32),
}

/// The part of the OpenVR API the adapter drives.
///
/// `is_runtime_installed` and `is_hmd_present` must work without a session.
pub trait OpenVRRuntime {
    fn is_runtime_installed(&self) -> bool;

    fn is_hmd_present(&self) -> bool;

    /// `VR_Init` as a scene application, with the compositor available
    fn init(&mut self) -> Result<(), VRError>;

    /// `VR_Shutdown`
    fn shutdown(&mut self);

    fn string_property(&self, device: u32, property: StringProperty) -> Option<String>;

    fn display_frequency(&self) -> Option<f32>;

    /// Size recommended for one eye
    fn recommended_render_target_size(&self) -> (u32, u32);

    fn eye_to_head_transform(&self, eye: VREye) -> HmdMatrix34;

    fn projection_matrix(&self, eye: VREye, near: f32, far: f32) -> HmdMatrix44;

    /// Blocks until the compositor hands out the render poses of the next frame
    fn wait_get_poses(&mut self) -> Result<Vec<TrackedDevicePose>, VRError>;

    fn device_class(&self, device: u32) -> TrackedDeviceClass;

    fn controller_role(&self, device: u32) -> ControllerRole;

    /// `Ok(None)` while the runtime is still loading
    fn load_render_model(&mut self, name: &str) -> Result<Option<RawRenderModel>, VRError>;

    fn load_texture(&mut self, texture_id: i32) -> Result<Option<RawTexture>, VRError>;

    fn time_since_last_vsync(&self) -> Option<f32>;

    fn submit(&mut self, eye: VREye, texture_id: u32, bounds: &TextureBounds) -> Result<(), VRError>;

    fn post_present_handoff(&mut self);

    fn poll_next_event(&mut self) -> Option<RuntimeEvent>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringProperty {
    TrackingSystemName,
    SerialNumber,
    RenderModelName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_device_classes_are_preserved() {
        assert_eq!(TrackedDeviceClass::from_raw(1), TrackedDeviceClass::Hmd);
        assert_eq!(TrackedDeviceClass::from_raw(4), TrackedDeviceClass::TrackingReference);
        assert_eq!(TrackedDeviceClass::from_raw(42), TrackedDeviceClass::Unknown(42));
    }

    #[test]
    fn bounds_from_eye_rects() {
        let right = TextureBounds::from_rect(&[0.5, 0.0, 0.5, 1.0]);
        assert_eq!(right, TextureBounds { u_min: 0.5, v_min: 0.0, u_max: 1.0, v_max: 1.0 });
    }
}
