#[macro_export]
macro_rules! identity_matrix {
    () => ([1.0, 0.0, 0.0, 0.0,  0.0, 1.0, 0.0, 0.0,  0.0, 0.0, 1.0, 0.0,  0.0, 0.0, 0.0, 1.0]);
}

#[macro_use]
extern crate log;

#[cfg(feature = "utils")]
extern crate time;

#[cfg(feature = "serde-serialization")]
#[macro_use]
extern crate serde_derive;

#[cfg(feature = "utils")]
pub mod utils;

pub mod vr_backend;
pub mod vr_config;
pub mod vr_error;
pub mod vr_event;
pub mod vr_eye;
pub mod vr_frame_state;
pub mod vr_framebuffer;
pub mod vr_graphics;
pub mod vr_pose_cache;
pub mod vr_tracked_object;

/// Column-major 4x4 matrix, the layout every backend hands out.
pub type Matrix4 = [f32; 16];

pub use vr_backend::{VRBackend, VRBackendCreator, VRBackendPtr, VRBackendType};
pub use vr_config::HmdConfig;
pub use vr_error::VRError;
pub use vr_event::VREvent;
pub use vr_eye::VREye;
pub use vr_frame_state::{BackendState, FrameState};
pub use vr_framebuffer::{MirrorTexture, RenderTargetSize, VRViewport};
pub use vr_graphics::{GraphicsDevice, GraphicsDevicePtr};
pub use vr_pose_cache::{PoseCache, ProjectionCache};
pub use vr_tracked_object::{ModelTexture, RenderModel, TrackedObjectType, MAX_TRACKED_OBJECTS};
