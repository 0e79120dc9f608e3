#[macro_use]
extern crate log;
#[macro_use]
extern crate rust_hmd_api;

#[cfg(feature = "gl")]
extern crate gleam;
extern crate libloading;
#[cfg(feature = "openvr")]
extern crate openvr_crate;

pub mod api;
mod framebuffer;
#[cfg(feature = "gl")]
mod gl_device;
mod head_mounted_display;
mod scene;
mod vr_manager;

pub use rust_hmd_api::*;
pub use framebuffer::Framebuffer;
#[cfg(feature = "gl")]
pub use gl_device::GleamDevice;
pub use head_mounted_display::{FrameReport, HeadMountedDisplay, SceneRenderer};
pub use scene::{Scene, StereoCamera, TrackedObjectNode};
pub use vr_manager::VRBackendManager;
