#[cfg(feature = "mock")]
pub mod mock;
#[cfg(feature = "mock")]
pub use self::mock::{MockBackendCreator, MockGraphicsDevice, MockVRControlMsg, MockVRRemote};

pub mod openvr;
pub use self::openvr::OpenVRBackendCreator;

pub mod oculusvr;
pub use self::oculusvr::OculusVRBackendCreator;
