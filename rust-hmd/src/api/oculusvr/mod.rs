mod backend;
#[cfg(feature = "oculusvr")]
mod libovr;
pub mod runtime;
mod swap_chain;

pub use self::backend::{OculusVRBackend, FIRST_SENSOR_ID, HEAD_ID, LEFT_HAND_ID, RIGHT_HAND_ID};
#[cfg(feature = "oculusvr")]
pub use self::libovr::LibOVRRuntime;
pub use self::runtime::OculusRuntime;
pub use self::swap_chain::OvrSwapChain;

use rust_hmd_api::{GraphicsDevicePtr, HmdConfig, VRBackendCreator, VRBackendPtr, VRBackendType};
use std::cell::RefCell;
use std::rc::Rc;

pub type OculusRuntimeFactory = Box<dyn Fn() -> Box<dyn OculusRuntime>>;

/// Builds Oculus backends on top of a LibOVR runtime.
pub struct OculusVRBackendCreator {
    factory: OculusRuntimeFactory,
}

impl OculusVRBackendCreator {
    /// Creator for the installed LibOVR runtime
    #[cfg(feature = "oculusvr")]
    pub fn new() -> Box<dyn VRBackendCreator> {
        OculusVRBackendCreator::with_runtime(Box::new(|| Box::new(LibOVRRuntime::new()) as Box<dyn OculusRuntime>))
    }

    pub fn with_runtime(factory: OculusRuntimeFactory) -> Box<dyn VRBackendCreator> {
        Box::new(OculusVRBackendCreator {
            factory: factory,
        })
    }
}

impl VRBackendCreator for OculusVRBackendCreator {
    fn backend_type(&self) -> VRBackendType {
        VRBackendType::OculusVR
    }

    fn is_runtime_installed(&self) -> bool {
        (self.factory)().is_runtime_installed()
    }

    fn new_backend(&self, graphics: GraphicsDevicePtr, config: &HmdConfig) -> VRBackendPtr {
        Rc::new(RefCell::new(OculusVRBackend::new((self.factory)(), graphics, config)))
    }
}
