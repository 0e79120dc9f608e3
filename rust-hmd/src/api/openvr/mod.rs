mod backend;
mod library;
pub mod runtime;
#[cfg(feature = "openvr")]
mod steamvr;

pub use self::backend::OpenVRBackend;
pub use self::library::OpenVRLibrary;
pub use self::runtime::OpenVRRuntime;
#[cfg(feature = "openvr")]
pub use self::steamvr::SteamVRRuntime;

use rust_hmd_api::{GraphicsDevicePtr, HmdConfig, VRBackendCreator, VRBackendPtr, VRBackendType};
use std::cell::RefCell;
use std::rc::Rc;

pub type OpenVRRuntimeFactory = Box<dyn Fn() -> Box<dyn OpenVRRuntime>>;

pub struct OpenVRBackendCreator {
    factory: OpenVRRuntimeFactory,
}

impl OpenVRBackendCreator {
    /// Creator for the installed OpenVR runtime
    #[cfg(feature = "openvr")]
    pub fn new() -> Box<dyn VRBackendCreator> {
        OpenVRBackendCreator::with_runtime(Box::new(|| Box::new(SteamVRRuntime::new()) as Box<dyn OpenVRRuntime>))
    }

    pub fn with_runtime(factory: OpenVRRuntimeFactory) -> Box<dyn VRBackendCreator> {
        Box::new(OpenVRBackendCreator {
            factory: factory,
        })
    }
}

impl VRBackendCreator for OpenVRBackendCreator {
    fn backend_type(&self) -> VRBackendType {
        VRBackendType::OpenVR
    }

    fn is_runtime_installed(&self) -> bool {
        (self.factory)().is_runtime_installed()
    }

    fn new_backend(&self, graphics: GraphicsDevicePtr, config: &HmdConfig) -> VRBackendPtr {
        Rc::new(RefCell::new(OpenVRBackend::new((self.factory)(), graphics, config)))
    }
}
