use rust_hmd_api::{GraphicsDevicePtr, HmdConfig, VRBackendCreator, VRBackendPtr, VRBackendType};

#[cfg(feature = "oculusvr")]
use crate::api::OculusVRBackendCreator;
#[cfg(feature = "openvr")]
use crate::api::OpenVRBackendCreator;

#[cfg(feature = "mock")]
use crate::api::MockBackendCreator;

// Single entry point to every registered vendor runtime
pub struct VRBackendManager {
    creators: Vec<Box<dyn VRBackendCreator>>,
}

impl VRBackendManager {
    pub fn new() -> VRBackendManager {
        VRBackendManager {
            creators: Vec::new(),
        }
    }

    // Register the runtimes enabled by the crate's features
    pub fn register_defaults(&mut self) {
        let creators: Vec<Box<dyn VRBackendCreator>> = vec!(
            #[cfg(feature = "oculusvr")]
            OculusVRBackendCreator::new(),
            #[cfg(feature = "openvr")]
            OpenVRBackendCreator::new(),
        );

        for creator in creators {
            self.register(creator);
        }
    }

    // Register mock runtimes for both vendors
    // Usefull for testing
    #[cfg(feature = "mock")]
    pub fn register_mock(&mut self) {
        self.register(MockBackendCreator::oculusvr());
        self.register(MockBackendCreator::openvr());
    }

    // Register a new runtime. A later registration for the same vendor wins.
    pub fn register(&mut self, creator: Box<dyn VRBackendCreator>) {
        let backend_type = creator.backend_type();
        self.creators.retain(|c| c.backend_type() != backend_type);
        debug!("Registered {} runtime", backend_type);
        self.creators.push(creator);
    }

    pub fn is_runtime_installed(&self, backend_type: VRBackendType) -> bool {
        self.creator(backend_type).map_or(false, |c| c.is_runtime_installed())
    }

    /// Builds an uninitialized backend for `backend_type`
    pub fn create_backend(&self,
                          backend_type: VRBackendType,
                          graphics: GraphicsDevicePtr,
                          config: &HmdConfig) -> Option<VRBackendPtr> {
        self.creator(backend_type).map(|c| c.new_backend(graphics, config))
    }

    /// Picks the first runtime, Oculus before OpenVR, that is installed and
    /// has a headset attached. The returned backend is not initialized yet.
    pub fn select_backend(&self, graphics: GraphicsDevicePtr, config: &HmdConfig) -> Option<VRBackendPtr> {
        for backend_type in VRBackendType::AUTO_SELECT_ORDER.iter() {
            if !self.is_runtime_installed(*backend_type) {
                debug!("{} runtime not installed", backend_type);
                continue;
            }
            let backend = match self.create_backend(*backend_type, graphics.clone(), config) {
                Some(backend) => backend,
                None => continue,
            };
            let present = backend.borrow_mut().is_hmd_present();
            if present {
                info!("Using {} runtime", backend_type);
                return Some(backend);
            }
            debug!("No {} headset present", backend_type);
        }
        None
    }

    fn creator(&self, backend_type: VRBackendType) -> Option<&dyn VRBackendCreator> {
        self.creators.iter().find(|c| c.backend_type() == backend_type).map(|c| &**c)
    }
}

impl Default for VRBackendManager {
    fn default() -> VRBackendManager {
        VRBackendManager::new()
    }
}
