mod graphics;
mod oculusvr;
mod openvr;

pub use self::graphics::{GlCall, MockGraphicsDevice};

use super::openvr::runtime::{ControllerRole, RawRenderModel, RawTexture, RenderModelVertex};
use super::oculusvr::runtime::Posef;
use super::oculusvr::OculusVRBackend;
use super::openvr::OpenVRBackend;
use rust_hmd_api::{GraphicsDevicePtr, HmdConfig, VRBackendCreator, VRBackendPtr, VRBackendType, VREvent};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;

static CALL_COUNTER: AtomicUsize = AtomicUsize::new(0);

// Global ordering of mock calls, comparable across runtime and GL logs
fn next_sequence() -> usize {
    CALL_COUNTER.fetch_add(1, SeqCst)
}

/// Messages steering a mock runtime from a test.
pub enum MockVRControlMsg {
    SetRuntimeInstalled(bool),
    SetHmdPresent(bool),
    /// Head position and orientation quaternion
    SetHeadPose([f32; 3], [f32; 4]),
    SetInterpupillaryDistance(f32),
    /// Recommended size of one eye
    SetEyeRenderSize(u32, u32),
    SetRefreshRate(f32),
    SetTimeSinceVsync(Option<f32>),
    /// Seconds between now and the predicted display time
    SetDisplayLatency(f64),
    ConnectDevice(u32, MockDevice),
    DisconnectDevice(u32),
    SetDevicePose(u32, [f32; 3], [f32; 4]),
    SetRenderModel(String, MockRenderModel),
    SetAdapterMismatch(bool),
    SetSwapChainLength(u32),
    SetSwapChainIndex(u32),
    FailSwapChainCreation(bool),
    FailSubmit(bool),
    QueueEvent(VREvent),
}

/// A tracked device of the mock runtime
#[derive(Debug, Clone, PartialEq)]
pub struct MockDevice {
    /// Raw `ETrackedDeviceClass`
    pub class: u32,
    pub role: ControllerRole,
    pub position: [f32; 3],
    pub orientation: [f32; 4],
    pub connected: bool,
    pub render_model: Option<String>,
}

impl MockDevice {
    pub fn controller(role: ControllerRole, position: [f32; 3]) -> MockDevice {
        MockDevice {
            class: 2,
            role: role,
            position: position,
            orientation: [0.0, 0.0, 0.0, 1.0],
            connected: true,
            render_model: Some("mock_controller".into()),
        }
    }

    pub fn base_station(position: [f32; 3]) -> MockDevice {
        MockDevice {
            class: 4,
            role: ControllerRole::Invalid,
            position: position,
            orientation: [0.0, 0.0, 0.0, 1.0],
            connected: true,
            render_model: Some("mock_base_station".into()),
        }
    }

    pub fn pose(&self) -> Posef {
        Posef {
            orientation: self.orientation,
            position: self.position,
        }
    }
}

/// Render model served by the mock runtime after `loading_polls` "still loading" answers
#[derive(Debug, Clone, PartialEq)]
pub struct MockRenderModel {
    pub loading_polls: u32,
    pub fail: bool,
    pub model: RawRenderModel,
    pub texture: RawTexture,
}

impl MockRenderModel {
    /// A textured quad
    pub fn quad(loading_polls: u32) -> MockRenderModel {
        let vertex = |x: f32, y: f32| RenderModelVertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            texture_coord: [x + 0.5, y + 0.5],
        };
        MockRenderModel {
            loading_polls: loading_polls,
            fail: false,
            model: RawRenderModel {
                vertices: vec![vertex(-0.5, -0.5), vertex(0.5, -0.5), vertex(0.5, 0.5), vertex(-0.5, 0.5)],
                indices: vec![0, 1, 2, 0, 2, 3],
                diffuse_texture_id: Some(1),
            },
            texture: RawTexture {
                width: 2,
                height: 1,
                rgba: vec![255, 0, 0, 255, 0, 255, 0, 255],
            },
        }
    }

    pub fn failing() -> MockRenderModel {
        MockRenderModel {
            fail: true,
            ..MockRenderModel::quad(0)
        }
    }
}

/// State shared between a mock runtime and its remote
pub struct MockVRState {
    pub runtime_installed: bool,
    pub hmd_present: bool,
    pub head_position: [f32; 3],
    pub head_orientation: [f32; 4],
    pub ipd: f32,
    pub eye_render_size: (u32, u32),
    pub refresh_rate: f32,
    pub time_since_vsync: Option<f32>,
    pub now: f64,
    pub display_latency: f64,
    pub devices: BTreeMap<u32, MockDevice>,
    pub render_models: HashMap<String, MockRenderModel>,
    pub adapter_mismatch: bool,
    pub swap_chain_length: u32,
    pub swap_chain_index: u32,
    pub fail_swap_chain: bool,
    pub fail_submit: bool,
    pub events: VecDeque<VREvent>,

    /// Every vendor call with its global sequence number
    pub calls: Vec<(usize, String)>,
    pub pose_samples: u32,
    pub predicted_frames: Vec<u64>,
    pub submitted_frames: Vec<u64>,
}

impl Default for MockVRState {
    fn default() -> MockVRState {
        let mut devices = BTreeMap::new();
        devices.insert(1, MockDevice::controller(ControllerRole::LeftHand, [-0.2, 1.0, -0.3]));
        devices.insert(2, MockDevice::controller(ControllerRole::RightHand, [0.2, 1.0, -0.3]));
        devices.insert(3, MockDevice::base_station([2.0, 2.5, 2.0]));

        let mut render_models = HashMap::new();
        render_models.insert("mock_controller".to_string(), MockRenderModel::quad(2));
        render_models.insert("mock_base_station".to_string(), MockRenderModel::quad(0));

        MockVRState {
            runtime_installed: true,
            hmd_present: true,
            head_position: [0.0, 1.6, 0.0],
            head_orientation: [0.0, 0.0, 0.0, 1.0],
            ipd: 0.064,
            eye_render_size: (1000, 1200),
            refresh_rate: 90.0,
            time_since_vsync: Some(0.004),
            now: 100.0,
            display_latency: 0.0115,
            devices: devices,
            render_models: render_models,
            adapter_mismatch: false,
            swap_chain_length: 3,
            swap_chain_index: 0,
            fail_swap_chain: false,
            fail_submit: false,
            events: VecDeque::new(),
            calls: Vec::new(),
            pose_samples: 0,
            predicted_frames: Vec::new(),
            submitted_frames: Vec::new(),
        }
    }
}

impl MockVRState {
    fn record(&mut self, call: &str) {
        self.calls.push((next_sequence(), call.to_string()));
    }

    fn head_pose(&self) -> Posef {
        Posef {
            orientation: self.head_orientation,
            position: self.head_position,
        }
    }

    fn apply(&mut self, msg: MockVRControlMsg) {
        match msg {
            MockVRControlMsg::SetRuntimeInstalled(installed) => self.runtime_installed = installed,
            MockVRControlMsg::SetHmdPresent(present) => self.hmd_present = present,
            MockVRControlMsg::SetHeadPose(position, orientation) => {
                self.head_position = position;
                self.head_orientation = orientation;
            }
            MockVRControlMsg::SetInterpupillaryDistance(ipd) => self.ipd = ipd,
            MockVRControlMsg::SetEyeRenderSize(width, height) => self.eye_render_size = (width, height),
            MockVRControlMsg::SetRefreshRate(rate) => self.refresh_rate = rate,
            MockVRControlMsg::SetTimeSinceVsync(seconds) => self.time_since_vsync = seconds,
            MockVRControlMsg::SetDisplayLatency(seconds) => self.display_latency = seconds,
            MockVRControlMsg::ConnectDevice(id, device) => {
                self.devices.insert(id, device);
            }
            MockVRControlMsg::DisconnectDevice(id) => {
                if let Some(device) = self.devices.get_mut(&id) {
                    device.connected = false;
                }
            }
            MockVRControlMsg::SetDevicePose(id, position, orientation) => {
                if let Some(device) = self.devices.get_mut(&id) {
                    device.position = position;
                    device.orientation = orientation;
                }
            }
            MockVRControlMsg::SetRenderModel(name, model) => {
                self.render_models.insert(name, model);
            }
            MockVRControlMsg::SetAdapterMismatch(mismatch) => self.adapter_mismatch = mismatch,
            MockVRControlMsg::SetSwapChainLength(length) => self.swap_chain_length = length,
            MockVRControlMsg::SetSwapChainIndex(index) => self.swap_chain_index = index,
            MockVRControlMsg::FailSwapChainCreation(fail) => self.fail_swap_chain = fail,
            MockVRControlMsg::FailSubmit(fail) => self.fail_submit = fail,
            MockVRControlMsg::QueueEvent(event) => self.events.push_back(event),
        }
    }
}

/// Test side handle of a mock runtime.
#[derive(Clone)]
pub struct MockVRRemote {
    state: Rc<RefCell<MockVRState>>,
}

impl MockVRRemote {
    pub fn send(&self, msg: MockVRControlMsg) {
        self.state.borrow_mut().apply(msg);
    }

    pub fn state(&self) -> Ref<MockVRState> {
        self.state.borrow()
    }

    /// Times the vendor pose routine ran
    pub fn pose_samples(&self) -> u32 {
        self.state.borrow().pose_samples
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.state.borrow().calls.iter().filter(|&&(_, ref name)| name == call).count()
    }

    /// Sequence number of the first `call`
    pub fn call_sequence(&self, call: &str) -> Option<usize> {
        self.state.borrow().calls.iter().find(|&&(_, ref name)| name == call).map(|&(seq, _)| seq)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.iter().map(|&(_, ref name)| name.clone()).collect()
    }
}

/// Builds backends over in-process mock runtimes.
pub struct MockBackendCreator {
    backend_type: VRBackendType,
    state: Rc<RefCell<MockVRState>>,
}

impl MockBackendCreator {
    pub fn openvr() -> Box<dyn VRBackendCreator> {
        MockBackendCreator::new_with_remote(VRBackendType::OpenVR).0
    }

    pub fn oculusvr() -> Box<dyn VRBackendCreator> {
        MockBackendCreator::new_with_remote(VRBackendType::OculusVR).0
    }

    /// Creator whose backends all share the returned remote
    pub fn new_with_remote(backend_type: VRBackendType) -> (Box<dyn VRBackendCreator>, MockVRRemote) {
        let state = Rc::new(RefCell::new(MockVRState::default()));
        let creator = MockBackendCreator {
            backend_type: backend_type,
            state: state.clone(),
        };
        (Box::new(creator), MockVRRemote { state: state })
    }

    pub fn new_backend_with_remote(backend_type: VRBackendType,
                                   graphics: GraphicsDevicePtr,
                                   config: &HmdConfig) -> (VRBackendPtr, MockVRRemote) {
        let (creator, remote) = MockBackendCreator::new_with_remote(backend_type);
        (creator.new_backend(graphics, config), remote)
    }
}

impl VRBackendCreator for MockBackendCreator {
    fn backend_type(&self) -> VRBackendType {
        self.backend_type
    }

    fn is_runtime_installed(&self) -> bool {
        self.state.borrow().runtime_installed
    }

    fn new_backend(&self, graphics: GraphicsDevicePtr, config: &HmdConfig) -> VRBackendPtr {
        match self.backend_type {
            VRBackendType::OpenVR => {
                let runtime = openvr::MockOpenVRRuntime::new(self.state.clone());
                Rc::new(RefCell::new(OpenVRBackend::new(Box::new(runtime), graphics, config)))
            }
            VRBackendType::OculusVR => {
                let runtime = oculusvr::MockOculusRuntime::new(self.state.clone());
                Rc::new(RefCell::new(OculusVRBackend::new(Box::new(runtime), graphics, config)))
            }
        }
    }
}
