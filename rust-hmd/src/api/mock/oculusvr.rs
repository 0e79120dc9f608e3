use super::MockVRState;
use crate::api::oculusvr::runtime::{EyeRenderDesc, FovPort, GraphicsLuid, HmdDesc, LayerEyeFov, MirrorTextureHandle,
                                    OculusRuntime, Posef, Sizei, SwapChainHandle, TrackingOrigin, TrackingState};
use crate::api::oculusvr::{FIRST_SENSOR_ID, LEFT_HAND_ID};
use rust_hmd_api::{utils, VREye, VRError};
use std::cell::RefCell;
use std::rc::Rc;

const DEFAULT_LUID: GraphicsLuid = GraphicsLuid([1, 0, 0, 0, 0, 0, 0, 0]);
const SWAP_CHAIN: SwapChainHandle = SwapChainHandle(7);
const MIRROR: MirrorTextureHandle = MirrorTextureHandle(9);
/// GL name of the first swap chain texture
pub const FIRST_CHAIN_TEXTURE: u32 = 500;
pub const MIRROR_GL_TEXTURE: u32 = 900;

const DEFAULT_FOV: FovPort = FovPort {
    up_tan: 1.33,
    down_tan: 1.33,
    left_tan: 1.06,
    right_tan: 1.06,
};

/// Simulates an Oculus Rift with Touch controllers
pub struct MockOculusRuntime {
    state: Rc<RefCell<MockVRState>>,
}

impl MockOculusRuntime {
    pub fn new(state: Rc<RefCell<MockVRState>>) -> MockOculusRuntime {
        MockOculusRuntime {
            state: state,
        }
    }

    fn record(&self, call: &str) {
        self.state.borrow_mut().record(call);
    }
}

impl OculusRuntime for MockOculusRuntime {
    fn is_runtime_installed(&self) -> bool {
        self.state.borrow().runtime_installed
    }

    fn initialize(&mut self) -> Result<(), VRError> {
        self.record("ovr_Initialize");
        if self.state.borrow().runtime_installed {
            Ok(())
        } else {
            Err(VRError::RuntimeNotInstalled)
        }
    }

    fn create_session(&mut self) -> Result<GraphicsLuid, VRError> {
        self.record("ovr_Create");
        let state = self.state.borrow();
        if !state.hmd_present {
            return Err(VRError::HmdNotPresent);
        }
        if state.adapter_mismatch {
            Ok(GraphicsLuid([2, 0, 0, 0, 0, 0, 0, 0]))
        } else {
            Ok(DEFAULT_LUID)
        }
    }

    fn default_adapter_luid(&self) -> GraphicsLuid {
        DEFAULT_LUID
    }

    fn destroy_session(&mut self) {
        self.record("ovr_Destroy");
    }

    fn shutdown(&mut self) {
        self.record("ovr_Shutdown");
    }

    fn hmd_desc(&self) -> HmdDesc {
        let state = self.state.borrow();
        let (width, height) = state.eye_render_size;
        HmdDesc {
            product_name: "Mock Rift".into(),
            resolution: Sizei { w: width * 2, h: height },
            display_refresh_rate: state.refresh_rate,
            default_eye_fov: [DEFAULT_FOV, DEFAULT_FOV],
        }
    }

    fn set_tracking_origin(&mut self, origin: TrackingOrigin) -> Result<(), VRError> {
        self.record(&format!("ovr_SetTrackingOriginType {:?}", origin));
        Ok(())
    }

    fn fov_texture_size(&self, _eye: VREye, _fov: &FovPort) -> Sizei {
        let (width, height) = self.state.borrow().eye_render_size;
        Sizei { w: width, h: height }
    }

    fn eye_render_desc(&self, eye: VREye, fov: &FovPort) -> EyeRenderDesc {
        let half_ipd = self.state.borrow().ipd / 2.0;
        let x = match eye {
            VREye::Left => -half_ipd,
            VREye::Right => half_ipd,
        };
        EyeRenderDesc {
            fov: *fov,
            hmd_to_eye_pose: Posef {
                orientation: [0.0, 0.0, 0.0, 1.0],
                position: [x, 0.0, 0.0],
            },
        }
    }

    fn predicted_display_time(&self, frame_index: u64) -> f64 {
        let mut state = self.state.borrow_mut();
        state.predicted_frames.push(frame_index);
        state.now + state.display_latency
    }

    fn time_in_seconds(&self) -> f64 {
        self.state.borrow().now
    }

    fn tracking_state(&mut self, _absolute_time: f64) -> TrackingState {
        let state = self.state.borrow();
        let mut tracking = TrackingState {
            head_pose: state.head_pose(),
            head_tracked: state.hmd_present,
            ..TrackingState::default()
        };
        for hand in 0..2 {
            if let Some(device) = state.devices.get(&(LEFT_HAND_ID + hand as u32)) {
                tracking.hand_poses[hand] = device.pose();
                tracking.hands_tracked[hand] = device.connected;
            }
        }
        tracking
    }

    fn eye_poses(&mut self, _frame_index: u64, hmd_to_eye: &[Posef; 2]) -> ([Posef; 2], f64) {
        let mut state = self.state.borrow_mut();
        state.record("ovr_GetEyePoses");
        state.pose_samples += 1;

        let head = state.head_pose().to_matrix();
        let mut poses = [Posef::default(); 2];
        for (pose, offset) in poses.iter_mut().zip(hmd_to_eye.iter()) {
            let eye = utils::multiply(&head, &offset.to_matrix());
            *pose = Posef {
                orientation: state.head_orientation,
                position: [eye[12], eye[13], eye[14]],
            };
        }
        (poses, state.now)
    }

    fn tracker_count(&self) -> u32 {
        self.state.borrow().devices.keys()
            .filter(|&&id| id >= FIRST_SENSOR_ID)
            .map(|&id| id - FIRST_SENSOR_ID + 1)
            .max()
            .unwrap_or(0)
    }

    fn tracker_pose(&self, index: u32) -> Option<Posef> {
        self.record("ovr_GetTrackerPose");
        let state = self.state.borrow();
        state.devices.get(&(FIRST_SENSOR_ID + index))
             .filter(|device| device.connected)
             .map(|device| device.pose())
    }

    fn create_texture_swap_chain(&mut self, size: Sizei) -> Result<SwapChainHandle, VRError> {
        self.record(&format!("ovr_CreateTextureSwapChainGL {}x{}", size.w, size.h));
        if self.state.borrow().fail_swap_chain {
            return Err(VRError::SwapChain("mock allocation failure".into()));
        }
        Ok(SWAP_CHAIN)
    }

    fn swap_chain_length(&self, _chain: SwapChainHandle) -> Result<u32, VRError> {
        Ok(self.state.borrow().swap_chain_length)
    }

    fn swap_chain_buffer(&self, _chain: SwapChainHandle, index: u32) -> Result<u32, VRError> {
        Ok(FIRST_CHAIN_TEXTURE + index)
    }

    fn swap_chain_current_index(&self, _chain: SwapChainHandle) -> Result<u32, VRError> {
        Ok(self.state.borrow().swap_chain_index)
    }

    fn commit_swap_chain(&mut self, _chain: SwapChainHandle) -> Result<(), VRError> {
        let mut state = self.state.borrow_mut();
        state.record("ovr_CommitTextureSwapChain");
        // The runtime owns the rotation
        if state.swap_chain_length > 0 {
            state.swap_chain_index = (state.swap_chain_index + 1) % state.swap_chain_length;
        }
        Ok(())
    }

    fn destroy_swap_chain(&mut self, _chain: SwapChainHandle) {
        self.record("ovr_DestroyTextureSwapChain");
    }

    fn submit_frame(&mut self, frame_index: u64, layer: &LayerEyeFov) -> Result<(), VRError> {
        let mut state = self.state.borrow_mut();
        state.record(&format!("ovr_SubmitFrame {} {:?} {:?}", frame_index, layer.viewports[0], layer.viewports[1]));
        if state.fail_submit {
            return Err(VRError::Compositor("mock submit failure".into()));
        }
        state.submitted_frames.push(frame_index);
        Ok(())
    }

    fn create_mirror_texture(&mut self, size: Sizei) -> Result<MirrorTextureHandle, VRError> {
        self.record(&format!("ovr_CreateMirrorTextureGL {}x{}", size.w, size.h));
        Ok(MIRROR)
    }

    fn mirror_texture_gl(&self, _mirror: MirrorTextureHandle) -> Result<u32, VRError> {
        Ok(MIRROR_GL_TEXTURE)
    }

    fn destroy_mirror_texture(&mut self, _mirror: MirrorTextureHandle) {
        self.record("ovr_DestroyMirrorTexture");
    }
}
