use super::MockVRState;
use crate::api::openvr::runtime::{ControllerRole, HmdMatrix34, HmdMatrix44, OpenVRRuntime, RawRenderModel,
                                  RawTexture, RuntimeEvent, StringProperty, TextureBounds, TrackedDeviceClass,
                                  TrackedDevicePose, MAX_TRACKED_DEVICE_COUNT, TRACKED_DEVICE_INDEX_HMD};
use rust_hmd_api::{utils, Matrix4, VREvent, VREye, VRError};
use std::cell::RefCell;
use std::rc::Rc;

fn rows_3x4(m: &Matrix4) -> HmdMatrix34 {
    [[m[0], m[4], m[8], m[12]],
     [m[1], m[5], m[9], m[13]],
     [m[2], m[6], m[10], m[14]]]
}

fn rows_4x4(m: &Matrix4) -> HmdMatrix44 {
    [[m[0], m[4], m[8], m[12]],
     [m[1], m[5], m[9], m[13]],
     [m[2], m[6], m[10], m[14]],
     [m[3], m[7], m[11], m[15]]]
}

/// Simulates an HTC Vive style runtime
pub struct MockOpenVRRuntime {
    state: Rc<RefCell<MockVRState>>,
}

impl MockOpenVRRuntime {
    pub fn new(state: Rc<RefCell<MockVRState>>) -> MockOpenVRRuntime {
        MockOpenVRRuntime {
            state: state,
        }
    }

    fn record(&self, call: &str) {
        self.state.borrow_mut().record(call);
    }
}

impl OpenVRRuntime for MockOpenVRRuntime {
    fn is_runtime_installed(&self) -> bool {
        self.state.borrow().runtime_installed
    }

    fn is_hmd_present(&self) -> bool {
        self.state.borrow().hmd_present
    }

    fn init(&mut self) -> Result<(), VRError> {
        self.record("VR_Init");
        let state = self.state.borrow();
        if !state.runtime_installed {
            return Err(VRError::RuntimeNotInstalled);
        }
        if !state.hmd_present {
            return Err(VRError::HmdNotPresent);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.record("VR_Shutdown");
    }

    fn string_property(&self, device: u32, property: StringProperty) -> Option<String> {
        let state = self.state.borrow();
        match property {
            StringProperty::TrackingSystemName => Some("mock".into()),
            StringProperty::SerialNumber => Some(format!("MOCK-{:04}", device)),
            StringProperty::RenderModelName => state.devices.get(&device).and_then(|d| d.render_model.clone()),
        }
    }

    fn display_frequency(&self) -> Option<f32> {
        Some(self.state.borrow().refresh_rate)
    }

    fn recommended_render_target_size(&self) -> (u32, u32) {
        self.state.borrow().eye_render_size
    }

    fn eye_to_head_transform(&self, eye: VREye) -> HmdMatrix34 {
        let half_ipd = self.state.borrow().ipd / 2.0;
        let x = match eye {
            VREye::Left => -half_ipd,
            VREye::Right => half_ipd,
        };
        rows_3x4(&utils::translation_matrix(x, 0.0, 0.0))
    }

    fn projection_matrix(&self, eye: VREye, near: f32, far: f32) -> HmdMatrix44 {
        self.record("GetProjectionMatrix");
        // Slightly asymmetric like a real lens
        let (left, right) = match eye {
            VREye::Left => (1.39, 1.24),
            VREye::Right => (1.24, 1.39),
        };
        rows_4x4(&utils::frustum_from_tangents(1.47, 1.47, left, right, near, far))
    }

    fn wait_get_poses(&mut self) -> Result<Vec<TrackedDevicePose>, VRError> {
        let mut state = self.state.borrow_mut();
        state.record("WaitGetPoses");
        state.pose_samples += 1;

        let mut poses = vec![TrackedDevicePose::default(); MAX_TRACKED_DEVICE_COUNT];
        if state.hmd_present {
            let head = state.head_pose().to_matrix();
            poses[TRACKED_DEVICE_INDEX_HMD as usize] = TrackedDevicePose {
                device_to_absolute_tracking: rows_3x4(&head),
                pose_is_valid: true,
                device_is_connected: true,
            };
        }
        for (&id, device) in state.devices.iter() {
            if let Some(pose) = poses.get_mut(id as usize) {
                *pose = TrackedDevicePose {
                    device_to_absolute_tracking: rows_3x4(&device.pose().to_matrix()),
                    pose_is_valid: device.connected,
                    device_is_connected: device.connected,
                };
            }
        }
        Ok(poses)
    }

    fn device_class(&self, device: u32) -> TrackedDeviceClass {
        let state = self.state.borrow();
        if device == TRACKED_DEVICE_INDEX_HMD && state.hmd_present {
            return TrackedDeviceClass::Hmd;
        }
        match state.devices.get(&device) {
            Some(d) => TrackedDeviceClass::from_raw(d.class),
            None => TrackedDeviceClass::Invalid,
        }
    }

    fn controller_role(&self, device: u32) -> ControllerRole {
        self.state.borrow().devices.get(&device).map(|d| d.role).unwrap_or(ControllerRole::Invalid)
    }

    fn load_render_model(&mut self, name: &str) -> Result<Option<RawRenderModel>, VRError> {
        let mut state = self.state.borrow_mut();
        state.record("LoadRenderModel");
        let model = match state.render_models.get_mut(name) {
            Some(model) => model,
            None => return Err(VRError::RenderModel(format!("unknown render model {}", name))),
        };
        if model.fail {
            return Err(VRError::RenderModel(format!("{} failed to load", name)));
        }
        if model.loading_polls > 0 {
            model.loading_polls -= 1;
            return Ok(None);
        }
        Ok(Some(model.model.clone()))
    }

    fn load_texture(&mut self, texture_id: i32) -> Result<Option<RawTexture>, VRError> {
        let mut state = self.state.borrow_mut();
        state.record("LoadTexture");
        state.render_models.values()
             .find(|model| model.model.diffuse_texture_id == Some(texture_id))
             .map(|model| Some(model.texture.clone()))
             .ok_or_else(|| VRError::RenderModel(format!("unknown texture {}", texture_id)))
    }

    fn time_since_last_vsync(&self) -> Option<f32> {
        self.state.borrow().time_since_vsync
    }

    fn submit(&mut self, eye: VREye, texture_id: u32, bounds: &TextureBounds) -> Result<(), VRError> {
        let mut state = self.state.borrow_mut();
        state.record(&format!("Submit {:?} {} {} {} {} {}", eye, texture_id,
                              bounds.u_min, bounds.v_min, bounds.u_max, bounds.v_max));
        if state.fail_submit {
            return Err(VRError::Compositor("mock submit failure".into()));
        }
        Ok(())
    }

    fn post_present_handoff(&mut self) {
        let mut state = self.state.borrow_mut();
        state.record("PostPresentHandoff");
        let frame = state.submitted_frames.len() as u64;
        state.submitted_frames.push(frame);
    }

    fn poll_next_event(&mut self) -> Option<RuntimeEvent> {
        let event = self.state.borrow_mut().events.pop_front()?;
        Some(match event {
            VREvent::TrackedObjectActivated(id) => RuntimeEvent::TrackedDeviceActivated(id),
            VREvent::TrackedObjectDeactivated(id) => RuntimeEvent::TrackedDeviceDeactivated(id),
            VREvent::TrackedObjectUpdated(id) => RuntimeEvent::TrackedDeviceUpdated(id),
        })
    }
}
