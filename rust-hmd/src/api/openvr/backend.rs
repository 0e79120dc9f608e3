use super::runtime::{ControllerRole, OpenVRRuntime, RawRenderModel, RawTexture, RuntimeEvent, StringProperty,
                     TextureBounds, TrackedDeviceClass, TrackedDevicePose, MAX_TRACKED_DEVICE_COUNT,
                     TRACKED_DEVICE_INDEX_HMD};
use crate::framebuffer::Framebuffer;
use rust_hmd_api::utils;
use rust_hmd_api::vr_framebuffer::normalized_eye_rect;
use rust_hmd_api::vr_tracked_object::VERTEX_STRIDE;
use rust_hmd_api::{BackendState, FrameState, GraphicsDevicePtr, HmdConfig, Matrix4, ModelTexture, PoseCache,
                   ProjectionCache, RenderModel, RenderTargetSize, TrackedObjectType, VRBackend, VRBackendType,
                   VREvent, VREye, VRError};
use std::collections::HashMap;
use std::time::Duration;

/// Used when the headset does not report its display frequency
const DEFAULT_REFRESH_RATE: f32 = 90.0;

/// Backend for SteamVR and other OpenVR runtimes.
///
/// Renders both eyes into one persistent framebuffer and lets the
/// compositor handle double buffering.
pub struct OpenVRBackend {
    runtime: Box<dyn OpenVRRuntime>,
    graphics: GraphicsDevicePtr,
    state: BackendState,
    session_open: bool,
    framebuffer: Option<Framebuffer>,
    render_target_size: RenderTargetSize,
    refresh_rate: f32,
    // inverse(eyeToHead) per eye
    eye_offsets: [Matrix4; 2],
    near: f32,
    far: f32,
    poses: PoseCache<Vec<TrackedDevicePose>>,
    projections: ProjectionCache,
    frame: FrameState,
    models: HashMap<u32, RenderModel>,
    model_timeout: Duration,
}

impl OpenVRBackend {
    pub fn new(runtime: Box<dyn OpenVRRuntime>, graphics: GraphicsDevicePtr, config: &HmdConfig) -> OpenVRBackend {
        OpenVRBackend {
            runtime: runtime,
            graphics: graphics,
            state: BackendState::Uninitialized,
            session_open: false,
            framebuffer: None,
            render_target_size: RenderTargetSize::default(),
            refresh_rate: DEFAULT_REFRESH_RATE,
            eye_offsets: [identity_matrix!(), identity_matrix!()],
            near: config.near_clip,
            far: config.far_clip,
            poses: PoseCache::new(),
            projections: ProjectionCache::new(),
            frame: FrameState::default(),
            models: HashMap::new(),
            model_timeout: Duration::from_millis(config.render_model_timeout_ms),
        }
    }

    fn open_session(&mut self) -> Result<(), VRError> {
        self.runtime.init()?;
        self.session_open = true;

        let system_name = self.runtime.string_property(TRACKED_DEVICE_INDEX_HMD, StringProperty::TrackingSystemName);
        let serial = self.runtime.string_property(TRACKED_DEVICE_INDEX_HMD, StringProperty::SerialNumber);
        info!("OpenVR session started: {} {}", system_name.unwrap_or_default(), serial.unwrap_or_default());

        for eye in VREye::BOTH.iter() {
            let eye_to_head = utils::matrix_from_rows_3x4(&self.runtime.eye_to_head_transform(*eye));
            self.eye_offsets[eye.index()] = utils::rigid_inverse(&eye_to_head);
        }

        self.refresh_rate = self.runtime.display_frequency().filter(|&hz| hz > 0.0).unwrap_or_else(|| {
            warn!("Display frequency unavailable, assuming {} Hz", DEFAULT_REFRESH_RATE);
            DEFAULT_REFRESH_RATE
        });

        let (eye_width, eye_height) = self.runtime.recommended_render_target_size();
        self.render_target_size = RenderTargetSize::side_by_side(eye_width, eye_height);
        self.framebuffer = Some(Framebuffer::new(&*self.graphics, self.render_target_size)?);
        Ok(())
    }

    fn ensure_initialized(&self, operation: &str) -> bool {
        match self.state {
            BackendState::Initialized => true,
            BackendState::Failed => {
                debug!("OpenVR {} skipped, initialization failed", operation);
                false
            }
            _ => {
                error!("OpenVR {} called while {:?}", operation, self.state);
                debug_assert!(false, "OpenVR {} called while {:?}", operation, self.state);
                false
            }
        }
    }

    // Samples the vendor at most once per frame
    fn render_poses(&mut self) -> &[TrackedDevicePose] {
        let runtime = &mut self.runtime;
        let frame = &mut self.frame;
        self.poses.get_or_sample(|| {
            frame.poses_fresh = true;
            runtime.wait_get_poses().unwrap_or_else(|e| {
                warn!("WaitGetPoses failed: {}", e);
                vec![TrackedDevicePose::default(); MAX_TRACKED_DEVICE_COUNT]
            })
        })
    }

    fn device_pose(&mut self, id: u32) -> Result<Matrix4, VRError> {
        let pose = match self.render_poses().get(id as usize) {
            Some(pose) => *pose,
            None => return Err(VRError::InvalidTrackedObject(id)),
        };
        if !pose.device_is_connected {
            return Err(VRError::DeviceDisconnected(id));
        }
        if !pose.pose_is_valid {
            return Err(VRError::InvalidTrackedObject(id));
        }
        Ok(utils::matrix_from_rows_3x4(&pose.device_to_absolute_tracking))
    }

    fn load_render_model(&mut self, id: u32) -> Result<RenderModel, VRError> {
        let name = self.runtime.string_property(id, StringProperty::RenderModelName)
                       .filter(|name| !name.is_empty())
                       .ok_or_else(|| VRError::RenderModel(format!("tracked object {} has no render model", id)))?;
        debug!("Loading render model {} for tracked object {}", name, id);

        let runtime = &mut self.runtime;
        let raw = utils::poll_until_ready(self.model_timeout, || runtime.load_render_model(&name))?;
        let texture = match raw.diffuse_texture_id {
            Some(texture_id) => utils::poll_until_ready(self.model_timeout, || runtime.load_texture(texture_id))?,
            None => RawTexture::default(),
        };
        Ok(convert_render_model(&raw, &texture))
    }
}

fn convert_render_model(raw: &RawRenderModel, texture: &RawTexture) -> RenderModel {
    let mut vertices = Vec::with_capacity(raw.vertices.len() * VERTEX_STRIDE);
    for vertex in &raw.vertices {
        vertices.extend_from_slice(&vertex.position);
        vertices.extend_from_slice(&vertex.normal);
        vertices.extend_from_slice(&vertex.texture_coord);
    }

    RenderModel {
        vertices: vertices,
        indices: raw.indices.iter().map(|&i| i as u32).collect(),
        texture: ModelTexture {
            width: texture.width as u32,
            height: texture.height as u32,
            rgba: texture.rgba.clone(),
        },
    }
}

fn object_type(class: TrackedDeviceClass, role: ControllerRole) -> TrackedObjectType {
    match class {
        TrackedDeviceClass::Hmd => TrackedObjectType::Head,
        TrackedDeviceClass::Controller => match role {
            ControllerRole::LeftHand => TrackedObjectType::LeftHand,
            ControllerRole::RightHand => TrackedObjectType::RightHand,
            ControllerRole::Invalid => TrackedObjectType::Other,
        },
        TrackedDeviceClass::TrackingReference => TrackedObjectType::LighthouseOrSensor,
        _ => TrackedObjectType::Other,
    }
}

impl Drop for OpenVRBackend {
    fn drop(&mut self) {
        // Also covers a partially failed initialize
        if self.state != BackendState::Shutdown && (self.session_open || self.framebuffer.is_some()) {
            self.shutdown();
        }
    }
}

impl VRBackend for OpenVRBackend {
    fn backend_type(&self) -> VRBackendType {
        VRBackendType::OpenVR
    }

    fn state(&self) -> BackendState {
        self.state
    }

    fn is_hmd_present(&mut self) -> bool {
        self.runtime.is_hmd_present()
    }

    fn initialize(&mut self) -> bool {
        if self.state != BackendState::Uninitialized {
            error!("OpenVR backend initialized twice");
            debug_assert!(false, "OpenVR backend initialized twice");
            return false;
        }
        if !self.graphics.is_current() {
            error!("Error initializing OpenVR: {}", VRError::ContextNotCurrent);
            debug_assert!(false, "OpenVR initialized without a current context");
            return false;
        }

        match self.open_session() {
            Ok(()) => {
                self.state = BackendState::Initialized;
                true
            }
            Err(e) => {
                error!("Error initializing OpenVR: {}", e);
                self.state = BackendState::Failed;
                false
            }
        }
    }

    fn shutdown(&mut self) {
        if self.state == BackendState::Shutdown {
            return;
        }
        // Session ends before the render target goes away
        if self.session_open {
            self.runtime.shutdown();
            self.session_open = false;
        }
        if let Some(framebuffer) = self.framebuffer.take() {
            framebuffer.delete(&*self.graphics);
        }
        self.poses.invalidate();
        self.state = BackendState::Shutdown;
    }

    fn bind_framebuffer_object(&mut self, _hmd_id: u32) -> bool {
        if !self.ensure_initialized("bind_framebuffer_object") {
            return false;
        }
        match self.framebuffer {
            Some(ref framebuffer) => {
                framebuffer.bind(&*self.graphics);
                true
            }
            None => false,
        }
    }

    fn refresh_rate(&self, _hmd_id: u32) -> f32 {
        self.refresh_rate
    }

    fn render_target_size(&self) -> RenderTargetSize {
        self.render_target_size
    }

    fn time_until_next_frame(&self) -> i32 {
        let frame_duration = 1.0 / self.refresh_rate as f64;
        match self.runtime.time_since_last_vsync() {
            Some(since_vsync) => utils::millis_until(frame_duration, since_vsync as f64),
            None => utils::millis_until(frame_duration, 0.0),
        }
    }

    fn head_pose(&mut self, hmd_id: u32) -> Matrix4 {
        if !self.ensure_initialized("head_pose") {
            return identity_matrix!();
        }
        self.device_pose(hmd_id).unwrap_or_else(|e| {
            debug!("No head pose this frame: {}", e);
            identity_matrix!()
        })
    }

    fn eye_matrices(&mut self, left: &mut Matrix4, right: &mut Matrix4) {
        if !self.ensure_initialized("eye_matrices") {
            return;
        }
        let head = self.head_pose(TRACKED_DEVICE_INDEX_HMD);
        let view = utils::rigid_inverse(&head);
        *left = utils::multiply(&self.eye_offsets[VREye::Left.index()], &view);
        *right = utils::multiply(&self.eye_offsets[VREye::Right.index()], &view);
    }

    fn projection_matrices(&mut self, left: &mut Matrix4, right: &mut Matrix4) {
        if !self.ensure_initialized("projection_matrices") {
            return;
        }
        let runtime = &self.runtime;
        let pair = self.projections.get_or_compute(self.near, self.far, |near, far| {
            [utils::matrix_from_rows_4x4(&runtime.projection_matrix(VREye::Left, near, far)),
             utils::matrix_from_rows_4x4(&runtime.projection_matrix(VREye::Right, near, far))]
        });
        *left = pair[0];
        *right = pair[1];
    }

    fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
    }

    fn currently_tracked_objects(&mut self) -> Vec<u32> {
        if !self.ensure_initialized("currently_tracked_objects") {
            return Vec::new();
        }
        self.render_poses().iter()
            .enumerate()
            .filter(|&(_, pose)| pose.device_is_connected && pose.pose_is_valid)
            .map(|(id, _)| id as u32)
            .collect()
    }

    fn tracked_object(&mut self, id: u32, transform: &mut Matrix4) -> bool {
        if !self.ensure_initialized("tracked_object") {
            return false;
        }
        match self.device_pose(id) {
            Ok(pose) => {
                *transform = pose;
                true
            }
            Err(e) => {
                warn!("Tracked object query failed: {}", e);
                false
            }
        }
    }

    fn tracked_object_type(&mut self, id: u32) -> TrackedObjectType {
        if id as usize >= MAX_TRACKED_DEVICE_COUNT {
            warn!("{}", VRError::InvalidTrackedObject(id));
            return TrackedObjectType::Other;
        }
        object_type(self.runtime.device_class(id), self.runtime.controller_role(id))
    }

    fn tracked_object_model(&mut self,
                            id: u32,
                            vertices: &mut Vec<f32>,
                            indices: &mut Vec<u32>,
                            texture: &mut ModelTexture) -> bool {
        if !self.ensure_initialized("tracked_object_model") {
            return false;
        }
        if let Some(model) = self.models.get(&id) {
            model.write_to(vertices, indices, texture);
            return true;
        }

        match self.load_render_model(id) {
            Ok(model) => {
                model.write_to(vertices, indices, texture);
                self.models.insert(id, model);
                true
            }
            Err(e) => {
                error!("Error loading render model of tracked object {}: {}", id, e);
                false
            }
        }
    }

    fn swap_to_headset(&mut self) {
        if !self.ensure_initialized("swap_to_headset") {
            return;
        }
        if let Some(ref framebuffer) = self.framebuffer {
            for eye in VREye::BOTH.iter() {
                let bounds = TextureBounds::from_rect(&normalized_eye_rect(*eye));
                if let Err(e) = self.runtime.submit(*eye, framebuffer.texture_id(), &bounds) {
                    error!("Error submitting {:?} eye: {}", eye, e);
                }
            }
            self.runtime.post_present_handoff();
        }
        self.poses.invalidate();
        self.frame.advance();
    }

    fn poll_events(&mut self) -> Vec<VREvent> {
        let mut events = Vec::new();
        while let Some(event) = self.runtime.poll_next_event() {
            match event {
                RuntimeEvent::TrackedDeviceActivated(id) => {
                    debug!("Tracked device {} activated", id);
                    events.push(VREvent::TrackedObjectActivated(id));
                }
                RuntimeEvent::TrackedDeviceDeactivated(id) => {
                    debug!("Tracked device {} deactivated", id);
                    events.push(VREvent::TrackedObjectDeactivated(id));
                }
                RuntimeEvent::TrackedDeviceUpdated(id) => {
                    events.push(VREvent::TrackedObjectUpdated(id));
                }
                RuntimeEvent::Other(_) => {}
            }
        }
        events
    }

    fn frame_state(&self) -> FrameState {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controllers_map_by_role() {
        assert_eq!(object_type(TrackedDeviceClass::Controller, ControllerRole::LeftHand), TrackedObjectType::LeftHand);
        assert_eq!(object_type(TrackedDeviceClass::Controller, ControllerRole::RightHand), TrackedObjectType::RightHand);
        assert_eq!(object_type(TrackedDeviceClass::Controller, ControllerRole::Invalid), TrackedObjectType::Other);
        assert_eq!(object_type(TrackedDeviceClass::GenericTracker, ControllerRole::Invalid), TrackedObjectType::Other);
        assert_eq!(object_type(TrackedDeviceClass::Unknown(99), ControllerRole::Invalid), TrackedObjectType::Other);
    }

    #[test]
    fn render_model_vertices_are_interleaved() {
        let raw = RawRenderModel {
            vertices: vec![super::super::runtime::RenderModelVertex {
                position: [1.0, 2.0, 3.0],
                normal: [0.0, 1.0, 0.0],
                texture_coord: [0.25, 0.75],
            }],
            indices: vec![0, 0, 0],
            diffuse_texture_id: None,
        };
        let model = convert_render_model(&raw, &RawTexture::default());
        assert_eq!(model.vertices, vec![1.0, 2.0, 3.0, 0.0, 1.0, 0.0, 0.25, 0.75]);
        assert_eq!(model.indices, vec![0, 0, 0]);
        assert_eq!(model.vertex_count(), 1);
    }
}
