use super::runtime::{EyeRenderDesc, GraphicsLuid, HmdDesc, LayerEyeFov, MirrorTextureHandle, OculusRuntime, Posef, Sizei,
                     TrackingOrigin, TrackingState};
use super::swap_chain::OvrSwapChain;
use rust_hmd_api::utils;
use rust_hmd_api::{BackendState, FrameState, GraphicsDevicePtr, HmdConfig, Matrix4, MirrorTexture, ModelTexture,
                   PoseCache, ProjectionCache, RenderTargetSize, TrackedObjectType, VRBackend, VRBackendType, VREye,
                   VRError, MAX_TRACKED_OBJECTS};

/// Tracked object ids: the headset and both Touch controllers come first,
/// tracking sensors follow.
pub const HEAD_ID: u32 = 0;
pub const LEFT_HAND_ID: u32 = 1;
pub const RIGHT_HAND_ID: u32 = 2;
pub const FIRST_SENSOR_ID: u32 = 3;

/// Everything sampled from the runtime once per frame
#[derive(Debug, Clone)]
struct FrameSample {
    eye_poses: [Posef; 2],
    sensor_sample_time: f64,
    tracking: TrackingState,
    // Indexed by sensor, `None` while disconnected
    sensors: Vec<Option<Posef>>,
}

/// Backend for the Oculus PC runtime.
///
/// Renders into an application owned texture ring and submits one
/// `EyeFov` layer per frame.
pub struct OculusVRBackend {
    runtime: Box<dyn OculusRuntime>,
    graphics: GraphicsDevicePtr,
    state: BackendState,
    library_initialized: bool,
    session_luid: Option<GraphicsLuid>,
    hmd_desc: HmdDesc,
    eye_render_desc: [EyeRenderDesc; 2],
    swap_chain: Option<OvrSwapChain>,
    mirror: Option<(MirrorTextureHandle, MirrorTexture)>,
    near: f32,
    far: f32,
    poses: PoseCache<FrameSample>,
    projections: ProjectionCache,
    frame: FrameState,
}

impl OculusVRBackend {
    pub fn new(runtime: Box<dyn OculusRuntime>, graphics: GraphicsDevicePtr, config: &HmdConfig) -> OculusVRBackend {
        OculusVRBackend {
            runtime: runtime,
            graphics: graphics,
            state: BackendState::Uninitialized,
            library_initialized: false,
            session_luid: None,
            hmd_desc: HmdDesc::default(),
            eye_render_desc: [EyeRenderDesc::default(); 2],
            swap_chain: None,
            mirror: None,
            near: config.near_clip,
            far: config.far_clip,
            poses: PoseCache::new(),
            projections: ProjectionCache::new(),
            frame: FrameState::default(),
        }
    }

    // Opens the library and session once, later calls only recheck the adapter
    fn start_session(&mut self) -> Result<(), VRError> {
        let luid = match self.session_luid {
            Some(luid) => luid,
            None => {
                if !self.library_initialized {
                    self.runtime.initialize()?;
                    self.library_initialized = true;
                }
                let luid = self.runtime.create_session()?;
                self.session_luid = Some(luid);
                luid
            }
        };
        if luid != self.runtime.default_adapter_luid() {
            return Err(VRError::Initialization("OpenGL supports only the default graphics adapter".into()));
        }
        Ok(())
    }

    fn open_session(&mut self) -> Result<(), VRError> {
        self.start_session()?;
        self.hmd_desc = self.runtime.hmd_desc();
        info!("Oculus session started: {}", self.hmd_desc.product_name);

        for eye in VREye::BOTH.iter() {
            let fov = self.hmd_desc.default_eye_fov[eye.index()];
            self.eye_render_desc[eye.index()] = self.runtime.eye_render_desc(*eye, &fov);
        }
        self.runtime.set_tracking_origin(TrackingOrigin::FloorLevel)?;

        let size = self.ideal_render_target_size();
        let swap_chain = OvrSwapChain::new(&mut *self.runtime, &*self.graphics, size)
            .map_err(|e| VRError::SwapChain(format!("allocation failed: {}", e)))?;
        self.swap_chain = Some(swap_chain);
        Ok(())
    }

    fn ideal_render_target_size(&self) -> RenderTargetSize {
        let left = self.runtime.fov_texture_size(VREye::Left, &self.hmd_desc.default_eye_fov[0]);
        let right = self.runtime.fov_texture_size(VREye::Right, &self.hmd_desc.default_eye_fov[1]);
        RenderTargetSize::new(left.w + right.w, left.h)
    }

    fn ensure_initialized(&self, operation: &str) -> bool {
        match self.state {
            BackendState::Initialized => true,
            BackendState::Failed => {
                debug!("Oculus {} skipped, initialization failed", operation);
                false
            }
            _ => {
                error!("Oculus {} called while {:?}", operation, self.state);
                debug_assert!(false, "Oculus {} called while {:?}", operation, self.state);
                false
            }
        }
    }

    fn sensor_count(&self) -> u32 {
        self.runtime.tracker_count().min(MAX_TRACKED_OBJECTS - FIRST_SENSOR_ID)
    }

    // Samples eye poses, tracking state and sensors at most once per frame
    fn frame_sample(&mut self) -> &FrameSample {
        let sensor_count = self.sensor_count();
        let runtime = &mut self.runtime;
        let frame = &mut self.frame;
        let hmd_to_eye = [self.eye_render_desc[0].hmd_to_eye_pose, self.eye_render_desc[1].hmd_to_eye_pose];
        self.poses.get_or_sample(|| {
            frame.poses_fresh = true;
            let (eye_poses, sensor_sample_time) = runtime.eye_poses(frame.frame_index, &hmd_to_eye);
            let display_time = runtime.predicted_display_time(frame.frame_index);
            FrameSample {
                eye_poses: eye_poses,
                sensor_sample_time: sensor_sample_time,
                tracking: runtime.tracking_state(display_time),
                sensors: (0..sensor_count).map(|sensor| runtime.tracker_pose(sensor)).collect(),
            }
        })
    }

    fn object_pose(&mut self, id: u32) -> Result<Matrix4, VRError> {
        if id >= MAX_TRACKED_OBJECTS {
            return Err(VRError::InvalidTrackedObject(id));
        }
        let sample = self.frame_sample();
        let tracking = &sample.tracking;
        let pose = match id {
            HEAD_ID if tracking.head_tracked => tracking.head_pose,
            LEFT_HAND_ID | RIGHT_HAND_ID if tracking.hands_tracked[(id - LEFT_HAND_ID) as usize] => {
                tracking.hand_poses[(id - LEFT_HAND_ID) as usize]
            }
            HEAD_ID | LEFT_HAND_ID | RIGHT_HAND_ID => return Err(VRError::DeviceDisconnected(id)),
            _ => match sample.sensors.get((id - FIRST_SENSOR_ID) as usize) {
                Some(&Some(pose)) => pose,
                Some(&None) => return Err(VRError::DeviceDisconnected(id)),
                None => return Err(VRError::InvalidTrackedObject(id)),
            },
        };
        Ok(pose.to_matrix())
    }
}

impl Drop for OculusVRBackend {
    fn drop(&mut self) {
        if self.state != BackendState::Shutdown && (self.session_luid.is_some() || self.library_initialized) {
            self.shutdown();
        }
    }
}

impl VRBackend for OculusVRBackend {
    fn backend_type(&self) -> VRBackendType {
        VRBackendType::OculusVR
    }

    fn state(&self) -> BackendState {
        self.state
    }

    fn is_hmd_present(&mut self) -> bool {
        match self.start_session() {
            Ok(()) => true,
            Err(e) => {
                debug!("No Oculus headset available: {}", e);
                false
            }
        }
    }

    fn initialize(&mut self) -> bool {
        if self.state != BackendState::Uninitialized {
            error!("Oculus backend initialized twice");
            debug_assert!(false, "Oculus backend initialized twice");
            return false;
        }
        if !self.graphics.is_current() {
            error!("Error initializing Oculus: {}", VRError::ContextNotCurrent);
            debug_assert!(false, "Oculus initialized without a current context");
            return false;
        }

        match self.open_session() {
            Ok(()) => {
                self.state = BackendState::Initialized;
                true
            }
            Err(e) => {
                error!("Error initializing Oculus: {}", e);
                self.state = BackendState::Failed;
                false
            }
        }
    }

    fn shutdown(&mut self) {
        if self.state == BackendState::Shutdown {
            return;
        }
        // Textures go before the session that owns them
        if let Some((handle, _)) = self.mirror.take() {
            self.runtime.destroy_mirror_texture(handle);
        }
        if let Some(swap_chain) = self.swap_chain.take() {
            swap_chain.destroy(&mut *self.runtime, &*self.graphics);
        }
        if self.session_luid.take().is_some() {
            self.runtime.destroy_session();
        }
        if self.library_initialized {
            self.runtime.shutdown();
            self.library_initialized = false;
        }
        self.poses.invalidate();
        self.state = BackendState::Shutdown;
    }

    fn bind_framebuffer_object(&mut self, _hmd_id: u32) -> bool {
        if !self.ensure_initialized("bind_framebuffer_object") {
            return false;
        }
        let swap_chain = match self.swap_chain {
            Some(ref swap_chain) => swap_chain,
            None => return false,
        };
        match swap_chain.bind_current_chain_index_framebuffer(&*self.runtime, &*self.graphics) {
            Ok(_) => true,
            Err(e) => {
                error!("Error binding Oculus swap chain: {}", e);
                false
            }
        }
    }

    fn refresh_rate(&self, _hmd_id: u32) -> f32 {
        self.hmd_desc.display_refresh_rate
    }

    fn render_target_size(&self) -> RenderTargetSize {
        match self.swap_chain {
            Some(ref swap_chain) => swap_chain.size(),
            None if self.session_luid.is_some() => self.ideal_render_target_size(),
            None => RenderTargetSize::default(),
        }
    }

    fn time_until_next_frame(&self) -> i32 {
        if self.session_luid.is_none() {
            return 0;
        }
        let display_time = self.runtime.predicted_display_time(self.frame.frame_index.saturating_sub(1));
        utils::millis_until(display_time, self.runtime.time_in_seconds())
    }

    fn head_pose(&mut self, _hmd_id: u32) -> Matrix4 {
        if !self.ensure_initialized("head_pose") {
            return identity_matrix!();
        }
        self.object_pose(HEAD_ID).unwrap_or_else(|e| {
            debug!("No head pose this frame: {}", e);
            identity_matrix!()
        })
    }

    fn eye_matrices(&mut self, left: &mut Matrix4, right: &mut Matrix4) {
        if !self.ensure_initialized("eye_matrices") {
            return;
        }
        let eye_poses = self.frame_sample().eye_poses;
        *left = utils::rigid_inverse(&eye_poses[VREye::Left.index()].to_matrix());
        *right = utils::rigid_inverse(&eye_poses[VREye::Right.index()].to_matrix());
    }

    fn projection_matrices(&mut self, left: &mut Matrix4, right: &mut Matrix4) {
        if !self.ensure_initialized("projection_matrices") {
            return;
        }
        let fov = self.hmd_desc.default_eye_fov;
        let pair = self.projections.get_or_compute(self.near, self.far, |near, far| {
            [fov[0].projection(near, far), fov[1].projection(near, far)]
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
        let sample = self.frame_sample();
        let mut ids = Vec::new();
        if sample.tracking.head_tracked {
            ids.push(HEAD_ID);
        }
        for hand in 0..2 {
            if sample.tracking.hands_tracked[hand] {
                ids.push(LEFT_HAND_ID + hand as u32);
            }
        }
        ids.extend(sample.sensors.iter()
                         .enumerate()
                         .filter(|&(_, pose)| pose.is_some())
                         .map(|(sensor, _)| FIRST_SENSOR_ID + sensor as u32));
        ids
    }

    fn tracked_object(&mut self, id: u32, transform: &mut Matrix4) -> bool {
        if !self.ensure_initialized("tracked_object") {
            return false;
        }
        match self.object_pose(id) {
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
        match id {
            HEAD_ID => TrackedObjectType::Head,
            LEFT_HAND_ID => TrackedObjectType::LeftHand,
            RIGHT_HAND_ID => TrackedObjectType::RightHand,
            _ if id - FIRST_SENSOR_ID < self.sensor_count() => TrackedObjectType::LighthouseOrSensor,
            _ => TrackedObjectType::Other,
        }
    }

    fn tracked_object_model(&mut self,
                            id: u32,
                            _vertices: &mut Vec<f32>,
                            _indices: &mut Vec<u32>,
                            _texture: &mut ModelTexture) -> bool {
        warn!("Oculus runtime provides no render model for tracked object {}", id);
        false
    }

    fn swap_to_headset(&mut self) {
        if !self.ensure_initialized("swap_to_headset") {
            return;
        }
        let swap_chain = match self.swap_chain {
            Some(ref swap_chain) => swap_chain,
            None => {
                error!("Oculus swap_to_headset without a swap chain");
                return;
            }
        };

        if let Err(e) = swap_chain.commit(&mut *self.runtime) {
            error!("Error committing Oculus swap chain: {}", e);
        }

        // Poses the image was rendered with; sampled now if nobody asked this frame
        let (eye_poses, sensor_sample_time) = match self.poses.cached() {
            Some(sample) => (sample.eye_poses, sample.sensor_sample_time),
            None => {
                warn!("Submitting an Oculus frame rendered without eye poses");
                let sample = self.frame_sample();
                (sample.eye_poses, sample.sensor_sample_time)
            }
        };
        let swap_chain = match self.swap_chain {
            Some(ref swap_chain) => swap_chain,
            None => return,
        };
        let layer = LayerEyeFov {
            color_texture: swap_chain.handle(),
            viewports: swap_chain.size().eye_viewports(),
            fov: self.hmd_desc.default_eye_fov,
            render_poses: eye_poses,
            sensor_sample_time: sensor_sample_time,
            texture_origin_at_bottom_left: true,
        };

        match self.runtime.submit_frame(self.frame.frame_index, &layer) {
            Ok(()) => self.frame.advance(),
            Err(e) => {
                error!("Error submitting Oculus frame: {}", e);
                self.frame.poses_fresh = false;
            }
        }
        self.poses.invalidate();
    }

    fn mirror_texture(&mut self, texture: &mut MirrorTexture) -> bool {
        if !self.ensure_initialized("mirror_texture") {
            return false;
        }
        if let Some((_, mirror)) = self.mirror {
            *texture = mirror;
            return true;
        }

        let size = self.render_target_size();
        let result = self.runtime.create_mirror_texture(Sizei { w: size.width, h: size.height })
            .and_then(|handle| match self.runtime.mirror_texture_gl(handle) {
                Ok(texture_id) => Ok((handle, texture_id)),
                Err(e) => {
                    self.runtime.destroy_mirror_texture(handle);
                    Err(e)
                }
            });
        match result {
            Ok((handle, texture_id)) => {
                let mirror = MirrorTexture {
                    texture_id: texture_id,
                    width: size.width,
                    height: size.height,
                };
                self.mirror = Some((handle, mirror));
                *texture = mirror;
                true
            }
            Err(e) => {
                error!("Error creating Oculus mirror texture: {}", e);
                false
            }
        }
    }

    fn frame_state(&self) -> FrameState {
        self.frame
    }
}
