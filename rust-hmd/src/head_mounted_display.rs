use crate::scene::Scene;
use crate::vr_manager::VRBackendManager;
use rust_hmd_api::utils;
use rust_hmd_api::{GraphicsDevicePtr, HmdConfig, Matrix4, RenderTargetSize, VRBackendPtr, VRBackendType, VRError,
                   VREvent, VRViewport};

/// Draws the scene into the bound headset render target.
pub trait SceneRenderer {
    /// Called with the headset framebuffer bound, once per frame.
    /// `viewports` are the left and right halves of the render target.
    fn render(&mut self, viewports: &[VRViewport; 2], scene: Option<&Scene>);
}

impl<F: FnMut(&[VRViewport; 2], Option<&Scene>)> SceneRenderer for F {
    fn render(&mut self, viewports: &[VRViewport; 2], scene: Option<&Scene>) {
        (*self)(viewports, scene)
    }
}

/// Outcome of one `render_frame` call, used to schedule the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Frames handed to the compositor so far
    pub frame_index: u64,
    /// Advisory delay before the next frame should start
    pub next_frame_in_ms: i32,
    /// Time available for background work before the next frame
    pub incubation_budget_ms: i32,
    /// Milliseconds since the epoch when the frame was submitted
    pub timestamp: f64,
    pub events: Vec<VREvent>,
}

/// Drives one headset: owns the backend handle and runs the per-frame sequence
/// on the thread that owns the graphics context.
pub struct HeadMountedDisplay {
    backend: VRBackendPtr,
    graphics: GraphicsDevicePtr,
    config: HmdConfig,
    render_target_size: RenderTargetSize,
    scene: Option<Scene>,
}

impl HeadMountedDisplay {
    pub fn new(manager: &VRBackendManager,
               graphics: GraphicsDevicePtr,
               config: HmdConfig) -> Result<HeadMountedDisplay, VRError> {
        if !graphics.make_current() {
            return Err(VRError::ContextNotCurrent);
        }

        let backend = match config.backend {
            Some(backend_type) => open_backend(manager, backend_type, &graphics, &config)?,
            None => {
                let installed = VRBackendType::AUTO_SELECT_ORDER.iter().any(|t| manager.is_runtime_installed(*t));
                if !installed {
                    return Err(VRError::RuntimeNotInstalled);
                }
                manager.select_backend(graphics.clone(), &config).ok_or(VRError::HmdNotPresent)?
            }
        };

        let render_target_size = {
            let mut backend = backend.borrow_mut();
            if !backend.initialize() {
                return Err(VRError::Initialization(format!("{} backend failed to initialize",
                                                           backend.backend_type())));
            }
            backend.set_clip_planes(config.near_clip, config.far_clip);
            backend.render_target_size()
        };
        info!("Headset render target {}x{}", render_target_size.width, render_target_size.height);

        Ok(HeadMountedDisplay {
            backend: backend,
            graphics: graphics,
            config: config,
            render_target_size: render_target_size,
            scene: None,
        })
    }

    /// Handle to inject into scene consumers
    pub fn backend(&self) -> VRBackendPtr {
        self.backend.clone()
    }

    pub fn render_target_size(&self) -> RenderTargetSize {
        self.render_target_size
    }

    pub fn config(&self) -> &HmdConfig {
        &self.config
    }

    pub fn refresh_rate(&self) -> f32 {
        self.backend.borrow().refresh_rate(self.config.hmd_id)
    }

    /// Attaches the scene whose camera follows the headset
    pub fn set_scene(&mut self, mut scene: Scene) {
        let (left, right) = self.projections();
        scene.camera_mut().set_projections(left, right);
        self.scene = Some(scene);
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    /// Updates the clip planes of the backend and the scene camera
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.config.near_clip = near;
        self.config.far_clip = far;
        self.backend.borrow_mut().set_clip_planes(near, far);
        let (left, right) = self.projections();
        if let Some(scene) = self.scene.as_mut() {
            scene.camera_mut().set_projections(left, right);
        }
    }

    /// Renders and submits one frame.
    ///
    /// Binds the headset target, renders, samples the eye poses once, updates
    /// the camera, restores the default framebuffer, submits, and reports when
    /// the next frame is due.
    pub fn render_frame<R: SceneRenderer + ?Sized>(&mut self, renderer: &mut R) -> FrameReport {
        let hmd_id = self.config.hmd_id;
        if !self.backend.borrow_mut().bind_framebuffer_object(hmd_id) {
            warn!("Rendering frame without a headset render target");
        }

        renderer.render(&self.render_target_size.eye_viewports(), self.scene.as_ref());

        let mut left = identity_matrix!();
        let mut right = identity_matrix!();
        self.backend.borrow_mut().eye_matrices(&mut left, &mut right);
        let (left_projection, right_projection) = self.projections();
        if let Some(scene) = self.scene.as_mut() {
            let camera = scene.camera_mut();
            camera.set_eye_transforms(left, right);
            camera.set_projections(left_projection, right_projection);
            scene.sync_tracked_objects();
        }

        self.graphics.bind_framebuffer(0);

        let (frame_index, next_frame_in_ms, events) = {
            let mut backend = self.backend.borrow_mut();
            backend.swap_to_headset();
            (backend.frame_state().frame_index, backend.time_until_next_frame(), backend.poll_events())
        };
        let incubation_budget_ms = utils::incubation_budget(next_frame_in_ms, self.config.incubation_margin_ms);
        trace!("Frame {} submitted, next in {} ms", frame_index, next_frame_in_ms);

        FrameReport {
            frame_index: frame_index,
            next_frame_in_ms: next_frame_in_ms,
            incubation_budget_ms: incubation_budget_ms,
            timestamp: utils::timestamp(),
            events: events,
        }
    }

    /// Ends the vendor session. The scene is dropped first so no consumer
    /// queries a closed backend.
    pub fn shutdown(&mut self) {
        self.scene = None;
        if !self.graphics.make_current() {
            warn!("Shutting down the headset without a current context");
        }
        self.backend.borrow_mut().shutdown();
    }

    fn projections(&self) -> (Matrix4, Matrix4) {
        let mut left = identity_matrix!();
        let mut right = identity_matrix!();
        self.backend.borrow_mut().projection_matrices(&mut left, &mut right);
        (left, right)
    }
}

fn open_backend(manager: &VRBackendManager,
                backend_type: VRBackendType,
                graphics: &GraphicsDevicePtr,
                config: &HmdConfig) -> Result<VRBackendPtr, VRError> {
    if !manager.is_runtime_installed(backend_type) {
        return Err(VRError::RuntimeNotInstalled);
    }
    let backend = manager.create_backend(backend_type, graphics.clone(), config).ok_or(VRError::NoBackend)?;
    let present = backend.borrow_mut().is_hmd_present();
    if !present {
        return Err(VRError::HmdNotPresent);
    }
    Ok(backend)
}
