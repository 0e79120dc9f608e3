#![cfg(feature = "mock")]

mod common;

use common::{assert_near, init_logging, position_of, transform_point};
use rust_hmd::api::mock::{MockBackendCreator, MockGraphicsDevice, MockVRControlMsg, MockVRRemote};
use rust_hmd::{GraphicsDevice, HeadMountedDisplay, HmdConfig, RenderTargetSize, Scene, SceneRenderer, TrackedObjectType,
               VRBackendManager, VRBackendType, VREvent, VREye, VRError, VRViewport};
use std::rc::Rc;

/// Records what the frame driver hands to the renderer
struct RecordingRenderer {
    gl: Rc<MockGraphicsDevice>,
    viewports: Vec<[VRViewport; 2]>,
    bound_while_rendering: Vec<u32>,
    frames_with_scene: usize,
}

impl RecordingRenderer {
    fn new(gl: &Rc<MockGraphicsDevice>) -> RecordingRenderer {
        RecordingRenderer {
            gl: gl.clone(),
            viewports: Vec::new(),
            bound_while_rendering: Vec::new(),
            frames_with_scene: 0,
        }
    }
}

impl SceneRenderer for RecordingRenderer {
    fn render(&mut self, viewports: &[VRViewport; 2], scene: Option<&Scene>) {
        self.viewports.push(*viewports);
        self.bound_while_rendering.push(self.gl.bound_framebuffer());
        if scene.is_some() {
            self.frames_with_scene += 1;
        }
    }
}

fn open_hmd(backend_type: VRBackendType) -> (HeadMountedDisplay, MockVRRemote, Rc<MockGraphicsDevice>) {
    init_logging();
    let (creator, remote) = MockBackendCreator::new_with_remote(backend_type);
    let mut manager = VRBackendManager::new();
    manager.register(creator);
    let gl = MockGraphicsDevice::new();
    let hmd = match HeadMountedDisplay::new(&manager, gl.clone(), HmdConfig::with_backend(backend_type)) {
        Ok(hmd) => hmd,
        Err(e) => panic!("{} headset failed to open: {}", backend_type, e),
    };
    (hmd, remote, gl)
}

fn open_with_scene(backend_type: VRBackendType) -> (HeadMountedDisplay, MockVRRemote, Rc<MockGraphicsDevice>) {
    let (mut hmd, remote, gl) = open_hmd(backend_type);
    let scene = Scene::new(hmd.backend());
    hmd.set_scene(scene);
    (hmd, remote, gl)
}

#[test]
fn openvr_frame_renders_both_eyes_with_fresh_pose() {
    let (mut hmd, remote, gl) = open_with_scene(VRBackendType::OpenVR);
    assert_eq!(hmd.render_target_size(), RenderTargetSize::new(2000, 1200));
    assert!(gl.is_current());

    let mut renderer = RecordingRenderer::new(&gl);
    let report = hmd.render_frame(&mut renderer);
    assert_eq!(report.frame_index, 1);
    assert_eq!(renderer.viewports, vec![[VRViewport::new(0, 0, 1000, 1200), VRViewport::new(1000, 0, 1000, 1200)]]);
    assert_ne!(renderer.bound_while_rendering[0], 0);
    assert_eq!(renderer.frames_with_scene, 1);
    assert_eq!(gl.bound_framebuffer(), 0);
    assert_eq!(remote.pose_samples(), 1);

    {
        let camera = hmd.scene().expect("scene").camera();
        assert_near(transform_point(camera.view_matrix(VREye::Left), [-0.032, 1.6, 0.0]), [0.0, 0.0, 0.0]);
        assert_near(transform_point(camera.view_matrix(VREye::Right), [0.032, 1.6, 0.0]), [0.0, 0.0, 0.0]);
        assert_eq!(camera.projection(VREye::Left)[11], -1.0);
        assert_eq!(camera.viewport_rect(VREye::Left), [0.0, 0.0, 0.5, 1.0]);
        assert_eq!(camera.viewport_rect(VREye::Right), [0.5, 0.0, 0.5, 1.0]);
    }

    remote.send(MockVRControlMsg::SetHeadPose([0.0, 1.7, 0.5], [0.0, 0.0, 0.0, 1.0]));
    let report = hmd.render_frame(&mut renderer);
    assert_eq!(report.frame_index, 2);
    assert_eq!(remote.pose_samples(), 2);
    let camera = hmd.scene().expect("scene").camera();
    assert_near(transform_point(camera.view_matrix(VREye::Left), [-0.032, 1.7, 0.5]), [0.0, 0.0, 0.0]);
}

#[test]
fn closures_can_render() {
    let (mut hmd, _remote, _gl) = open_hmd(VRBackendType::OpenVR);
    let mut frames = 0;
    let report = hmd.render_frame(&mut |viewports: &[VRViewport; 2], scene: Option<&Scene>| {
        assert_eq!(viewports[1].x, 1000);
        assert!(scene.is_none());
        frames += 1;
    });
    assert_eq!(frames, 1);
    assert_eq!(report.frame_index, 1);
}

#[test]
fn report_budgets_background_work() {
    let (mut hmd, remote, gl) = open_hmd(VRBackendType::OpenVR);
    let mut renderer = RecordingRenderer::new(&gl);

    let report = hmd.render_frame(&mut renderer);
    assert_eq!(report.next_frame_in_ms, 7);
    assert_eq!(report.incubation_budget_ms, 1);
    assert!(report.timestamp > 0.0);

    remote.send(MockVRControlMsg::SetTimeSinceVsync(None));
    let report = hmd.render_frame(&mut renderer);
    assert_eq!(report.next_frame_in_ms, 11);
    assert_eq!(report.incubation_budget_ms, 5);

    remote.send(MockVRControlMsg::SetTimeSinceVsync(Some(0.0105)));
    let report = hmd.render_frame(&mut renderer);
    assert_eq!(report.next_frame_in_ms, 0);
    assert_eq!(report.incubation_budget_ms, 0);
}

#[test]
fn oculus_frame_submits_committed_slot() {
    let (mut hmd, remote, gl) = open_with_scene(VRBackendType::OculusVR);
    let mut renderer = RecordingRenderer::new(&gl);

    let report = hmd.render_frame(&mut renderer);
    assert_eq!(report.frame_index, 1);
    assert_eq!(report.next_frame_in_ms, 11);
    assert_eq!(report.incubation_budget_ms, 5);
    assert_eq!(remote.pose_samples(), 1);
    assert_eq!(remote.state().submitted_frames, vec![0]);

    let calls = remote.calls();
    assert!(position_of(&calls, "ovr_CommitTextureSwapChain") < position_of(&calls, "ovr_SubmitFrame"));

    hmd.render_frame(&mut renderer);
    assert_eq!(remote.state().submitted_frames, vec![0, 1]);
    assert_eq!(remote.pose_samples(), 2);
    // Each frame rendered into the slot the runtime handed out
    assert_ne!(renderer.bound_while_rendering[0], renderer.bound_while_rendering[1]);
}

#[test]
fn scene_tracks_connected_devices() {
    let (mut hmd, remote, gl) = open_with_scene(VRBackendType::OpenVR);
    let mut renderer = RecordingRenderer::new(&gl);
    hmd.render_frame(&mut renderer);

    {
        let scene = hmd.scene().expect("scene");
        let ids: Vec<u32> = scene.nodes().map(|node| node.id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        let left = scene.node(1).expect("left controller");
        assert_eq!(left.object_type(), TrackedObjectType::LeftHand);
        assert_eq!(&left.transform()[12..15], &[-0.2, 1.0, -0.3]);
    }

    remote.send(MockVRControlMsg::SetDevicePose(1, [-0.1, 1.1, -0.4], [0.0, 0.0, 0.0, 1.0]));
    remote.send(MockVRControlMsg::DisconnectDevice(2));
    hmd.render_frame(&mut renderer);

    let scene = hmd.scene_mut().expect("scene");
    assert!(scene.node(2).is_none());
    assert_eq!(&scene.node(1).expect("left controller").transform()[12..15], &[-0.1, 1.1, -0.4]);

    let node = scene.node_mut(1).expect("left controller");
    assert_eq!(node.model().map(|model| model.vertex_count()), Some(4));
    assert!(node.model().is_some());
    assert_eq!(remote.call_count("LoadRenderModel"), 3);

    let camera = hmd.scene().expect("scene").camera();
    assert_eq!(camera.tracked_object_matrix(3).map(|m| m[13]), Some(2.5));
    assert_eq!(camera.tracked_object_matrix(2), None);
}

#[test]
fn events_are_reported_with_the_frame() {
    let (mut hmd, remote, gl) = open_hmd(VRBackendType::OpenVR);
    remote.send(MockVRControlMsg::QueueEvent(VREvent::TrackedObjectActivated(5)));

    let report = hmd.render_frame(&mut RecordingRenderer::new(&gl));
    assert_eq!(report.events, vec![VREvent::TrackedObjectActivated(5)]);
}

#[test]
fn clip_planes_update_camera_projection() {
    let (mut hmd, _remote, _gl) = open_with_scene(VRBackendType::OculusVR);
    hmd.set_clip_planes(0.5, 20.0);

    let projection = *hmd.scene().expect("scene").camera().projection(VREye::Left);
    assert!((projection[14] + 2.0 * 20.0 * 0.5 / 19.5).abs() < 1e-5);
    assert_eq!(hmd.config().near_clip, 0.5);
}

#[test]
fn oculus_is_preferred_when_both_are_available() {
    init_logging();
    let (oculus, oculus_remote) = MockBackendCreator::new_with_remote(VRBackendType::OculusVR);
    let (openvr, openvr_remote) = MockBackendCreator::new_with_remote(VRBackendType::OpenVR);
    let mut manager = VRBackendManager::new();
    manager.register(openvr);
    manager.register(oculus);

    let open = |manager: &VRBackendManager| {
        HeadMountedDisplay::new(manager, MockGraphicsDevice::new(), HmdConfig::default())
            .map(|hmd| hmd.backend().borrow().backend_type())
    };

    assert_eq!(open(&manager), Ok(VRBackendType::OculusVR));

    oculus_remote.send(MockVRControlMsg::SetHmdPresent(false));
    assert_eq!(open(&manager), Ok(VRBackendType::OpenVR));

    oculus_remote.send(MockVRControlMsg::SetHmdPresent(true));
    oculus_remote.send(MockVRControlMsg::SetRuntimeInstalled(false));
    assert_eq!(open(&manager), Ok(VRBackendType::OpenVR));

    openvr_remote.send(MockVRControlMsg::SetHmdPresent(false));
    assert_eq!(open(&manager), Err(VRError::HmdNotPresent));

    openvr_remote.send(MockVRControlMsg::SetRuntimeInstalled(false));
    assert_eq!(open(&manager), Err(VRError::RuntimeNotInstalled));
}

#[test]
fn configured_backend_is_used_as_is() {
    init_logging();
    let mut manager = VRBackendManager::new();
    manager.register_mock();

    let hmd = HeadMountedDisplay::new(&manager, MockGraphicsDevice::new(), HmdConfig::default());
    assert_eq!(hmd.map(|hmd| hmd.backend().borrow().backend_type()), Ok(VRBackendType::OculusVR));

    let hmd = HeadMountedDisplay::new(&manager, MockGraphicsDevice::new(), HmdConfig::with_backend(VRBackendType::OpenVR));
    assert_eq!(hmd.map(|hmd| hmd.backend().borrow().backend_type()), Ok(VRBackendType::OpenVR));

    let empty = VRBackendManager::new();
    let hmd = HeadMountedDisplay::new(&empty, MockGraphicsDevice::new(), HmdConfig::with_backend(VRBackendType::OpenVR));
    assert_eq!(hmd.err(), Some(VRError::RuntimeNotInstalled));
}

#[test]
fn startup_requires_a_graphics_context() {
    init_logging();
    let mut manager = VRBackendManager::new();
    manager.register_mock();
    let gl = MockGraphicsDevice::new();
    gl.set_context_available(false);

    let hmd = HeadMountedDisplay::new(&manager, gl, HmdConfig::default());
    assert_eq!(hmd.err(), Some(VRError::ContextNotCurrent));
}

#[test]
fn startup_reports_initialization_failure() {
    init_logging();
    let (creator, remote) = MockBackendCreator::new_with_remote(VRBackendType::OpenVR);
    let mut manager = VRBackendManager::new();
    manager.register(creator);
    let gl = MockGraphicsDevice::new();
    gl.set_framebuffers_incomplete(true);

    let hmd = HeadMountedDisplay::new(&manager, gl.clone(), HmdConfig::with_backend(VRBackendType::OpenVR));
    assert!(matches!(hmd.err(), Some(VRError::Initialization(_))));
    // The half open session is closed when the backend goes away
    assert_eq!(remote.call_count("VR_Shutdown"), 1);
    assert_eq!(gl.live_framebuffer_count(), 0);
}

#[test]
fn shutdown_closes_the_session() {
    let (mut hmd, remote, gl) = open_with_scene(VRBackendType::OpenVR);
    hmd.render_frame(&mut RecordingRenderer::new(&gl));

    hmd.shutdown();
    assert!(hmd.scene().is_none());
    assert_eq!(remote.call_count("VR_Shutdown"), 1);
    assert_eq!(gl.live_framebuffer_count(), 0);
}
