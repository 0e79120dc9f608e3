#![cfg(feature = "mock")]

mod common;

use common::{initialized_backend, mock_backend, position_of, transform_point};
use rust_hmd::api::mock::{GlCall, MockDevice, MockRenderModel, MockVRControlMsg};
use rust_hmd::api::openvr::runtime::ControllerRole;
use rust_hmd::utils;
use rust_hmd::{BackendState, HmdConfig, ModelTexture, RenderTargetSize, TrackedObjectType, VRBackendType, VREvent};

#[test]
fn initialize_allocates_side_by_side_target() {
    let (backend, remote, gl) = initialized_backend(VRBackendType::OpenVR);
    let backend = backend.borrow();

    assert_eq!(backend.state(), BackendState::Initialized);
    assert_eq!(backend.render_target_size(), RenderTargetSize::new(2000, 1200));
    assert_eq!(backend.refresh_rate(0), 90.0);
    assert_eq!(remote.call_count("VR_Init"), 1);
    assert!(gl.calls().iter().any(|call| matches!(*call, GlCall::CreateColorTexture(_, 2000, 1200))));
    assert!(gl.calls().iter().any(|call| matches!(*call, GlCall::CreateDepthRenderbuffer(_, 2000, 1200))));
    assert_eq!(gl.live_framebuffer_count(), 1);
}

#[test]
fn initialize_without_headset_fails() {
    let (backend, remote, gl) = mock_backend(VRBackendType::OpenVR, &HmdConfig::default());
    remote.send(MockVRControlMsg::SetHmdPresent(false));

    let mut backend = backend.borrow_mut();
    assert!(!backend.is_hmd_present());
    assert!(!backend.initialize());
    assert_eq!(backend.state(), BackendState::Failed);
    assert_eq!(gl.live_framebuffer_count(), 0);

    backend.shutdown();
    assert_eq!(backend.state(), BackendState::Shutdown);
}

#[test]
fn poses_are_sampled_once_per_frame() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    let mut backend = backend.borrow_mut();
    let mut left = identity_matrix();
    let mut right = identity_matrix();
    let mut transform = identity_matrix();

    backend.eye_matrices(&mut left, &mut right);
    backend.eye_matrices(&mut left, &mut right);
    backend.head_pose(0);
    backend.currently_tracked_objects();
    assert!(backend.tracked_object(1, &mut transform));
    assert_eq!(remote.pose_samples(), 1);
    assert!(backend.frame_state().poses_fresh);

    backend.swap_to_headset();
    assert!(!backend.frame_state().poses_fresh);
    assert_eq!(remote.pose_samples(), 1);

    backend.eye_matrices(&mut left, &mut right);
    assert_eq!(remote.pose_samples(), 2);
}

#[test]
fn new_head_pose_is_seen_after_swap() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    let mut backend = backend.borrow_mut();

    assert_eq!(backend.head_pose(0)[13], 1.6);
    remote.send(MockVRControlMsg::SetHeadPose([0.0, 1.8, 0.0], [0.0, 0.0, 0.0, 1.0]));
    // Same frame, cached sample
    assert_eq!(backend.head_pose(0)[13], 1.6);

    backend.swap_to_headset();
    assert_eq!(backend.head_pose(0)[13], 1.8);
}

#[test]
fn eye_views_put_each_eye_at_the_origin() {
    let (backend, _remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    let mut left = identity_matrix();
    let mut right = identity_matrix();
    backend.borrow_mut().eye_matrices(&mut left, &mut right);

    common::assert_near(transform_point(&left, [-0.032, 1.6, 0.0]), [0.0, 0.0, 0.0]);
    common::assert_near(transform_point(&right, [0.032, 1.6, 0.0]), [0.0, 0.0, 0.0]);
    common::assert_near(transform_point(&left, [0.0, 1.6, -1.0]), [0.032, 0.0, -1.0]);
    assert!(utils::is_affine(&left));
    assert!(utils::is_affine(&right));
}

#[test]
fn projections_follow_clip_planes() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    let mut backend = backend.borrow_mut();
    let mut left = identity_matrix();
    let mut right = identity_matrix();

    backend.projection_matrices(&mut left, &mut right);
    backend.projection_matrices(&mut left, &mut right);
    assert_eq!(remote.call_count("GetProjectionMatrix"), 2);
    assert!(left != right);
    assert_eq!(left[11], -1.0);

    backend.set_clip_planes(0.1, 1000.0);
    backend.projection_matrices(&mut left, &mut right);
    assert_eq!(remote.call_count("GetProjectionMatrix"), 2);

    let before = left;
    backend.set_clip_planes(0.5, 50.0);
    backend.projection_matrices(&mut left, &mut right);
    assert_eq!(remote.call_count("GetProjectionMatrix"), 4);
    assert!(left != before);
}

#[test]
fn device_classes_map_to_object_types() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    remote.send(MockVRControlMsg::ConnectDevice(5, MockDevice {
        class: 42,
        ..MockDevice::base_station([0.0, 0.0, 0.0])
    }));
    remote.send(MockVRControlMsg::ConnectDevice(6, MockDevice::controller(ControllerRole::Invalid, [0.0; 3])));

    let mut backend = backend.borrow_mut();
    assert_eq!(backend.tracked_object_type(0), TrackedObjectType::Head);
    assert_eq!(backend.tracked_object_type(1), TrackedObjectType::LeftHand);
    assert_eq!(backend.tracked_object_type(2), TrackedObjectType::RightHand);
    assert_eq!(backend.tracked_object_type(3), TrackedObjectType::LighthouseOrSensor);
    assert_eq!(backend.tracked_object_type(5), TrackedObjectType::Other);
    assert_eq!(backend.tracked_object_type(6), TrackedObjectType::Other);
    assert_eq!(backend.tracked_object_type(10), TrackedObjectType::Other);
    assert_eq!(backend.tracked_object_type(1000), TrackedObjectType::Other);
}

#[test]
fn tracked_objects_report_connected_devices() {
    let (backend, _remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    let mut backend = backend.borrow_mut();
    assert_eq!(backend.currently_tracked_objects(), vec![0, 1, 2, 3]);

    let mut transform = identity_matrix();
    assert!(backend.tracked_object(2, &mut transform));
    assert_eq!(&transform[12..15], &[0.2, 1.0, -0.3]);
    assert!(utils::is_affine(&transform));
}

#[test]
fn disconnected_device_leaves_output_untouched() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    remote.send(MockVRControlMsg::DisconnectDevice(2));

    let mut backend = backend.borrow_mut();
    let mut transform = [7.0; 16];
    assert!(!backend.tracked_object(2, &mut transform));
    assert_eq!(transform, [7.0; 16]);
    assert!(!backend.tracked_object(40, &mut transform));
    assert!(!backend.tracked_object(64, &mut transform));
    assert_eq!(transform, [7.0; 16]);
    assert_eq!(backend.currently_tracked_objects(), vec![0, 1, 3]);
}

#[test]
fn render_models_are_loaded_once() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    let mut backend = backend.borrow_mut();
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut texture = ModelTexture::default();

    // The controller model reports "loading" twice before it is ready
    assert!(backend.tracked_object_model(1, &mut vertices, &mut indices, &mut texture));
    assert_eq!(remote.call_count("LoadRenderModel"), 3);
    assert_eq!(remote.call_count("LoadTexture"), 1);
    assert_eq!(vertices.len(), 4 * 8);
    assert_eq!(&vertices[0..8], &[-0.5, -0.5, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!((texture.width, texture.height, texture.rgba.len()), (2, 1, 8));

    let mut vertices2 = Vec::new();
    let mut indices2 = Vec::new();
    let mut texture2 = ModelTexture::default();
    assert!(backend.tracked_object_model(1, &mut vertices2, &mut indices2, &mut texture2));
    assert_eq!(remote.call_count("LoadRenderModel"), 3);
    assert_eq!((vertices2, indices2, texture2), (vertices, indices, texture));
}

#[test]
fn failed_render_model_is_retried() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    remote.send(MockVRControlMsg::SetRenderModel("mock_base_station".into(), MockRenderModel::failing()));
    let mut backend = backend.borrow_mut();
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut texture = ModelTexture::default();

    assert!(!backend.tracked_object_model(3, &mut vertices, &mut indices, &mut texture));
    assert!(!backend.tracked_object_model(3, &mut vertices, &mut indices, &mut texture));
    assert_eq!(remote.call_count("LoadRenderModel"), 2);

    remote.send(MockVRControlMsg::SetRenderModel("mock_base_station".into(), MockRenderModel::quad(0)));
    assert!(backend.tracked_object_model(3, &mut vertices, &mut indices, &mut texture));
    assert_eq!(remote.call_count("LoadRenderModel"), 3);
    assert_eq!(indices.len(), 6);
}

#[test]
fn render_model_load_gives_up_after_timeout() {
    let config = HmdConfig {
        render_model_timeout_ms: 20,
        ..HmdConfig::default()
    };
    let (backend, remote, _gl) = mock_backend(VRBackendType::OpenVR, &config);
    remote.send(MockVRControlMsg::SetRenderModel("mock_controller".into(), MockRenderModel::quad(u32::MAX)));
    let mut backend = backend.borrow_mut();
    assert!(backend.initialize());

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut texture = ModelTexture::default();
    assert!(!backend.tracked_object_model(1, &mut vertices, &mut indices, &mut texture));
    assert!(remote.call_count("LoadRenderModel") > 1);
    assert!(vertices.is_empty());
}

#[test]
fn device_without_render_model_fails() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    remote.send(MockVRControlMsg::ConnectDevice(7, MockDevice {
        render_model: None,
        ..MockDevice::base_station([0.0; 3])
    }));
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut texture = ModelTexture::default();
    assert!(!backend.borrow_mut().tracked_object_model(7, &mut vertices, &mut indices, &mut texture));
    assert_eq!(remote.call_count("LoadRenderModel"), 0);
}

#[test]
fn swap_submits_both_halves_of_one_texture() {
    let (backend, remote, gl) = initialized_backend(VRBackendType::OpenVR);
    let texture = gl.calls().iter().filter_map(|call| match *call {
        GlCall::CreateColorTexture(texture, _, _) => Some(texture),
        _ => None,
    }).next().expect("no color texture");

    let mut backend = backend.borrow_mut();
    assert!(backend.bind_framebuffer_object(0));
    assert_ne!(gl.bound_framebuffer(), 0);
    assert_eq!(gl.viewports().last(), Some(&rust_hmd::VRViewport::new(0, 0, 2000, 1200)));

    backend.swap_to_headset();
    let calls = remote.calls();
    let left = position_of(&calls, &format!("Submit Left {} 0 0 0.5 1", texture));
    let right = position_of(&calls, &format!("Submit Right {} 0.5 0 1 1", texture));
    let handoff = position_of(&calls, "PostPresentHandoff");
    assert!(left < right && right < handoff);
    assert_eq!(backend.frame_state().frame_index, 1);
}

#[test]
fn time_until_next_frame_is_clamped() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    // 11.1 ms frames, 4 ms since vsync
    assert_eq!(backend.borrow().time_until_next_frame(), 7);

    remote.send(MockVRControlMsg::SetTimeSinceVsync(Some(0.02)));
    assert_eq!(backend.borrow().time_until_next_frame(), 0);

    remote.send(MockVRControlMsg::SetTimeSinceVsync(None));
    assert_eq!(backend.borrow().time_until_next_frame(), 11);
}

#[test]
fn unknown_display_frequency_falls_back_to_default() {
    let (backend, remote, _gl) = mock_backend(VRBackendType::OpenVR, &HmdConfig::default());
    remote.send(MockVRControlMsg::SetRefreshRate(0.0));
    assert!(backend.borrow_mut().initialize());

    assert_eq!(backend.borrow().refresh_rate(0), 90.0);
    assert_eq!(backend.borrow().time_until_next_frame(), 7);
}

#[test]
fn failed_framebuffer_allocation_leaves_nothing_to_bind_or_submit() {
    let (backend, remote, gl) = mock_backend(VRBackendType::OpenVR, &HmdConfig::default());
    gl.set_framebuffers_incomplete(true);
    let mut backend = backend.borrow_mut();
    assert!(!backend.initialize());
    assert_eq!(backend.state(), BackendState::Failed);
    assert_eq!(gl.live_framebuffer_count(), 0);

    assert!(!backend.bind_framebuffer_object(0));
    backend.swap_to_headset();
    assert!(remote.calls().iter().all(|call| !call.starts_with("Submit")));
    assert_eq!(backend.frame_state().frame_index, 0);

    // The session opened before the allocation failed
    backend.shutdown();
    assert_eq!(remote.call_count("VR_Shutdown"), 1);
}

#[test]
fn events_are_forwarded() {
    let (backend, remote, _gl) = initialized_backend(VRBackendType::OpenVR);
    remote.send(MockVRControlMsg::QueueEvent(VREvent::TrackedObjectActivated(4)));
    remote.send(MockVRControlMsg::QueueEvent(VREvent::TrackedObjectDeactivated(2)));

    let events = backend.borrow_mut().poll_events();
    assert_eq!(events, vec![VREvent::TrackedObjectActivated(4), VREvent::TrackedObjectDeactivated(2)]);
    assert!(backend.borrow_mut().poll_events().is_empty());
}

#[test]
fn shutdown_ends_session_before_releasing_framebuffer() {
    let (backend, remote, gl) = initialized_backend(VRBackendType::OpenVR);
    backend.borrow_mut().shutdown();
    backend.borrow_mut().shutdown();

    let session_end = remote.call_sequence("VR_Shutdown").expect("session not ended");
    let framebuffer_delete = gl.call_sequence(|call| matches!(*call, GlCall::DeleteFramebuffer(_)))
                               .expect("framebuffer not deleted");
    assert!(session_end < framebuffer_delete);
    assert_eq!(remote.call_count("VR_Shutdown"), 1);
    assert_eq!(gl.live_framebuffer_count(), 0);
    assert_eq!(backend.borrow().state(), BackendState::Shutdown);
}

#[test]
fn dropping_an_initialized_backend_shuts_it_down() {
    let (backend, remote, gl) = initialized_backend(VRBackendType::OpenVR);
    drop(backend);
    assert_eq!(remote.call_count("VR_Shutdown"), 1);
    assert_eq!(gl.live_framebuffer_count(), 0);
}

fn identity_matrix() -> rust_hmd::Matrix4 {
    [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0]
}
