use super::library::OpenVRLibrary;
use super::runtime::{ControllerRole, HmdMatrix34, HmdMatrix44, OpenVRRuntime, RawRenderModel, RawTexture,
                     RenderModelVertex, RuntimeEvent, StringProperty, TextureBounds, TrackedDeviceClass,
                     TrackedDevicePose};
use openvr_crate as openvr;
use openvr_crate::compositor::texture;
use openvr_crate::system::event::Event;
use rust_hmd_api::{VREye, VRError};
use std::ffi::CString;

struct Session {
    // Interfaces below borrow from the context, which must outlive them
    system: openvr::System,
    compositor: openvr::Compositor,
    render_models: openvr::RenderModels,
    context: openvr::Context,
}

/// `OpenVRRuntime` backed by the installed `openvr_api` library.
pub struct SteamVRRuntime {
    session: Option<Session>,
}

impl SteamVRRuntime {
    pub fn new() -> SteamVRRuntime {
        SteamVRRuntime {
            session: None,
        }
    }

    fn session(&self) -> Option<&Session> {
        let session = self.session.as_ref();
        if session.is_none() {
            error!("OpenVR runtime used without a session");
        }
        session
    }
}

fn to_openvr_eye(eye: VREye) -> openvr::Eye {
    match eye {
        VREye::Left => openvr::Eye::Left,
        VREye::Right => openvr::Eye::Right,
    }
}

fn convert_pose(pose: &openvr::TrackedDevicePose) -> TrackedDevicePose {
    TrackedDevicePose {
        device_to_absolute_tracking: *pose.device_to_absolute_tracking(),
        pose_is_valid: pose.pose_is_valid(),
        device_is_connected: pose.device_is_connected(),
    }
}

impl OpenVRRuntime for SteamVRRuntime {
    fn is_runtime_installed(&self) -> bool {
        OpenVRLibrary::probe_runtime()
    }

    fn is_hmd_present(&self) -> bool {
        OpenVRLibrary::probe_hmd()
    }

    fn init(&mut self) -> Result<(), VRError> {
        let context = unsafe { openvr::init(openvr::ApplicationType::Scene) }
            .map_err(|e| VRError::Initialization(format!("{:?}", e)))?;
        let system = context.system().map_err(|e| VRError::Initialization(format!("{:?}", e)))?;
        let compositor = context.compositor().map_err(|e| VRError::Compositor(format!("{:?}", e)))?;
        let render_models = context.render_models().map_err(|e| VRError::Initialization(format!("{:?}", e)))?;
        self.session = Some(Session {
            system: system,
            compositor: compositor,
            render_models: render_models,
            context: context,
        });
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(session) = self.session.take() {
            unsafe { session.context.shutdown() };
        }
    }

    fn string_property(&self, device: u32, property: StringProperty) -> Option<String> {
        let property = match property {
            StringProperty::TrackingSystemName => openvr::property::TrackingSystemName_String,
            StringProperty::SerialNumber => openvr::property::SerialNumber_String,
            StringProperty::RenderModelName => openvr::property::RenderModelName_String,
        };
        let session = self.session()?;
        session.system.string_tracked_device_property(device, property).ok()
               .map(|value| value.to_string_lossy().into_owned())
    }

    fn display_frequency(&self) -> Option<f32> {
        let session = self.session()?;
        session.system.float_tracked_device_property(0, openvr::property::DisplayFrequency_Float).ok()
    }

    fn recommended_render_target_size(&self) -> (u32, u32) {
        self.session().map(|s| s.system.recommended_render_target_size()).unwrap_or((0, 0))
    }

    fn eye_to_head_transform(&self, eye: VREye) -> HmdMatrix34 {
        match self.session() {
            Some(s) => s.system.eye_to_head_transform(to_openvr_eye(eye)),
            None => TrackedDevicePose::default().device_to_absolute_tracking,
        }
    }

    fn projection_matrix(&self, eye: VREye, near: f32, far: f32) -> HmdMatrix44 {
        match self.session() {
            Some(s) => s.system.projection_matrix(to_openvr_eye(eye), near, far),
            None => [[0.0; 4]; 4],
        }
    }

    fn wait_get_poses(&mut self) -> Result<Vec<TrackedDevicePose>, VRError> {
        let session = self.session().ok_or(VRError::NoBackend)?;
        let poses = session.compositor.wait_get_poses().map_err(|e| VRError::Compositor(format!("{:?}", e)))?;
        Ok(poses.render.iter().map(convert_pose).collect())
    }

    fn device_class(&self, device: u32) -> TrackedDeviceClass {
        let session = match self.session() {
            Some(session) => session,
            None => return TrackedDeviceClass::Invalid,
        };
        match session.system.tracked_device_class(device) {
            openvr::TrackedDeviceClass::Invalid => TrackedDeviceClass::Invalid,
            openvr::TrackedDeviceClass::HMD => TrackedDeviceClass::Hmd,
            openvr::TrackedDeviceClass::Controller => TrackedDeviceClass::Controller,
            openvr::TrackedDeviceClass::GenericTracker => TrackedDeviceClass::GenericTracker,
            openvr::TrackedDeviceClass::TrackingReference => TrackedDeviceClass::TrackingReference,
            openvr::TrackedDeviceClass::DisplayRedirect => TrackedDeviceClass::DisplayRedirect,
        }
    }

    fn controller_role(&self, device: u32) -> ControllerRole {
        let role = self.session().and_then(|s| s.system.get_controller_role_for_tracked_device_index(device));
        match role {
            Some(openvr::TrackedControllerRole::LeftHand) => ControllerRole::LeftHand,
            Some(openvr::TrackedControllerRole::RightHand) => ControllerRole::RightHand,
            None => ControllerRole::Invalid,
        }
    }

    fn load_render_model(&mut self, name: &str) -> Result<Option<RawRenderModel>, VRError> {
        let session = self.session().ok_or(VRError::NoBackend)?;
        let name = CString::new(name).map_err(|e| VRError::RenderModel(e.to_string()))?;
        let model = session.render_models.load_render_model(&name)
                           .map_err(|e| VRError::RenderModel(format!("{:?}", e)))?;
        Ok(model.map(|model| RawRenderModel {
            vertices: model.vertices().iter().map(|v| RenderModelVertex {
                position: v.position,
                normal: v.normal,
                texture_coord: v.texture_coord,
            }).collect(),
            indices: model.indices().to_vec(),
            diffuse_texture_id: model.diffuse_texture_id(),
        }))
    }

    fn load_texture(&mut self, texture_id: i32) -> Result<Option<RawTexture>, VRError> {
        let session = self.session().ok_or(VRError::NoBackend)?;
        let texture = session.render_models.load_texture(texture_id)
                             .map_err(|e| VRError::RenderModel(format!("{:?}", e)))?;
        Ok(texture.map(|texture| {
            let (width, height) = texture.dimensions();
            RawTexture {
                width: width,
                height: height,
                rgba: texture.data().to_vec(),
            }
        }))
    }

    fn time_since_last_vsync(&self) -> Option<f32> {
        self.session()?.system.time_since_last_vsync().map(|(seconds, _frame)| seconds)
    }

    fn submit(&mut self, eye: VREye, texture_id: u32, bounds: &TextureBounds) -> Result<(), VRError> {
        let session = self.session().ok_or(VRError::NoBackend)?;
        let texture = texture::Texture {
            handle: texture::Handle::OpenGLTexture(texture_id as usize),
            color_space: texture::ColorSpace::Auto,
        };
        let bounds = texture::Bounds {
            min: (bounds.u_min, bounds.v_min),
            max: (bounds.u_max, bounds.v_max),
        };
        unsafe { session.compositor.submit(to_openvr_eye(eye), &texture, Some(&bounds), None) }
            .map_err(|e| VRError::Compositor(format!("{:?}", e)))
    }

    fn post_present_handoff(&mut self) {
        if let Some(session) = self.session() {
            session.compositor.post_present_handoff();
        }
    }

    fn poll_next_event(&mut self) -> Option<RuntimeEvent> {
        let session = self.session.as_ref()?;
        let (info, _pose) = session.system.poll_next_event_with_pose(openvr::TrackingUniverseOrigin::Standing)?;
        let device = info.tracked_device_index;
        Some(match info.event {
            Event::TrackedDeviceActivated => RuntimeEvent::TrackedDeviceActivated(device),
            Event::TrackedDeviceDeactivated => RuntimeEvent::TrackedDeviceDeactivated(device),
            Event::TrackedDeviceUpdated => RuntimeEvent::TrackedDeviceUpdated(device),
            _ => RuntimeEvent::Other(device),
        })
    }
}
