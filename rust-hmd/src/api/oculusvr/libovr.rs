use super::runtime::{EyeRenderDesc, FovPort, GraphicsLuid, HmdDesc, LayerEyeFov, MirrorTextureHandle, OculusRuntime,
                     Posef, Sizei, SwapChainHandle, TrackingOrigin, TrackingState};
use libloading as lib;
use rust_hmd_api::{VREye, VRError, VRViewport};
use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;

#[cfg(target_pointer_width = "64")]
const LIBRARY_NAME: &str = "LibOVRRT64_1.dll";
#[cfg(target_pointer_width = "32")]
const LIBRARY_NAME: &str = "LibOVRRT32_1.dll";

type OvrResult = i32;
type OvrBool = u8;
type OvrSession = *mut c_void;
type OvrTextureSwapChain = *mut c_void;
type OvrMirrorTexture = *mut c_void;

const OVR_TEXTURE_2D: i32 = 0;
const OVR_FORMAT_R8G8B8A8_UNORM: i32 = 4;
const OVR_LAYER_TYPE_EYE_FOV: i32 = 1;
const OVR_LAYER_FLAG_TEXTURE_ORIGIN_AT_BOTTOM_LEFT: u32 = 0x02;
const OVR_STATUS_ORIENTATION_TRACKED: u32 = 0x01;
const OVR_TRACKER_CONNECTED: u32 = 0x20;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct OvrSizei {
    w: i32,
    h: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct OvrRecti {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct OvrFovPort {
    up_tan: f32,
    down_tan: f32,
    left_tan: f32,
    right_tan: f32,
}

// ovrQuatf followed by ovrVector3f
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct OvrPosef {
    orientation: [f32; 4],
    position: [f32; 3],
}

#[repr(C)]
#[cfg_attr(target_pointer_width = "64", repr(align(8)))]
struct OvrHmdDesc {
    hmd_type: i32,
    #[cfg(target_pointer_width = "64")]
    _pad0: [u8; 4],
    product_name: [c_char; 64],
    manufacturer: [c_char; 64],
    vendor_id: i16,
    product_id: i16,
    serial_number: [c_char; 24],
    firmware_major: i16,
    firmware_minor: i16,
    available_hmd_caps: u32,
    default_hmd_caps: u32,
    available_tracking_caps: u32,
    default_tracking_caps: u32,
    default_eye_fov: [OvrFovPort; 2],
    max_eye_fov: [OvrFovPort; 2],
    resolution: OvrSizei,
    display_refresh_rate: f32,
    #[cfg(target_pointer_width = "64")]
    _pad1: [u8; 4],
}

#[repr(C)]
struct OvrEyeRenderDesc {
    eye: i32,
    fov: OvrFovPort,
    distorted_viewport: OvrRecti,
    pixels_per_tan_angle_at_center: [f32; 2],
    hmd_to_eye_pose: OvrPosef,
}

#[repr(C)]
struct OvrPoseStatef {
    the_pose: OvrPosef,
    angular_velocity: [f32; 3],
    linear_velocity: [f32; 3],
    angular_acceleration: [f32; 3],
    linear_acceleration: [f32; 3],
    _pad0: [u8; 4],
    time_in_seconds: f64,
}

#[repr(C)]
struct OvrTrackingState {
    head_pose: OvrPoseStatef,
    status_flags: u32,
    hand_poses: [OvrPoseStatef; 2],
    hand_status_flags: [u32; 2],
    calibrated_origin: OvrPosef,
}

#[repr(C)]
#[repr(align(8))]
struct OvrTrackerPose {
    tracker_flags: u32,
    pose: OvrPosef,
    leveled_pose: OvrPosef,
    _pad0: [u8; 4],
}

#[repr(C)]
struct OvrTextureSwapChainDesc {
    texture_type: i32,
    format: i32,
    array_size: i32,
    width: i32,
    height: i32,
    mip_levels: i32,
    sample_count: i32,
    static_image: OvrBool,
    misc_flags: u32,
    bind_flags: u32,
}

#[repr(C)]
struct OvrMirrorTextureDesc {
    format: i32,
    width: i32,
    height: i32,
    misc_flags: u32,
    mirror_options: u32,
}

#[repr(C)]
#[cfg_attr(target_pointer_width = "64", repr(align(8)))]
struct OvrLayerHeader {
    layer_type: i32,
    flags: u32,
    reserved: [c_char; 128],
}

#[repr(C)]
struct OvrLayerEyeFov {
    header: OvrLayerHeader,
    color_texture: [OvrTextureSwapChain; 2],
    viewport: [OvrRecti; 2],
    fov: [OvrFovPort; 2],
    render_pose: [OvrPosef; 2],
    sensor_sample_time: f64,
}

#[repr(C)]
struct OvrErrorInfo {
    result: OvrResult,
    error_string: [c_char; 512],
}

impl From<OvrFovPort> for FovPort {
    fn from(fov: OvrFovPort) -> FovPort {
        FovPort {
            up_tan: fov.up_tan,
            down_tan: fov.down_tan,
            left_tan: fov.left_tan,
            right_tan: fov.right_tan,
        }
    }
}

impl<'a> From<&'a FovPort> for OvrFovPort {
    fn from(fov: &FovPort) -> OvrFovPort {
        OvrFovPort {
            up_tan: fov.up_tan,
            down_tan: fov.down_tan,
            left_tan: fov.left_tan,
            right_tan: fov.right_tan,
        }
    }
}

impl From<OvrPosef> for Posef {
    fn from(pose: OvrPosef) -> Posef {
        Posef {
            orientation: pose.orientation,
            position: pose.position,
        }
    }
}

impl<'a> From<&'a Posef> for OvrPosef {
    fn from(pose: &Posef) -> OvrPosef {
        OvrPosef {
            orientation: pose.orientation,
            position: pose.position,
        }
    }
}

impl<'a> From<&'a VRViewport> for OvrRecti {
    fn from(viewport: &VRViewport) -> OvrRecti {
        OvrRecti {
            x: viewport.x,
            y: viewport.y,
            w: viewport.width,
            h: viewport.height,
        }
    }
}

// Declares the LibOVR entry points and loads them all at once
macro_rules! libovr_functions {
    ($($field:ident: $symbol:literal => fn($($arg:ty),*) $(-> $ret:ty)?;)*) => {
        struct LibOVR {
            _lib: lib::Library,
            $($field: unsafe extern "C" fn($($arg),*) $(-> $ret)?,)*
        }

        impl LibOVR {
            fn new() -> lib::Result<LibOVR> {
                unsafe {
                    let lib = lib::Library::new(LIBRARY_NAME)?;
                    $(let $field = *lib.get::<unsafe extern "C" fn($($arg),*) $(-> $ret)?>($symbol)?;)*
                    Ok(LibOVR {
                        _lib: lib,
                        $($field: $field,)*
                    })
                }
            }
        }
    }
}

libovr_functions! {
    initialize: b"ovr_Initialize\0" => fn(*const c_void) -> OvrResult;
    shutdown: b"ovr_Shutdown\0" => fn();
    get_last_error_info: b"ovr_GetLastErrorInfo\0" => fn(*mut OvrErrorInfo);
    create: b"ovr_Create\0" => fn(*mut OvrSession, *mut [u8; 8]) -> OvrResult;
    destroy: b"ovr_Destroy\0" => fn(OvrSession);
    get_hmd_desc: b"ovr_GetHmdDesc\0" => fn(OvrSession) -> OvrHmdDesc;
    set_tracking_origin_type: b"ovr_SetTrackingOriginType\0" => fn(OvrSession, i32) -> OvrResult;
    get_fov_texture_size: b"ovr_GetFovTextureSize\0" => fn(OvrSession, i32, OvrFovPort, f32) -> OvrSizei;
    get_render_desc: b"ovr_GetRenderDesc\0" => fn(OvrSession, i32, OvrFovPort) -> OvrEyeRenderDesc;
    get_predicted_display_time: b"ovr_GetPredictedDisplayTime\0" => fn(OvrSession, i64) -> f64;
    get_time_in_seconds: b"ovr_GetTimeInSeconds\0" => fn() -> f64;
    get_tracking_state: b"ovr_GetTrackingState\0" => fn(OvrSession, f64, OvrBool) -> OvrTrackingState;
    get_eye_poses: b"ovr_GetEyePoses\0" => fn(OvrSession, i64, OvrBool, *const OvrPosef, *mut OvrPosef, *mut f64);
    get_tracker_count: b"ovr_GetTrackerCount\0" => fn(OvrSession) -> u32;
    get_tracker_pose: b"ovr_GetTrackerPose\0" => fn(OvrSession, u32) -> OvrTrackerPose;
    create_texture_swap_chain_gl: b"ovr_CreateTextureSwapChainGL\0"
        => fn(OvrSession, *const OvrTextureSwapChainDesc, *mut OvrTextureSwapChain) -> OvrResult;
    get_texture_swap_chain_length: b"ovr_GetTextureSwapChainLength\0"
        => fn(OvrSession, OvrTextureSwapChain, *mut i32) -> OvrResult;
    get_texture_swap_chain_current_index: b"ovr_GetTextureSwapChainCurrentIndex\0"
        => fn(OvrSession, OvrTextureSwapChain, *mut i32) -> OvrResult;
    get_texture_swap_chain_buffer_gl: b"ovr_GetTextureSwapChainBufferGL\0"
        => fn(OvrSession, OvrTextureSwapChain, i32, *mut u32) -> OvrResult;
    commit_texture_swap_chain: b"ovr_CommitTextureSwapChain\0" => fn(OvrSession, OvrTextureSwapChain) -> OvrResult;
    destroy_texture_swap_chain: b"ovr_DestroyTextureSwapChain\0" => fn(OvrSession, OvrTextureSwapChain);
    submit_frame: b"ovr_SubmitFrame\0"
        => fn(OvrSession, i64, *const c_void, *const *const OvrLayerHeader, u32) -> OvrResult;
    create_mirror_texture_gl: b"ovr_CreateMirrorTextureWithOptionsGL\0"
        => fn(OvrSession, *const OvrMirrorTextureDesc, *mut OvrMirrorTexture) -> OvrResult;
    get_mirror_texture_buffer_gl: b"ovr_GetMirrorTextureBufferGL\0"
        => fn(OvrSession, OvrMirrorTexture, *mut u32) -> OvrResult;
    destroy_mirror_texture: b"ovr_DestroyMirrorTexture\0" => fn(OvrSession, OvrMirrorTexture);
}

/// `OculusRuntime` backed by the installed LibOVR runtime library.
///
/// The entry points are resolved at construction. A missing runtime
/// reports itself as not installed and every other call fails.
pub struct LibOVRRuntime {
    api: Option<LibOVR>,
    session: OvrSession,
}

impl LibOVRRuntime {
    pub fn new() -> LibOVRRuntime {
        let api = match LibOVR::new() {
            Ok(api) => Some(api),
            Err(e) => {
                debug!("{} not available: {}", LIBRARY_NAME, e);
                None
            }
        };
        LibOVRRuntime {
            api: api,
            session: ptr::null_mut(),
        }
    }

    fn api(&self) -> Result<&LibOVR, VRError> {
        self.api.as_ref().ok_or(VRError::RuntimeNotInstalled)
    }

    // Turns a failed ovrResult into the runtime's own error message
    fn check(&self, api: &LibOVR, result: OvrResult, call: &str) -> Result<(), String> {
        if result >= 0 {
            return Ok(());
        }
        let mut info = OvrErrorInfo {
            result: result,
            error_string: [0; 512],
        };
        let message = unsafe {
            (api.get_last_error_info)(&mut info);
            CStr::from_ptr(info.error_string.as_ptr()).to_string_lossy().into_owned()
        };
        Err(format!("{} failed ({}): {}", call, result, message))
    }

    fn swap_chain_index_query(&self,
                              chain: SwapChainHandle,
                              call: &str,
                              query: unsafe extern "C" fn(OvrSession, OvrTextureSwapChain, *mut i32) -> OvrResult)
                              -> Result<u32, VRError> {
        let api = self.api()?;
        let mut value = 0;
        let result = unsafe { query(self.session, chain.0 as usize as OvrTextureSwapChain, &mut value) };
        self.check(api, result, call).map_err(VRError::SwapChain)?;
        Ok(value as u32)
    }
}

fn eye_index(eye: VREye) -> i32 {
    match eye {
        VREye::Left => 0,
        VREye::Right => 1,
    }
}

impl OculusRuntime for LibOVRRuntime {
    fn is_runtime_installed(&self) -> bool {
        let api = match self.api {
            Some(ref api) => api,
            None => return false,
        };
        unsafe {
            if (api.initialize)(ptr::null()) < 0 {
                return false;
            }
            (api.shutdown)();
        }
        true
    }

    fn initialize(&mut self) -> Result<(), VRError> {
        let api = self.api()?;
        let result = unsafe { (api.initialize)(ptr::null()) };
        self.check(api, result, "ovr_Initialize").map_err(VRError::Initialization)
    }

    fn create_session(&mut self) -> Result<GraphicsLuid, VRError> {
        let mut session: OvrSession = ptr::null_mut();
        let mut luid = [0u8; 8];
        {
            let api = self.api()?;
            let result = unsafe { (api.create)(&mut session, &mut luid) };
            if let Err(e) = self.check(api, result, "ovr_Create") {
                debug!("{}", e);
                return Err(VRError::HmdNotPresent);
            }
        }
        self.session = session;
        Ok(GraphicsLuid(luid))
    }

    fn default_adapter_luid(&self) -> GraphicsLuid {
        GraphicsLuid(dxgi::default_adapter_luid().unwrap_or_default())
    }

    fn destroy_session(&mut self) {
        if let Some(ref api) = self.api {
            if !self.session.is_null() {
                unsafe { (api.destroy)(self.session) };
            }
        }
        self.session = ptr::null_mut();
    }

    fn shutdown(&mut self) {
        if let Some(ref api) = self.api {
            unsafe { (api.shutdown)() };
        }
    }

    fn hmd_desc(&self) -> HmdDesc {
        let api = match self.api {
            Some(ref api) => api,
            None => return HmdDesc::default(),
        };
        let desc = unsafe { (api.get_hmd_desc)(self.session) };
        let product_name = unsafe { CStr::from_ptr(desc.product_name.as_ptr()) };
        HmdDesc {
            product_name: product_name.to_string_lossy().into_owned(),
            resolution: Sizei {
                w: desc.resolution.w as u32,
                h: desc.resolution.h as u32,
            },
            display_refresh_rate: desc.display_refresh_rate,
            default_eye_fov: [desc.default_eye_fov[0].into(), desc.default_eye_fov[1].into()],
        }
    }

    fn set_tracking_origin(&mut self, origin: TrackingOrigin) -> Result<(), VRError> {
        let api = self.api()?;
        let origin = match origin {
            TrackingOrigin::EyeLevel => 0,
            TrackingOrigin::FloorLevel => 1,
        };
        let result = unsafe { (api.set_tracking_origin_type)(self.session, origin) };
        self.check(api, result, "ovr_SetTrackingOriginType").map_err(VRError::Initialization)
    }

    fn fov_texture_size(&self, eye: VREye, fov: &FovPort) -> Sizei {
        let api = match self.api {
            Some(ref api) => api,
            None => return Sizei::default(),
        };
        let size = unsafe { (api.get_fov_texture_size)(self.session, eye_index(eye), fov.into(), 1.0) };
        Sizei {
            w: size.w as u32,
            h: size.h as u32,
        }
    }

    fn eye_render_desc(&self, eye: VREye, fov: &FovPort) -> EyeRenderDesc {
        let api = match self.api {
            Some(ref api) => api,
            None => return EyeRenderDesc::default(),
        };
        let desc = unsafe { (api.get_render_desc)(self.session, eye_index(eye), fov.into()) };
        EyeRenderDesc {
            fov: desc.fov.into(),
            hmd_to_eye_pose: desc.hmd_to_eye_pose.into(),
        }
    }

    fn predicted_display_time(&self, frame_index: u64) -> f64 {
        match self.api {
            Some(ref api) => unsafe { (api.get_predicted_display_time)(self.session, frame_index as i64) },
            None => 0.0,
        }
    }

    fn time_in_seconds(&self) -> f64 {
        match self.api {
            Some(ref api) => unsafe { (api.get_time_in_seconds)() },
            None => 0.0,
        }
    }

    fn tracking_state(&mut self, absolute_time: f64) -> TrackingState {
        let api = match self.api {
            Some(ref api) => api,
            None => return TrackingState::default(),
        };
        let state = unsafe { (api.get_tracking_state)(self.session, absolute_time, 1) };
        let tracked = |flags: u32| flags & OVR_STATUS_ORIENTATION_TRACKED != 0;
        TrackingState {
            head_pose: state.head_pose.the_pose.into(),
            head_tracked: tracked(state.status_flags),
            hand_poses: [state.hand_poses[0].the_pose.into(), state.hand_poses[1].the_pose.into()],
            hands_tracked: [tracked(state.hand_status_flags[0]), tracked(state.hand_status_flags[1])],
        }
    }

    fn eye_poses(&mut self, frame_index: u64, hmd_to_eye: &[Posef; 2]) -> ([Posef; 2], f64) {
        let api = match self.api {
            Some(ref api) => api,
            None => return ([Posef::default(); 2], 0.0),
        };
        let offsets: [OvrPosef; 2] = [(&hmd_to_eye[0]).into(), (&hmd_to_eye[1]).into()];
        let mut poses = [OvrPosef::default(); 2];
        let mut sensor_sample_time = 0.0;
        unsafe {
            (api.get_eye_poses)(self.session, frame_index as i64, 0, offsets.as_ptr(), poses.as_mut_ptr(),
                                &mut sensor_sample_time);
        }
        ([poses[0].into(), poses[1].into()], sensor_sample_time)
    }

    fn tracker_count(&self) -> u32 {
        match self.api {
            Some(ref api) => unsafe { (api.get_tracker_count)(self.session) },
            None => 0,
        }
    }

    fn tracker_pose(&self, index: u32) -> Option<Posef> {
        let api = self.api.as_ref()?;
        let pose = unsafe { (api.get_tracker_pose)(self.session, index) };
        if pose.tracker_flags & OVR_TRACKER_CONNECTED == 0 {
            return None;
        }
        Some(pose.pose.into())
    }

    fn create_texture_swap_chain(&mut self, size: Sizei) -> Result<SwapChainHandle, VRError> {
        let api = self.api()?;
        let desc = OvrTextureSwapChainDesc {
            texture_type: OVR_TEXTURE_2D,
            format: OVR_FORMAT_R8G8B8A8_UNORM,
            array_size: 1,
            width: size.w as i32,
            height: size.h as i32,
            mip_levels: 1,
            sample_count: 1,
            static_image: 0,
            misc_flags: 0,
            bind_flags: 0,
        };
        let mut chain: OvrTextureSwapChain = ptr::null_mut();
        let result = unsafe { (api.create_texture_swap_chain_gl)(self.session, &desc, &mut chain) };
        self.check(api, result, "ovr_CreateTextureSwapChainGL").map_err(VRError::SwapChain)?;
        Ok(SwapChainHandle(chain as usize as u64))
    }

    fn swap_chain_length(&self, chain: SwapChainHandle) -> Result<u32, VRError> {
        let query = self.api()?.get_texture_swap_chain_length;
        self.swap_chain_index_query(chain, "ovr_GetTextureSwapChainLength", query)
    }

    fn swap_chain_buffer(&self, chain: SwapChainHandle, index: u32) -> Result<u32, VRError> {
        let api = self.api()?;
        let mut texture_id = 0;
        let result = unsafe {
            (api.get_texture_swap_chain_buffer_gl)(self.session, chain.0 as usize as OvrTextureSwapChain,
                                                   index as i32, &mut texture_id)
        };
        self.check(api, result, "ovr_GetTextureSwapChainBufferGL").map_err(VRError::SwapChain)?;
        Ok(texture_id)
    }

    fn swap_chain_current_index(&self, chain: SwapChainHandle) -> Result<u32, VRError> {
        let query = self.api()?.get_texture_swap_chain_current_index;
        self.swap_chain_index_query(chain, "ovr_GetTextureSwapChainCurrentIndex", query)
    }

    fn commit_swap_chain(&mut self, chain: SwapChainHandle) -> Result<(), VRError> {
        let api = self.api()?;
        let result = unsafe {
            (api.commit_texture_swap_chain)(self.session, chain.0 as usize as OvrTextureSwapChain)
        };
        self.check(api, result, "ovr_CommitTextureSwapChain").map_err(VRError::SwapChain)
    }

    fn destroy_swap_chain(&mut self, chain: SwapChainHandle) {
        if let Some(ref api) = self.api {
            unsafe { (api.destroy_texture_swap_chain)(self.session, chain.0 as usize as OvrTextureSwapChain) };
        }
    }

    fn submit_frame(&mut self, frame_index: u64, layer: &LayerEyeFov) -> Result<(), VRError> {
        let api = self.api()?;
        let flags = if layer.texture_origin_at_bottom_left {
            OVR_LAYER_FLAG_TEXTURE_ORIGIN_AT_BOTTOM_LEFT
        } else {
            0
        };
        // A null second texture makes both eyes sample the first one
        let ovr_layer = OvrLayerEyeFov {
            header: OvrLayerHeader {
                layer_type: OVR_LAYER_TYPE_EYE_FOV,
                flags: flags,
                reserved: [0; 128],
            },
            color_texture: [layer.color_texture.0 as usize as OvrTextureSwapChain, ptr::null_mut()],
            viewport: [(&layer.viewports[0]).into(), (&layer.viewports[1]).into()],
            fov: [(&layer.fov[0]).into(), (&layer.fov[1]).into()],
            render_pose: [(&layer.render_poses[0]).into(), (&layer.render_poses[1]).into()],
            sensor_sample_time: layer.sensor_sample_time,
        };
        let layers = [&ovr_layer.header as *const OvrLayerHeader];
        let result = unsafe { (api.submit_frame)(self.session, frame_index as i64, ptr::null(), layers.as_ptr(), 1) };
        self.check(api, result, "ovr_SubmitFrame").map_err(VRError::Compositor)
    }

    fn create_mirror_texture(&mut self, size: Sizei) -> Result<MirrorTextureHandle, VRError> {
        let api = self.api()?;
        let desc = OvrMirrorTextureDesc {
            format: OVR_FORMAT_R8G8B8A8_UNORM,
            width: size.w as i32,
            height: size.h as i32,
            misc_flags: 0,
            mirror_options: 0,
        };
        let mut mirror: OvrMirrorTexture = ptr::null_mut();
        let result = unsafe { (api.create_mirror_texture_gl)(self.session, &desc, &mut mirror) };
        self.check(api, result, "ovr_CreateMirrorTextureGL").map_err(VRError::Compositor)?;
        Ok(MirrorTextureHandle(mirror as usize as u64))
    }

    fn mirror_texture_gl(&self, mirror: MirrorTextureHandle) -> Result<u32, VRError> {
        let api = self.api()?;
        let mut texture_id = 0;
        let result = unsafe {
            (api.get_mirror_texture_buffer_gl)(self.session, mirror.0 as usize as OvrMirrorTexture, &mut texture_id)
        };
        self.check(api, result, "ovr_GetMirrorTextureBufferGL").map_err(VRError::Compositor)?;
        Ok(texture_id)
    }

    fn destroy_mirror_texture(&mut self, mirror: MirrorTextureHandle) {
        if let Some(ref api) = self.api {
            unsafe { (api.destroy_mirror_texture)(self.session, mirror.0 as usize as OvrMirrorTexture) };
        }
    }
}

/// LUID of the first DXGI adapter, the one GL contexts are created on.
#[cfg(windows)]
mod dxgi {
    use libloading as lib;
    use std::mem;
    use std::os::raw::c_void;
    use std::ptr;

    #[repr(C)]
    struct Guid(u32, u16, u16, [u8; 8]);

    // IDXGIFactory
    const IID_DXGI_FACTORY: Guid = Guid(0x7b71_66ec, 0x21c7, 0x44ae, [0xb2, 0x1a, 0xc9, 0xae, 0x32, 0x1a, 0xe3, 0x69]);

    // Vtable slots after IUnknown (3) and IDXGIObject (4)
    const RELEASE: usize = 2;
    const FACTORY_ENUM_ADAPTERS: usize = 7;
    const ADAPTER_GET_DESC: usize = 8;

    #[repr(C)]
    struct AdapterDesc {
        description: [u16; 128],
        vendor_id: u32,
        device_id: u32,
        sub_sys_id: u32,
        revision: u32,
        dedicated_video_memory: usize,
        dedicated_system_memory: usize,
        shared_system_memory: usize,
        adapter_luid: [u8; 8],
    }

    type CreateFactory = unsafe extern "system" fn(*const Guid, *mut *mut c_void) -> i32;
    type EnumAdapters = unsafe extern "system" fn(*mut c_void, u32, *mut *mut c_void) -> i32;
    type GetDesc = unsafe extern "system" fn(*mut c_void, *mut AdapterDesc) -> i32;
    type Release = unsafe extern "system" fn(*mut c_void) -> u32;

    unsafe fn method<T>(object: *mut c_void, slot: usize) -> T {
        let vtable = *(object as *const *const usize);
        mem::transmute_copy(&*vtable.add(slot))
    }

    pub fn default_adapter_luid() -> Option<[u8; 8]> {
        unsafe {
            let lib = lib::Library::new("dxgi.dll").ok()?;
            let create = *lib.get::<CreateFactory>(b"CreateDXGIFactory\0").ok()?;
            let mut factory: *mut c_void = ptr::null_mut();
            if create(&IID_DXGI_FACTORY, &mut factory) < 0 {
                return None;
            }

            let mut luid = None;
            let mut adapter: *mut c_void = ptr::null_mut();
            if method::<EnumAdapters>(factory, FACTORY_ENUM_ADAPTERS)(factory, 0, &mut adapter) >= 0 {
                let mut desc: AdapterDesc = mem::zeroed();
                if method::<GetDesc>(adapter, ADAPTER_GET_DESC)(adapter, &mut desc) >= 0 {
                    luid = Some(desc.adapter_luid);
                }
                method::<Release>(adapter, RELEASE)(adapter);
            }
            method::<Release>(factory, RELEASE)(factory);
            luid
        }
    }
}

#[cfg(not(windows))]
mod dxgi {
    pub fn default_adapter_luid() -> Option<[u8; 8]> {
        None
    }
}
