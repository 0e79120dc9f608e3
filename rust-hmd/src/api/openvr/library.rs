use libloading as lib;
#[cfg(unix)]
use libloading::os::unix::Symbol as Symbol;
#[cfg(windows)]
use libloading::os::windows::Symbol as Symbol;

#[cfg(windows)]
const LIBRARY_NAME: &str = "openvr_api.dll";
#[cfg(target_os = "macos")]
const LIBRARY_NAME: &str = "libopenvr_api.dylib";
#[cfg(all(unix, not(target_os = "macos")))]
const LIBRARY_NAME: &str = "libopenvr_api.so";

// openvr_api entry points that work without a session
type VRIsRuntimeInstalled = unsafe extern fn() -> bool;
type VRIsHmdPresent = unsafe extern fn() -> bool;

/// Dynamically loaded `openvr_api`, used to probe the runtime before `VR_Init`.
pub struct OpenVRLibrary {
    _lib: lib::Library,
    is_runtime_installed: Symbol<VRIsRuntimeInstalled>,
    is_hmd_present: Symbol<VRIsHmdPresent>,
}

impl OpenVRLibrary {
    pub fn new() -> lib::Result<OpenVRLibrary> {
        unsafe {
            let lib = lib::Library::new(LIBRARY_NAME)?;
            let is_runtime_installed = lib.get::<VRIsRuntimeInstalled>(b"VR_IsRuntimeInstalled\0")?.into_raw();
            let is_hmd_present = lib.get::<VRIsHmdPresent>(b"VR_IsHmdPresent\0")?.into_raw();

            Ok(OpenVRLibrary {
                _lib: lib,
                is_runtime_installed: is_runtime_installed,
                is_hmd_present: is_hmd_present,
            })
        }
    }

    pub fn is_runtime_installed(&self) -> bool {
        unsafe { (self.is_runtime_installed)() }
    }

    pub fn is_hmd_present(&self) -> bool {
        unsafe { (self.is_hmd_present)() }
    }

    /// False when `openvr_api` itself cannot be loaded
    pub fn probe_runtime() -> bool {
        match OpenVRLibrary::new() {
            Ok(library) => library.is_runtime_installed(),
            Err(e) => {
                debug!("{} not available: {}", LIBRARY_NAME, e);
                false
            }
        }
    }

    pub fn probe_hmd() -> bool {
        OpenVRLibrary::new().map(|library| library.is_hmd_present()).unwrap_or(false)
    }
}
