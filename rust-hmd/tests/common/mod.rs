#![allow(dead_code)]

use rust_hmd::api::mock::{MockBackendCreator, MockGraphicsDevice, MockVRRemote};
use rust_hmd::{GraphicsDevicePtr, HmdConfig, Matrix4, VRBackendPtr, VRBackendType};
use std::rc::Rc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Backend over a mock runtime, with the graphics context already current
pub fn mock_backend(backend_type: VRBackendType,
                    config: &HmdConfig) -> (VRBackendPtr, MockVRRemote, Rc<MockGraphicsDevice>) {
    init_logging();
    let gl = MockGraphicsDevice::current();
    let graphics: GraphicsDevicePtr = gl.clone();
    let (backend, remote) = MockBackendCreator::new_backend_with_remote(backend_type, graphics, config);
    (backend, remote, gl)
}

/// Same as `mock_backend`, initialized
pub fn initialized_backend(backend_type: VRBackendType) -> (VRBackendPtr, MockVRRemote, Rc<MockGraphicsDevice>) {
    let (backend, remote, gl) = mock_backend(backend_type, &HmdConfig::default());
    assert!(backend.borrow_mut().initialize());
    (backend, remote, gl)
}

pub fn transform_point(m: &Matrix4, p: [f32; 3]) -> [f32; 3] {
    [m[0] * p[0] + m[4] * p[1] + m[8] * p[2] + m[12],
     m[1] * p[0] + m[5] * p[1] + m[9] * p[2] + m[13],
     m[2] * p[0] + m[6] * p[1] + m[10] * p[2] + m[14]]
}

pub fn assert_near(actual: [f32; 3], expected: [f32; 3]) {
    for i in 0..3 {
        assert!((actual[i] - expected[i]).abs() < 1e-5, "{:?} != {:?}", actual, expected);
    }
}

/// Index of the first recorded vendor call named `name`, arguments ignored
pub fn position_of(calls: &[String], name: &str) -> usize {
    let with_args = format!("{} ", name);
    calls.iter()
         .position(|call| call == name || call.starts_with(&with_args))
         .unwrap_or_else(|| panic!("{} not called in {:?}", name, calls))
}
