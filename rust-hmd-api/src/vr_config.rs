use crate::VRBackendType;

/// Session settings read once at startup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde-serialization", serde(default))]
pub struct HmdConfig {
    /// Runtime to use, `None` tries Oculus then OpenVR
    pub backend: Option<VRBackendType>,
    /// Headset the frame driver binds and queries
    pub hmd_id: u32,
    pub near_clip: f32,
    pub far_clip: f32,
    /// Milliseconds kept free before vsync when budgeting background work
    pub incubation_margin_ms: i32,
    /// Upper bound of the blocking render model load
    pub render_model_timeout_ms: u64,
}

impl Default for HmdConfig {
    fn default() -> HmdConfig {
        HmdConfig {
            backend: None,
            hmd_id: 0,
            near_clip: 0.1,
            far_clip: 1000.0,
            incubation_margin_ms: 6,
            render_model_timeout_ms: 5000,
        }
    }
}

impl HmdConfig {
    pub fn with_backend(backend: VRBackendType) -> HmdConfig {
        HmdConfig {
            backend: Some(backend),
            ..Default::default()
        }
    }
}
