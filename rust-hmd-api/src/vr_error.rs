use thiserror::Error;

/// Failures reported by vendor runtimes and the graphics layer.
///
/// These never cross the `VRBackend` boundary: adapters log them and
/// return a boolean or empty result instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VRError {
    #[error("VR runtime is not installed")]
    RuntimeNotInstalled,
    #[error("no head mounted display present")]
    HmdNotPresent,
    #[error("failed to initialize VR runtime: {0}")]
    Initialization(String),
    #[error("compositor error: {0}")]
    Compositor(String),
    #[error("swap chain error: {0}")]
    SwapChain(String),
    #[error("failed to load render model: {0}")]
    RenderModel(String),
    #[error("timed out waiting for render model")]
    RenderModelTimeout,
    #[error("invalid tracked object id {0}")]
    InvalidTrackedObject(u32),
    #[error("tracked object {0} is disconnected")]
    DeviceDisconnected(u32),
    #[error("graphics context is not current")]
    ContextNotCurrent,
    #[error("no VR backend available")]
    NoBackend,
}
