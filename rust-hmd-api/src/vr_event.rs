/// Device notifications drained with `VRBackend::poll_events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum VREvent {
    /// A tracked object was connected, payload is its id
    TrackedObjectActivated(u32),
    TrackedObjectDeactivated(u32),
    /// Properties of a tracked object changed
    TrackedObjectUpdated(u32),
}

impl VREvent {
    pub fn tracked_object_id(&self) -> u32 {
        match *self {
            VREvent::TrackedObjectActivated(id) |
            VREvent::TrackedObjectDeactivated(id) |
            VREvent::TrackedObjectUpdated(id) => id,
        }
    }
}
