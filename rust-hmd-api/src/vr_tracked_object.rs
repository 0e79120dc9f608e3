/// Upper bound of tracked object ids, shared by all runtimes.
pub const MAX_TRACKED_OBJECTS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum TrackedObjectType {
    Head,
    LeftHand,
    RightHand,
    LighthouseOrSensor,
    Other,
}

impl Default for TrackedObjectType {
    fn default() -> TrackedObjectType {
        TrackedObjectType::Other
    }
}

/// Floats per interleaved vertex: position(3), normal(3), texcoord(2)
pub const VERTEX_STRIDE: usize = 8;

/// RGBA8 texture of a render model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTexture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ModelTexture {
    pub fn is_empty(&self) -> bool {
        self.rgba.is_empty()
    }
}

/// Mesh describing the physical look of a tracked device.
/// Indices form a triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderModel {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub texture: ModelTexture,
}

impl RenderModel {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Copies the model into caller owned buffers
    pub fn write_to(&self, vertices: &mut Vec<f32>, indices: &mut Vec<u32>, texture: &mut ModelTexture) {
        vertices.clear();
        vertices.extend_from_slice(&self.vertices);
        indices.clear();
        indices.extend_from_slice(&self.indices);
        *texture = self.texture.clone();
    }
}
