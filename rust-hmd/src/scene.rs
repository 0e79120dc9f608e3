use rust_hmd_api::vr_framebuffer::normalized_eye_rect;
use rust_hmd_api::{Matrix4, ModelTexture, RenderModel, TrackedObjectType, VRBackendPtr, VREye};
use std::collections::BTreeMap;

/// Stereo camera following the headset.
///
/// Holds the per-eye projection and view matrices and the normalized
/// viewport of each eye inside the shared render target.
pub struct StereoCamera {
    backend: VRBackendPtr,
    projections: [Matrix4; 2],
    eye_transforms: [Matrix4; 2],
    viewport_rects: [[f32; 4]; 2],
}

impl StereoCamera {
    pub fn new(backend: VRBackendPtr) -> StereoCamera {
        StereoCamera {
            backend: backend,
            projections: [identity_matrix!(), identity_matrix!()],
            eye_transforms: [identity_matrix!(), identity_matrix!()],
            viewport_rects: [normalized_eye_rect(VREye::Left), normalized_eye_rect(VREye::Right)],
        }
    }

    pub fn set_projections(&mut self, left: Matrix4, right: Matrix4) {
        self.projections = [left, right];
    }

    /// Per-eye view matrices of the current frame
    pub fn set_eye_transforms(&mut self, left: Matrix4, right: Matrix4) {
        self.eye_transforms = [left, right];
    }

    pub fn projection(&self, eye: VREye) -> &Matrix4 {
        &self.projections[eye.index()]
    }

    pub fn view_matrix(&self, eye: VREye) -> &Matrix4 {
        &self.eye_transforms[eye.index()]
    }

    /// `[x, y, width, height]` in render target units
    pub fn viewport_rect(&self, eye: VREye) -> [f32; 4] {
        self.viewport_rects[eye.index()]
    }

    pub fn tracked_objects(&self) -> Vec<u32> {
        self.backend.borrow_mut().currently_tracked_objects()
    }

    pub fn tracked_object_matrix(&self, id: u32) -> Option<Matrix4> {
        let mut transform = identity_matrix!();
        if self.backend.borrow_mut().tracked_object(id, &mut transform) {
            Some(transform)
        } else {
            None
        }
    }
}

/// Scene node mirroring one tracked device.
pub struct TrackedObjectNode {
    backend: VRBackendPtr,
    id: u32,
    object_type: TrackedObjectType,
    transform: Matrix4,
    model: Option<RenderModel>,
}

impl TrackedObjectNode {
    pub fn new(backend: VRBackendPtr, id: u32) -> TrackedObjectNode {
        let object_type = backend.borrow_mut().tracked_object_type(id);
        TrackedObjectNode {
            backend: backend,
            id: id,
            object_type: object_type,
            transform: identity_matrix!(),
            model: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn object_type(&self) -> TrackedObjectType {
        self.object_type
    }

    /// World transform from the last successful update
    pub fn transform(&self) -> &Matrix4 {
        &self.transform
    }

    /// Refreshes the transform. Keeps the previous one when the device
    /// has no valid pose this frame.
    pub fn update_transform(&mut self) -> bool {
        self.backend.borrow_mut().tracked_object(self.id, &mut self.transform)
    }

    /// Render model of the device, loaded on first use.
    /// Failed loads are retried on the next call.
    pub fn model(&mut self) -> Option<&RenderModel> {
        if self.model.is_none() {
            let mut vertices = Vec::new();
            let mut indices = Vec::new();
            let mut texture = ModelTexture::default();
            let loaded = self.backend.borrow_mut().tracked_object_model(self.id, &mut vertices, &mut indices,
                                                                         &mut texture);
            if loaded {
                self.model = Some(RenderModel {
                    vertices: vertices,
                    indices: indices,
                    texture: texture,
                });
            }
        }
        self.model.as_ref()
    }
}

/// The headset side of a scene: one camera and one node per tracked device,
/// all sharing the same backend handle.
pub struct Scene {
    backend: VRBackendPtr,
    camera: StereoCamera,
    nodes: BTreeMap<u32, TrackedObjectNode>,
}

impl Scene {
    pub fn new(backend: VRBackendPtr) -> Scene {
        Scene {
            camera: StereoCamera::new(backend.clone()),
            backend: backend,
            nodes: BTreeMap::new(),
        }
    }

    pub fn camera(&self) -> &StereoCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut StereoCamera {
        &mut self.camera
    }

    pub fn node(&self, id: u32) -> Option<&TrackedObjectNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: u32) -> Option<&mut TrackedObjectNode> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TrackedObjectNode> {
        self.nodes.values()
    }

    /// Adds nodes for newly tracked devices, drops the ones no longer
    /// tracked and refreshes every transform.
    pub fn sync_tracked_objects(&mut self) {
        let tracked = self.camera.tracked_objects();
        self.nodes.retain(|id, _| {
            let keep = tracked.contains(id);
            if !keep {
                debug!("Tracked object {} lost", id);
            }
            keep
        });
        for id in tracked {
            if !self.nodes.contains_key(&id) {
                debug!("Tracked object {} found", id);
                self.nodes.insert(id, TrackedObjectNode::new(self.backend.clone(), id));
            }
        }
        for node in self.nodes.values_mut() {
            node.update_transform();
        }
    }
}
