use crate::VREye;

/// Pixel size of the combined render target, both eyes side by side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct RenderTargetSize {
    pub width: u32,
    pub height: u32,
}

impl RenderTargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width,
            height: height,
        }
    }

    /// Size of a target holding two eyes of `eye_width` x `eye_height`
    pub fn side_by_side(eye_width: u32, eye_height: u32) -> Self {
        Self::new(eye_width * 2, eye_height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The rectangle one eye renders into.
    /// Left covers columns `[0, W/2)`, right covers `[W/2, W)`.
    pub fn eye_viewport(&self, eye: VREye) -> VRViewport {
        let half = (self.width / 2) as i32;
        match eye {
            VREye::Left => VRViewport::new(0, 0, half, self.height as i32),
            VREye::Right => VRViewport::new(half, 0, self.width as i32 - half, self.height as i32),
        }
    }

    pub fn eye_viewports(&self) -> [VRViewport; 2] {
        [self.eye_viewport(VREye::Left), self.eye_viewport(VREye::Right)]
    }
}

/// Eye rectangle in normalized target coordinates: `[x, y, width, height]`.
pub fn normalized_eye_rect(eye: VREye) -> [f32; 4] {
    match eye {
        VREye::Left => [0.0, 0.0, 0.5, 1.0],
        VREye::Right => [0.5, 0.0, 0.5, 1.0],
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRViewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl VRViewport {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x: x,
            y: y,
            width: width,
            height: height,
        }
    }
}

/// GL texture a backend exposes for on-screen preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorTexture {
    pub texture_id: u32,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_viewports_split_target_in_half() {
        let size = RenderTargetSize::new(2000, 1200);
        let [left, right] = size.eye_viewports();
        assert_eq!(left, VRViewport::new(0, 0, 1000, 1200));
        assert_eq!(right, VRViewport::new(1000, 0, 1000, 1200));
        assert_eq!(left.x + left.width, right.x);
        assert_eq!(left.width + right.width, 2000);
    }

    #[test]
    fn odd_width_is_fully_covered() {
        let size = RenderTargetSize::new(1513, 840);
        let [left, right] = size.eye_viewports();
        assert_eq!(left.width, 756);
        assert_eq!(right.x, 756);
        assert_eq!(right.x + right.width, 1513);
    }

    #[test]
    fn normalized_rects_match_pixel_split() {
        assert_eq!(normalized_eye_rect(VREye::Left), [0.0, 0.0, 0.5, 1.0]);
        assert_eq!(normalized_eye_rect(VREye::Right), [0.5, 0.0, 0.5, 1.0]);
    }
}
