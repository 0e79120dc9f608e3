use crate::Matrix4;

/// Holds one vendor pose sample for the duration of a frame.
///
/// The first read after `invalidate` samples the runtime, later reads in
/// the same frame reuse that sample.
#[derive(Debug)]
pub struct PoseCache<T> {
    sample: Option<T>,
    samples_taken: u64,
}

impl<T> Default for PoseCache<T> {
    fn default() -> Self {
        PoseCache {
            sample: None,
            samples_taken: 0,
        }
    }
}

impl<T> PoseCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fresh(&self) -> bool {
        self.sample.is_some()
    }

    pub fn get_or_sample<F>(&mut self, sample: F) -> &T where F: FnOnce() -> T {
        if self.sample.is_none() {
            self.samples_taken += 1;
            trace!("Sampling tracked poses ({})", self.samples_taken);
        }
        self.sample.get_or_insert_with(sample)
    }

    /// The sample of the current frame, if any was taken
    pub fn cached(&self) -> Option<&T> {
        self.sample.as_ref()
    }

    /// Marks the sample stale, the next read samples again
    pub fn invalidate(&mut self) {
        self.sample = None;
    }

    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }
}

/// Per-eye projections keyed by the clip planes they were built with.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    clip: Option<(f32, f32)>,
    matrices: [Matrix4; 2],
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached pair, rebuilding it only if `near` or `far` changed
    pub fn get_or_compute<F>(&mut self, near: f32, far: f32, compute: F) -> &[Matrix4; 2]
        where F: FnOnce(f32, f32) -> [Matrix4; 2] {
        if self.clip != Some((near, far)) {
            self.matrices = compute(near, far);
            self.clip = Some((near, far));
        }
        &self.matrices
    }

    pub fn invalidate(&mut self) {
        self.clip = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_once_until_invalidated() {
        let mut cache = PoseCache::new();
        let mut calls = 0;
        for _ in 0..5 {
            let value = *cache.get_or_sample(|| { calls += 1; 7 });
            assert_eq!(value, 7);
        }
        assert_eq!(calls, 1);
        assert!(cache.is_fresh());

        cache.invalidate();
        assert!(!cache.is_fresh());
        assert_eq!(*cache.get_or_sample(|| { calls += 1; 9 }), 9);
        assert_eq!(calls, 2);
        assert_eq!(cache.samples_taken(), 2);
    }

    #[test]
    fn projections_follow_clip_planes() {
        let mut cache = ProjectionCache::new();
        let mut builds = 0;
        let mut build = |near: f32, _far: f32| {
            builds += 1;
            let mut m: Matrix4 = identity_matrix!();
            m[14] = near;
            [m, m]
        };
        cache.get_or_compute(0.1, 1000.0, &mut build);
        cache.get_or_compute(0.1, 1000.0, &mut build);
        let pair = cache.get_or_compute(0.2, 1000.0, &mut build);
        assert_eq!(pair[0][14], 0.2);
        assert_eq!(builds, 2);
    }
}
