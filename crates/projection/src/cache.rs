//! Memoized projection keyed by the frame fields it depends on.

use atlas_common::{FrameKey, FrameState};
use tracing::trace;

use crate::{ProjectionError, ScreenProjection};

/// Holds the projection of the last frame and rebuilds it only when the
/// extent, size or resolution changes.
#[derive(Debug, Default)]
pub struct ProjectionCache {
    entry: Option<(FrameKey, ScreenProjection)>,
    computations: u64,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the projection for `frame`, recomputing only on a key change.
    pub fn get(&mut self, frame: &FrameState) -> Result<ScreenProjection, ProjectionError> {
        let key = frame.key();
        if let Some((cached_key, projection)) = &self.entry {
            if *cached_key == key {
                return Ok(*projection);
            }
        }

        let projection = ScreenProjection::from_frame(frame)?;
        self.computations += 1;
        trace!(
            resolution = frame.resolution(),
            width = frame.width(),
            height = frame.height(),
            "projection recomputed"
        );
        self.entry = Some((key, projection));
        Ok(projection)
    }

    /// Key of the cached projection, if any.
    pub fn key(&self) -> Option<FrameKey> {
        self.entry.as_ref().map(|(k, _)| *k)
    }

    /// Number of times a projection was actually built.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_common::Extent;

    #[test]
    fn test_unchanged_frame_hits_cache() {
        let frame = FrameState::new(Extent::new(0.0, 0.0, 10.0, 10.0), [100, 100], 0.1);
        let mut cache = ProjectionCache::new();
        let a = cache.get(&frame).unwrap();
        let b = cache.get(&frame).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.computations(), 1);
    }

    #[test]
    fn test_pan_recomputes() {
        let mut frame = FrameState::new(Extent::new(0.0, 0.0, 10.0, 10.0), [100, 100], 0.1);
        let mut cache = ProjectionCache::new();
        cache.get(&frame).unwrap();
        frame.extent = Extent::new(1.0, 0.0, 11.0, 10.0);
        cache.get(&frame).unwrap();
        assert_eq!(cache.computations(), 2);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let frame = FrameState::new(Extent::new(0.0, 0.0, 10.0, 10.0), [100, 100], 0.1);
        let mut cache = ProjectionCache::new();
        cache.get(&frame).unwrap();
        cache.invalidate();
        assert!(cache.key().is_none());
        cache.get(&frame).unwrap();
        assert_eq!(cache.computations(), 2);
    }
}
