//! Pointer handlers, one per view mode.
//!
//! Each handler only knows its own granularity; switching modes swaps the
//! handler instead of checking a mode flag inside a shared one.

use layers::{Granularity, LayerHit, LayerManager};

pub trait PointerHandler {
    fn name(&self) -> &'static str;

    fn granularity(&self) -> Granularity;

    /// Feature under the pointer among layers of this handler's granularity.
    fn target(&self, manager: &LayerManager, position: (f32, f32)) -> Option<LayerHit> {
        let (x, y) = position;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        manager.hit_test_topmost(x, y, Some(self.granularity()))
    }
}

/// Coarse administrative region view.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionHandler;

impl PointerHandler for RegionHandler {
    fn name(&self) -> &'static str {
        "region"
    }

    fn granularity(&self) -> Granularity {
        Granularity::Region
    }
}

/// Fine parcel view.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParcelHandler;

impl PointerHandler for ParcelHandler {
    fn name(&self) -> &'static str {
        "parcel"
    }

    fn granularity(&self) -> Granularity {
        Granularity::Parcel
    }
}
