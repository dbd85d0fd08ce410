//! Pointer interaction for mounted choropleth layers.
//!
//! One [`HighlightCoordinator`] per map instance owns the live pointer
//! handler, the hover and selection state, and the shared selection overlay.

pub mod coordinator;
pub mod events;
pub mod handler;
pub mod overlay;

pub use coordinator::{HighlightCoordinator, Transition};
pub use events::{ListenerKey, PointerEvent, PointerKind, PointerListeners};
pub use handler::{ParcelHandler, PointerHandler, RegionHandler};
pub use overlay::HighlightOverlay;
