//! Hover and selection state machine for one map instance.
//!
//! Hover is `Idle` or `Hovering(feature)`; selection is independent of it.
//! Hovering lays an outline override on the feature's own layer and restores
//! the captured override when the pointer moves on. Selection never touches layer
//! styles, it only fills the shared [`HighlightOverlay`].

use atlas_common::{AtlasResult, FrameState};
use layers::{LayerHit, LayerManager};
use renderer::{StyleOverride, Surface};
use tracing::debug;

use crate::events::{ListenerKey, PointerEvent, PointerKind, PointerListeners};
use crate::handler::PointerHandler;
use crate::overlay::HighlightOverlay;

/// What a dispatched event changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// No handler attached, or nothing changed.
    None,
    /// Pointer moved within the hovered feature.
    HoverMoved,
    /// A new feature is hovered; the previous one, if any, was restored.
    HoverEntered(LayerHit),
    /// The hovered feature was restored and hover is idle.
    HoverLeft(LayerHit),
    Selected(LayerHit),
    SelectionCleared,
}

#[derive(Debug)]
struct Hover {
    hit: LayerHit,
    /// Override the feature had before the highlight was applied.
    original: Option<StyleOverride>,
}

#[derive(Debug, Default)]
pub struct HighlightCoordinator {
    listeners: PointerListeners,
    active: Option<ListenerKey>,
    hovered: Option<Hover>,
    overlay: HighlightOverlay,
}

impl HighlightCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the pointer handler. If one is already live this is a mode
    /// switch.
    pub fn attach(&mut self, handler: Box<dyn PointerHandler>) -> ListenerKey {
        match self.active {
            Some(_) => self.swap_handler(handler),
            None => {
                let key = self.listeners.attach(handler);
                self.active = Some(key);
                key
            }
        }
    }

    /// Replace the live handler: the old one is detached before the new one
    /// is attached, and any hover from the old mode is restored first.
    pub fn switch_mode(&mut self, handler: Box<dyn PointerHandler>, manager: &mut LayerManager) -> ListenerKey {
        self.restore_hover(manager);
        self.swap_handler(handler)
    }

    fn swap_handler(&mut self, handler: Box<dyn PointerHandler>) -> ListenerKey {
        let previous = self.active.take().and_then(|key| self.listeners.detach(key));
        let key = self.listeners.attach(handler);
        self.active = Some(key);
        debug!(
            from = previous.as_ref().map(|h| h.name()),
            to = self.mode(),
            "pointer mode switched"
        );
        key
    }

    /// Name of the live handler.
    pub fn mode(&self) -> Option<&'static str> {
        self.handler().map(|h| h.name())
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners.live()
    }

    fn handler(&self) -> Option<&dyn PointerHandler> {
        self.listeners.get(self.active?)
    }

    pub fn hovered(&self) -> Option<&LayerHit> {
        self.hovered.as_ref().map(|h| &h.hit)
    }

    pub fn selected(&self) -> Option<&LayerHit> {
        self.overlay.selection()
    }

    pub fn overlay(&self) -> &HighlightOverlay {
        &self.overlay
    }

    /// Route one pointer event through the live handler.
    pub fn dispatch(&mut self, event: PointerEvent, manager: &mut LayerManager) -> Transition {
        let target = match self.handler() {
            Some(handler) => match event.kind {
                PointerKind::Leave => None,
                PointerKind::Move | PointerKind::Click => handler.target(manager, event.position),
            },
            None => return Transition::None,
        };

        match event.kind {
            PointerKind::Move => self.hover(target, event.position, manager),
            PointerKind::Leave => self.hover(None, event.position, manager),
            PointerKind::Click => self.select(target, manager),
        }
    }

    fn hover(&mut self, target: Option<LayerHit>, pointer: (f32, f32), manager: &mut LayerManager) -> Transition {
        if let (Some(current), Some(target)) = (&self.hovered, &target) {
            if current.hit == *target {
                if let Some(layer) = manager.get_mut(&target.layer_id) {
                    layer.move_tooltip(pointer);
                }
                return Transition::HoverMoved;
            }
        }

        let left = self.restore_hover(manager);

        let Some(hit) = target else {
            return match left {
                Some(hit) => Transition::HoverLeft(hit),
                None => Transition::None,
            };
        };

        let Some(layer) = manager.get_mut(&hit.layer_id) else {
            return Transition::None;
        };
        let original = layer.style_override(&hit.feature_id);
        if let Some(highlight) = layer.highlight_style(&hit.feature_id) {
            layer.set_style_override(&hit.feature_id, Some(highlight));
        }
        layer.show_tooltip(&hit.feature_id, pointer);
        debug!(layer = %hit.layer_id, feature = %hit.feature_id, "hover entered");

        self.hovered = Some(Hover {
            hit: hit.clone(),
            original,
        });
        Transition::HoverEntered(hit)
    }

    /// Put the hovered feature back the way it was. Missing layers or
    /// features are skipped.
    fn restore_hover(&mut self, manager: &mut LayerManager) -> Option<LayerHit> {
        let hover = self.hovered.take()?;
        if let Some(layer) = manager.get_mut(&hover.hit.layer_id) {
            layer.set_style_override(&hover.hit.feature_id, hover.original);
            layer.hide_tooltip();
        }
        debug!(layer = %hover.hit.layer_id, feature = %hover.hit.feature_id, "hover restored");
        Some(hover.hit)
    }

    fn select(&mut self, target: Option<LayerHit>, manager: &LayerManager) -> Transition {
        let selection = target.and_then(|hit| {
            let geometry = manager.get(&hit.layer_id)?.feature_geometry(&hit.feature_id)?;
            Some((hit, geometry))
        });

        match selection {
            Some((hit, geometry)) => {
                debug!(layer = %hit.layer_id, feature = %hit.feature_id, "feature selected");
                self.overlay.set(hit.clone(), geometry);
                Transition::Selected(hit)
            }
            None => self.clear_selection(),
        }
    }

    pub fn clear_selection(&mut self) -> Transition {
        if self.overlay.is_empty() {
            return Transition::None;
        }
        self.overlay.clear();
        debug!("selection cleared");
        Transition::SelectionCleared
    }

    /// Remove a layer, restoring its hovered feature and dropping its
    /// selection first.
    pub fn unmount(&mut self, layer_id: &str, manager: &mut LayerManager) -> AtlasResult<()> {
        if self.hovered().is_some_and(|h| h.layer_id == layer_id) {
            self.restore_hover(manager);
        }
        if self.selected().is_some_and(|h| h.layer_id == layer_id) {
            self.clear_selection();
        }
        manager.remove_and_dispose(layer_id)?;
        debug!(layer = layer_id, "layer unmounted");
        Ok(())
    }

    /// Restore every mutated style, clear the selection and detach the
    /// pointer handler.
    pub fn teardown(&mut self, manager: &mut LayerManager) {
        self.restore_hover(manager);
        self.clear_selection();
        self.active = None;
        self.listeners.detach_all();
        debug!("highlight coordinator torn down");
    }

    /// Render the selection overlay for `frame`.
    pub fn render_overlay(&mut self, frame: Option<&FrameState>) -> AtlasResult<Option<&Surface>> {
        self.overlay.render(frame)
    }

    /// Compose every layer and put the selection overlay on top.
    pub fn compose(&mut self, manager: &LayerManager, frame: &FrameState) -> AtlasResult<Surface> {
        let mut target = manager.compose(frame)?;
        if let Some(overlay) = self.overlay.render(Some(frame))? {
            target.draw_surface(overlay, 1.0);
        }
        Ok(target)
    }
}
