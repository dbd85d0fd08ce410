//! Pointer events and the listener registry.

use tracing::debug;

use crate::handler::PointerHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Click,
    /// Pointer left the map container.
    Leave,
}

/// A pointer event in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: (f32, f32),
}

impl PointerEvent {
    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Move,
            position: (x, y),
        }
    }

    pub fn click(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Click,
            position: (x, y),
        }
    }

    pub fn leave() -> Self {
        Self {
            kind: PointerKind::Leave,
            position: (f32::NAN, f32::NAN),
        }
    }
}

/// Handle returned by [`PointerListeners::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey(u64);

/// Registered pointer handlers.
#[derive(Default)]
pub struct PointerListeners {
    next_key: u64,
    entries: Vec<(ListenerKey, Box<dyn PointerHandler>)>,
}

impl std::fmt::Debug for PointerListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, h)| (k.0, h.name())))
            .finish()
    }
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, handler: Box<dyn PointerHandler>) -> ListenerKey {
        self.next_key += 1;
        let key = ListenerKey(self.next_key);
        debug!(key = key.0, handler = handler.name(), "pointer listener attached");
        self.entries.push((key, handler));
        key
    }

    /// Remove a listener, returning its handler. Unknown keys are ignored.
    pub fn detach(&mut self, key: ListenerKey) -> Option<Box<dyn PointerHandler>> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        let (_, handler) = self.entries.remove(pos);
        debug!(key = key.0, handler = handler.name(), "pointer listener detached");
        Some(handler)
    }

    pub fn detach_all(&mut self) {
        for (key, handler) in self.entries.drain(..) {
            debug!(key = key.0, handler = handler.name(), "pointer listener detached");
        }
    }

    pub fn get(&self, key: ListenerKey) -> Option<&dyn PointerHandler> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, h)| h.as_ref())
    }

    /// Number of attached listeners.
    pub fn live(&self) -> usize {
        self.entries.len()
    }
}
