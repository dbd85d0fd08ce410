//! Tooltip overlay owned by each layer.

use serde::Serialize;

/// Pixel offset from the pointer so the tooltip does not sit under it.
pub const DEFAULT_OFFSET: (f32, f32) = (12.0, 12.0);

/// One tooltip node: markup, anchor position and visibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    html: String,
    pointer: (f32, f32),
    offset: (f32, f32),
    visible: bool,
}

impl Default for Tooltip {
    fn default() -> Self {
        Self {
            html: String::new(),
            pointer: (0.0, 0.0),
            offset: DEFAULT_OFFSET,
            visible: false,
        }
    }
}

impl Tooltip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, dx: f32, dy: f32) -> Self {
        self.offset = (dx, dy);
        self
    }

    pub fn show(&mut self, html: String, pointer: (f32, f32)) {
        self.html = html;
        self.pointer = pointer;
        self.visible = true;
    }

    /// Reposition only; content is untouched.
    pub fn move_to(&mut self, pointer: (f32, f32)) {
        self.pointer = pointer;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Hide and drop the content.
    pub fn reset(&mut self) {
        self.hide();
        self.html.clear();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    /// Top-left corner of the tooltip box.
    pub fn position(&self) -> (f32, f32) {
        (self.pointer.0 + self.offset.0, self.pointer.1 + self.offset.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_keeps_content() {
        let mut tip = Tooltip::new();
        tip.show("<b>North</b>".to_string(), (10.0, 20.0));
        tip.move_to((30.0, 40.0));
        assert!(tip.is_visible());
        assert_eq!(tip.html(), "<b>North</b>");
        assert_eq!(tip.position(), (42.0, 52.0));
    }

    #[test]
    fn test_hide_and_reset() {
        let mut tip = Tooltip::new().with_offset(0.0, 0.0);
        tip.show("x".to_string(), (1.0, 1.0));
        tip.hide();
        assert!(!tip.is_visible());
        assert_eq!(tip.html(), "x");
        tip.reset();
        assert!(tip.html().is_empty());
    }
}
