//! Toolbar and control bar state.
//!
//! The app does not draw anything itself; the platform reads a [`UiState`]
//! snapshot each frame and reports clicks back as [`UiAction`]s.

use kurbo::Rect;
use pinboard_core::Canvas;
use pinboard_core::tools::screenshot_overlay;

/// Background of an enabled "Open PDF" / "Export PDF" button.
pub const PRIMARY_BUTTON_COLOR: &str = "#3b82f6";
/// Background of the "Load from URL" button.
pub const SECONDARY_BUTTON_COLOR: &str = "#10b981";
/// Background of a disabled button.
pub const DISABLED_BUTTON_COLOR: &str = "#9ca3af";

/// Actions triggered from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Change the current tool.
    SetTool(String),
    /// Cancel the current tool's interaction.
    Cancel,
    /// Show the platform file picker and load the chosen PDF.
    OpenPdf,
    /// Load a PDF from a URL.
    LoadPdfFromUrl(String),
    /// Export the annotated PDF.
    ExportPdf,
}

/// One tool button in the toolbar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarItem {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub kbd: &'static str,
    pub is_selected: bool,
}

/// Toolbar entries for every registered tool, in registration order.
pub fn toolbar_items(canvas: &Canvas) -> Vec<ToolbarItem> {
    canvas
        .registry()
        .tool_descriptors()
        .into_iter()
        .map(|tool| ToolbarItem {
            id: tool.id,
            label: tool.label,
            icon: tool.icon,
            kbd: tool.kbd,
            is_selected: canvas.current_tool() == tool.id,
        })
        .collect()
}

/// A button in the control bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlButton {
    pub label: String,
    pub disabled: bool,
    background: &'static str,
}

impl ControlButton {
    pub fn new(label: impl Into<String>, background: &'static str) -> Self {
        Self {
            label: label.into(),
            disabled: false,
            background,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Background colour, grey while disabled.
    pub fn background(&self) -> &'static str {
        if self.disabled {
            DISABLED_BUTTON_COLOR
        } else {
            self.background
        }
    }
}

/// Everything the platform needs to draw the chrome around the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub title: String,
    pub toolbar: Vec<ToolbarItem>,
    pub open_button: ControlButton,
    pub url_button: ControlButton,
    pub export_button: ControlButton,
    /// Status line next to the buttons.
    pub status: Option<String>,
    /// Whether the status line shows an error.
    pub status_is_error: bool,
    /// Screenshot selection box in viewport coordinates.
    pub screenshot_box: Option<Rect>,
}

/// The current tool's selection box (the screenshot drag) in viewport space.
pub fn screenshot_box(canvas: &Canvas) -> Option<Rect> {
    Some(screenshot_overlay(canvas, canvas.tool_overlay()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinboard_core::Editor;

    #[test]
    fn test_toolbar_items() {
        let mut canvas = Canvas::default();
        canvas.set_current_tool("pin");
        let items = toolbar_items(&canvas);
        let ids: Vec<_> = items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec!["size-button", "pin", "screenshot"]);
        assert_eq!(items[0].icon, "group");
        assert!(!items[0].is_selected);
        assert!(items[1].is_selected);
    }

    #[test]
    fn test_disabled_button() {
        let button = ControlButton::new("Export PDF", PRIMARY_BUTTON_COLOR);
        assert_eq!(button.background(), "#3b82f6");
        assert_eq!(button.disabled(true).background(), "#9ca3af");
    }

    #[test]
    fn test_no_screenshot_box_outside_tool() {
        let canvas = Canvas::default();
        assert!(screenshot_box(&canvas).is_none());
    }
}
