//! Interactive tools and the input types they receive.

mod card;
mod pin;
mod screenshot;

pub use card::CardTool;
pub use pin::PinTool;
pub use screenshot::{ScreenshotTool, screenshot_overlay};

use crate::shapes::ShapeId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// The host's built-in selection tool.
pub const SELECT_TOOL: &str = "select";

/// Screen-space distance a pointer must travel before a press becomes a drag.
pub const DRAG_DISTANCE: f64 = 4.0;

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        alt: false,
        ctrl: false,
    };
}

/// A pointer event in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub point: Point,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Toolbar metadata for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    /// Keyboard shortcut.
    pub kbd: &'static str,
}

/// What a finished screenshot drag asks the host to export.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotRequest {
    pub shape_ids: Vec<ShapeId>,
    /// Page-space region to export.
    pub bounds: Rect,
    /// Copy to the clipboard instead of downloading.
    pub copy_to_clipboard: bool,
}

/// Whether a press at `origin` has moved far enough to count as a drag.
pub(crate) fn is_drag(origin: Point, current: Point, zoom: f64) -> bool {
    (current - origin).hypot() * zoom > DRAG_DISTANCE
}
