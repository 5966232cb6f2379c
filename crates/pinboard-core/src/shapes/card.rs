//! Size-button card: a resizable box with a click counter.

use super::{ColorStyle, SerializableColor, Shape, ShapeProps};
use crate::handler::{ShapeCapabilities, ShapeHandler};
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Type tag for size-button cards.
pub const SIZE_BUTTON: &str = "size-button";

/// Properties of a size-button card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardProps {
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub color: ColorStyle,
}

impl CardProps {
    /// Size caption shown on the card, e.g. `300 × 200`.
    pub fn size_label(&self) -> String {
        format!("{} × {}", self.w.round(), self.h.round())
    }

    pub fn background(&self) -> SerializableColor {
        self.color.semi()
    }

    pub fn foreground(&self) -> SerializableColor {
        self.color.solid()
    }
}

impl Default for CardProps {
    fn default() -> Self {
        Self {
            w: 300.0,
            h: 200.0,
            color: ColorStyle::Black,
        }
    }
}

/// View-local state of one rendered card.
///
/// The click count lives with the view, not the document: it is not
/// persisted and resets when the view is recreated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardView {
    count: u32,
}

impl CardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on the card's button.
    pub fn click(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn caption(&self) -> String {
        format!("Clicks: {}", self.count)
    }
}

/// Handler for [`SIZE_BUTTON`] shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct CardShapeHandler;

impl ShapeHandler for CardShapeHandler {
    fn kind(&self) -> &'static str {
        SIZE_BUTTON
    }

    fn default_props(&self) -> ShapeProps {
        ShapeProps::Card(CardProps::default())
    }

    fn capabilities(&self) -> ShapeCapabilities {
        ShapeCapabilities {
            resizable: true,
            aspect_ratio_locked: false,
            editable: false,
            hide_rotate_handle: false,
        }
    }

    fn geometry(&self, shape: &Shape) -> Rect {
        match &shape.props {
            ShapeProps::Card(props) => Rect::new(0.0, 0.0, props.w, props.h),
            _ => Rect::ZERO,
        }
    }

    fn on_resize(&self, shape: &Shape, size: Size) -> Option<ShapeProps> {
        match &shape.props {
            ShapeProps::Card(props) => Some(ShapeProps::Card(CardProps {
                w: size.width.abs(),
                h: size.height.abs(),
                color: props.color,
            })),
            _ => None,
        }
    }
}
