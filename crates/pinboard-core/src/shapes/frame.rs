//! Frame shape: a named container other shapes can be parented to.

use super::{Shape, ShapeProps};
use crate::handler::{ShapeCapabilities, ShapeHandler};
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

/// Type tag for frames.
pub const FRAME: &str = "frame";

/// Properties of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameProps {
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub name: String,
}

impl FrameProps {
    pub fn new(w: f64, h: f64) -> Self {
        Self {
            w,
            h,
            name: String::new(),
        }
    }
}

impl Default for FrameProps {
    fn default() -> Self {
        Self::new(160.0, 90.0)
    }
}

/// Handler for [`FRAME`] shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameShapeHandler;

impl ShapeHandler for FrameShapeHandler {
    fn kind(&self) -> &'static str {
        FRAME
    }

    fn default_props(&self) -> ShapeProps {
        ShapeProps::Frame(FrameProps::default())
    }

    fn capabilities(&self) -> ShapeCapabilities {
        ShapeCapabilities {
            editable: true,
            ..ShapeCapabilities::default()
        }
    }

    fn geometry(&self, shape: &Shape) -> Rect {
        match &shape.props {
            ShapeProps::Frame(props) => Rect::new(0.0, 0.0, props.w, props.h),
            _ => Rect::ZERO,
        }
    }

    fn on_resize(&self, shape: &Shape, size: Size) -> Option<ShapeProps> {
        match &shape.props {
            ShapeProps::Frame(props) => Some(ShapeProps::Frame(FrameProps {
                w: size.width.abs(),
                h: size.height.abs(),
                name: props.name.clone(),
            })),
            _ => None,
        }
    }
}
