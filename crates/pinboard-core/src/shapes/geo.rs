//! Rectangle geometry shape.

use super::{ColorStyle, Shape, ShapeProps};
use crate::handler::{ShapeCapabilities, ShapeHandler};
use kurbo::{BezPath, Rect, RoundedRect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};

/// Type tag for geometry shapes.
pub const GEO: &str = "geo";

/// Properties of a rectangle shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoProps {
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub color: ColorStyle,
    /// Corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius: f64,
}

impl GeoProps {
    pub fn new(w: f64, h: f64) -> Self {
        Self {
            w,
            h,
            color: ColorStyle::default(),
            corner_radius: 0.0,
        }
    }

    pub fn with_color(mut self, color: ColorStyle) -> Self {
        self.color = color;
        self
    }
}

impl Default for GeoProps {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

/// Handler for [`GEO`] shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoShapeHandler;

impl ShapeHandler for GeoShapeHandler {
    fn kind(&self) -> &'static str {
        GEO
    }

    fn default_props(&self) -> ShapeProps {
        ShapeProps::Geo(GeoProps::default())
    }

    fn capabilities(&self) -> ShapeCapabilities {
        ShapeCapabilities::default()
    }

    fn geometry(&self, shape: &Shape) -> Rect {
        match &shape.props {
            ShapeProps::Geo(props) => Rect::new(0.0, 0.0, props.w, props.h),
            _ => Rect::ZERO,
        }
    }

    fn indicator(&self, shape: &Shape) -> BezPath {
        let rect = self.geometry(shape);
        match &shape.props {
            ShapeProps::Geo(props) if props.corner_radius > 0.0 => {
                RoundedRect::from_rect(rect, props.corner_radius).to_path(0.1)
            }
            _ => rect.to_path(0.1),
        }
    }

    fn on_resize(&self, shape: &Shape, size: Size) -> Option<ShapeProps> {
        match &shape.props {
            ShapeProps::Geo(props) => Some(ShapeProps::Geo(GeoProps {
                w: size.width.abs(),
                h: size.height.abs(),
                ..props.clone()
            })),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry() {
        let shape = Shape::new(ShapeProps::Geo(GeoProps::new(40.0, 30.0)));
        let rect = GeoShapeHandler.geometry(&shape);
        assert!((rect.width() - 40.0).abs() < f64::EPSILON);
        assert!((rect.height() - 30.0).abs() < f64::EPSILON);
        assert_eq!(rect.origin(), kurbo::Point::ZERO);
    }

    #[test]
    fn test_resize_keeps_color() {
        let shape = Shape::new(ShapeProps::Geo(
            GeoProps::new(40.0, 30.0).with_color(ColorStyle::Blue),
        ));
        let resized = GeoShapeHandler
            .on_resize(&shape, Size::new(-80.0, 10.0))
            .unwrap();
        let ShapeProps::Geo(props) = resized else {
            panic!("expected geo props");
        };
        assert!((props.w - 80.0).abs() < f64::EPSILON);
        assert_eq!(props.color, ColorStyle::Blue);
    }
}
