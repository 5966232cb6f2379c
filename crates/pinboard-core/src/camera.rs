//! Camera: pan/zoom transform and optional bounds constraints.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level shown as "100%" in the UI.
pub const BASE_ZOOM: f64 = 1.0;

/// How the zoom is chosen when the camera is reset under constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialZoom {
    /// Keep [`BASE_ZOOM`].
    #[default]
    Default,
    /// Fit the bounds' width to the padded viewport.
    FitX,
    /// Like `FitX`, but never above 100%.
    FitX100,
    FitY,
    /// The smaller of the x and y fits.
    FitMin,
    /// The larger of the x and y fits.
    FitMax,
}

/// How the camera may move relative to the constraint bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraBehavior {
    #[default]
    Free,
    /// Bounds smaller than the viewport stay at the origin point; larger
    /// bounds may pan but must keep covering the padded viewport.
    Contain,
}

/// Bounds the camera is constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConstraints {
    /// Page-space rectangle to keep in view.
    pub bounds: Rect,
    /// Screen-space padding around the bounds.
    pub padding: Vec2,
    /// Where undersized bounds sit in the viewport, as a fraction (0.5 = centred).
    pub origin: Point,
    pub initial_zoom: InitialZoom,
    pub behavior: CameraBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraOptions {
    pub constraints: Option<CameraConstraints>,
}

/// Camera manages the view transform for the canvas.
///
/// Page points map to screen points through `offset + page * zoom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan)
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    #[serde(default)]
    pub options: CameraOptions,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: BASE_ZOOM,
            min_zoom: 0.1,
            max_zoom: 8.0,
            options: CameraOptions::default(),
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to page transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_page(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn page_to_screen(&self, page_point: Point) -> Point {
        self.transform() * page_point
    }

    /// Page-space rectangle visible in a viewport of `viewport` size.
    pub fn visible_page_bounds(&self, viewport: Size) -> Rect {
        let p0 = self.screen_to_page(Point::ZERO);
        let p1 = self.screen_to_page(Point::new(viewport.width, viewport.height));
        Rect::from_points(p0, p1)
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2, viewport: Size) {
        self.offset += delta;
        self.constrain(viewport);
    }

    /// Zoom the camera, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64, viewport: Size) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let page_point = self.screen_to_page(screen_point);
        self.zoom = new_zoom;
        let new_screen = self.page_to_screen(page_point);
        self.offset += screen_point - new_screen;
        self.constrain(viewport);
    }

    pub fn set_options(&mut self, options: CameraOptions) {
        self.options = options;
    }

    /// Reset zoom and position. Under constraints the zoom comes from the
    /// initial-zoom rule and the bounds are placed at the origin point.
    pub fn reset(&mut self, viewport: Size) {
        let Some(constraints) = self.options.constraints else {
            self.offset = Vec2::ZERO;
            self.zoom = BASE_ZOOM;
            return;
        };

        let padded = padded_viewport(viewport, constraints.padding);
        let bounds = constraints.bounds;
        let fit_x = padded.width / bounds.width().max(1.0);
        let fit_y = padded.height / bounds.height().max(1.0);
        let zoom = match constraints.initial_zoom {
            InitialZoom::Default => BASE_ZOOM,
            InitialZoom::FitX => fit_x,
            InitialZoom::FitX100 => fit_x.min(BASE_ZOOM),
            InitialZoom::FitY => fit_y,
            InitialZoom::FitMin => fit_x.min(fit_y),
            InitialZoom::FitMax => fit_x.max(fit_y),
        };
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        self.offset = origin_offset(&constraints, padded, self.zoom);
    }

    /// Clamp the offset to the constraint behavior.
    pub fn constrain(&mut self, viewport: Size) {
        let Some(constraints) = self.options.constraints else {
            return;
        };
        if constraints.behavior == CameraBehavior::Free {
            return;
        }

        let padded = padded_viewport(viewport, constraints.padding);
        let bounds = constraints.bounds;
        let at_origin = origin_offset(&constraints, padded, self.zoom);
        let zoom = self.zoom;
        let scaled = Size::new(bounds.width() * zoom, bounds.height() * zoom);

        let clamp_axis = |offset: f64, origin: f64, scaled: f64, padded: f64, pad: f64, min: f64| {
            if scaled <= padded {
                origin
            } else {
                let hi = pad - min * zoom;
                let lo = pad + padded - scaled - min * zoom;
                offset.clamp(lo, hi)
            }
        };

        self.offset = Vec2::new(
            clamp_axis(
                self.offset.x,
                at_origin.x,
                scaled.width,
                padded.width,
                constraints.padding.x,
                bounds.x0,
            ),
            clamp_axis(
                self.offset.y,
                at_origin.y,
                scaled.height,
                padded.height,
                constraints.padding.y,
                bounds.y0,
            ),
        );
    }
}

fn padded_viewport(viewport: Size, padding: Vec2) -> Size {
    Size::new(
        (viewport.width - padding.x * 2.0).max(1.0),
        (viewport.height - padding.y * 2.0).max(1.0),
    )
}

/// Offset that places the bounds at the constraint origin.
fn origin_offset(constraints: &CameraConstraints, padded: Size, zoom: f64) -> Vec2 {
    let bounds = constraints.bounds;
    Vec2::new(
        constraints.padding.x + (padded.width - bounds.width() * zoom) * constraints.origin.x
            - bounds.x0 * zoom,
        constraints.padding.y + (padded.height - bounds.height() * zoom) * constraints.origin.y
            - bounds.y0 * zoom,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_constraints(bounds: Rect) -> CameraOptions {
        CameraOptions {
            constraints: Some(CameraConstraints {
                bounds,
                padding: Vec2::new(164.0, 64.0),
                origin: Point::new(0.5, 0.0),
                initial_zoom: InitialZoom::FitX100,
                behavior: CameraBehavior::Contain,
            }),
        }
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - BASE_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let page = camera.screen_to_page(original);
        let back = camera.page_to_screen(page);

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let viewport = Size::new(800.0, 600.0);
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001, viewport);
        assert!((camera.zoom - camera.min_zoom).abs() < f64::EPSILON);

        camera.zoom_at(Point::ZERO, 1000.0, viewport);
        assert!((camera.zoom - camera.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_fit_x_capped() {
        let viewport = Size::new(1200.0, 800.0);
        let mut camera = Camera::new();

        // Narrow bounds: fit would zoom in past 100%.
        camera.set_options(page_constraints(Rect::new(0.0, 0.0, 400.0, 2000.0)));
        camera.reset(viewport);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
        // Centred horizontally, top aligned under the padding.
        let top_left = camera.page_to_screen(Point::ZERO);
        assert!((top_left.x - 400.0).abs() < 1e-9);
        assert!((top_left.y - 64.0).abs() < 1e-9);

        // Wide bounds: zoom out until the width fits.
        camera.set_options(page_constraints(Rect::new(0.0, 0.0, 1744.0, 2000.0)));
        camera.reset(viewport);
        assert!((camera.zoom - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_contain_clamps_pan() {
        let viewport = Size::new(1200.0, 800.0);
        let mut camera = Camera::new();
        camera.set_options(page_constraints(Rect::new(0.0, 0.0, 400.0, 2000.0)));
        camera.reset(viewport);

        // Horizontal pan is pinned: the bounds are narrower than the viewport.
        camera.pan(Vec2::new(300.0, 0.0), viewport);
        assert!((camera.page_to_screen(Point::ZERO).x - 400.0).abs() < 1e-9);

        // Vertical pan past the top is clamped.
        camera.pan(Vec2::new(0.0, 500.0), viewport);
        assert!((camera.page_to_screen(Point::ZERO).y - 64.0).abs() < 1e-9);

        // Scrolling down within the bounds is allowed.
        camera.pan(Vec2::new(0.0, -500.0), viewport);
        assert!((camera.page_to_screen(Point::ZERO).y + 436.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_without_constraints() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(10.0, 10.0);
        camera.zoom = 3.0;
        camera.reset(Size::new(100.0, 100.0));
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - BASE_ZOOM).abs() < f64::EPSILON);
    }
}
