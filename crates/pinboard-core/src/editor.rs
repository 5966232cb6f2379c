//! Host editor interface.
//!
//! Everything in this crate talks to the document through [`Editor`]. The
//! host owns shapes, bindings, assets, camera and input; extensions only read
//! through the query methods and write through the mutation methods. The
//! in-memory [`Canvas`](crate::canvas::Canvas) is the reference host.

use crate::bindings::{Binding, BindingId, NewBinding};
use crate::camera::CameraOptions;
use crate::error::EditorResult;
use crate::shapes::{Asset, AssetId, ParentId, Shape, ShapeId, ShapeUpdate};
use crate::tools::ScreenshotRequest;
use kurbo::{Affine, Point, Rect, Vec2};
use std::rc::Rc;

/// Handle returned when registering a side effect.
pub type SideEffectId = u64;

/// Runs before a shape record changes. Receives the previous record and the
/// proposed one and returns the record to store.
pub type BeforeChangeHandler = Rc<dyn Fn(&Shape, Shape) -> Shape>;

/// Runs after a shape is created or changed, at the next operation boundary.
pub type AfterShapeHandler = Rc<dyn Fn(&mut dyn Editor, &Shape)>;

/// Mouse cursor requested by a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Cross,
}

/// The host editor as seen by shape, tool and binding handlers.
pub trait Editor {
    // Shapes

    /// Get a shape by ID.
    fn shape(&self, id: ShapeId) -> Option<&Shape>;

    /// All shapes on the current page, back to front.
    fn current_page_shape_ids(&self) -> Vec<ShapeId>;

    /// Direct children of `parent`, back to front.
    fn sorted_child_ids(&self, parent: ParentId) -> Vec<ShapeId>;

    /// Position of a shape in the z-order (0 = bottom).
    fn z_index(&self, id: ShapeId) -> Option<usize>;

    /// Create shapes on top of the z-order.
    fn create_shapes(&mut self, shapes: Vec<Shape>) -> EditorResult<()>;

    /// Apply partial updates. Updates for missing shapes are ignored.
    fn update_shapes(&mut self, updates: Vec<ShapeUpdate>);

    /// Delete shapes, their descendants and every binding touching them.
    fn delete_shapes(&mut self, ids: &[ShapeId]);

    /// Move shapes to the bottom of the z-order, keeping their relative order.
    fn send_to_back(&mut self, ids: &[ShapeId]);

    /// Replace the selection.
    fn select(&mut self, ids: &[ShapeId]);

    // Geometry

    /// Geometry bounds in the shape's own coordinate space.
    fn shape_geometry(&self, id: ShapeId) -> Option<Rect>;

    /// Transform from shape space to page space.
    fn shape_page_transform(&self, id: ShapeId) -> Option<Affine>;

    /// Shapes whose geometry contains `point` (page space), front to back.
    fn shapes_at_point(&self, point: Point) -> Vec<ShapeId>;

    /// Page-space bounding box of a shape.
    fn shape_page_bounds(&self, id: ShapeId) -> Option<Rect> {
        let geometry = self.shape_geometry(id)?;
        Some(self.shape_page_transform(id)?.transform_rect_bbox(geometry))
    }

    /// Page-space position of a shape's origin.
    fn shape_page_origin(&self, id: ShapeId) -> Option<Point> {
        Some(self.shape_page_transform(id)? * Point::ZERO)
    }

    /// Convert a page point into a shape's own space.
    fn point_in_shape_space(&self, id: ShapeId, point: Point) -> Option<Point> {
        Some(self.shape_page_transform(id)?.inverse() * point)
    }

    /// Convert a page point into the space of a shape's parent.
    fn point_in_parent_space(&self, id: ShapeId, point: Point) -> Option<Point> {
        match self.shape(id)?.parent {
            ParentId::Page => Some(point),
            ParentId::Shape(parent) => self.point_in_shape_space(parent, point),
        }
    }

    // Bindings

    /// Bindings of `kind` whose target is `id`.
    fn bindings_to_shape(&self, id: ShapeId, kind: &str) -> Vec<Binding>;

    /// Bindings of `kind` whose source is `id`.
    fn bindings_from_shape(&self, id: ShapeId, kind: &str) -> Vec<Binding>;

    /// Whether both shape handlers accept a binding of `kind` between the shapes.
    fn can_bind_shapes(&self, from: ShapeId, to: ShapeId, kind: &str) -> bool;

    /// Create a binding. Fails when [`Editor::can_bind_shapes`] refuses it.
    fn create_binding(&mut self, binding: NewBinding) -> EditorResult<BindingId>;

    fn delete_bindings(&mut self, ids: &[BindingId]);

    // Assets

    fn asset(&self, id: AssetId) -> Option<&Asset>;

    fn create_assets(&mut self, assets: Vec<Asset>);

    fn delete_assets(&mut self, ids: &[AssetId]);

    // Side effects

    fn register_before_change_handler(&mut self, handler: BeforeChangeHandler) -> SideEffectId;

    fn register_after_create_handler(&mut self, handler: AfterShapeHandler) -> SideEffectId;

    fn register_after_change_handler(&mut self, handler: AfterShapeHandler) -> SideEffectId;

    fn unregister_side_effect(&mut self, id: SideEffectId);

    // Camera and viewport

    fn set_camera_options(&mut self, options: CameraOptions);

    /// Re-apply the camera constraints from scratch.
    fn reset_camera(&mut self);

    /// Viewport rectangle in screen pixels.
    fn viewport_screen_bounds(&self) -> Rect;

    fn zoom_level(&self) -> f64;

    /// Convert a page point to viewport (screen) coordinates.
    fn page_to_viewport(&self, point: Point) -> Point;

    // Tools and interaction

    fn set_current_tool(&mut self, id: &str);

    fn set_cursor(&mut self, cursor: Cursor);

    /// Start a translation of `ids`; shape handlers get their start hook.
    fn begin_translating(&mut self, ids: &[ShapeId]);

    /// Move shapes by a page-space delta.
    fn translate_shapes(&mut self, ids: &[ShapeId], delta: Vec2);

    /// Finish a translation; shape handlers get their end hook.
    fn end_translating(&mut self, ids: &[ShapeId]);

    /// Hand a screenshot region to the host's image export.
    fn capture_screenshot(&mut self, request: ScreenshotRequest);
}
