//! In-memory editor host.
//!
//! [`Canvas`] owns the document, the camera and the registered extensions and
//! implements [`Editor`] on top of them. Mutations are grouped into
//! operations; change notifications are queued while an operation runs and
//! delivered when the outermost one completes.

use crate::bindings::{Binding, BindingId, NewBinding};
use crate::camera::{Camera, CameraOptions};
use crate::config::PinboardConfig;
use crate::editor::{AfterShapeHandler, BeforeChangeHandler, Cursor, Editor, SideEffectId};
use crate::error::{EditorError, EditorResult};
use crate::handler::{BindingHandler, CanBindOptions, Registry, ToolHandler};
use crate::shapes::{Asset, AssetId, ParentId, Shape, ShapeId, ShapeUpdate};
use crate::tools::{PointerEvent, SELECT_TOOL, ScreenshotRequest};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use std::collections::{HashMap, HashSet, VecDeque};

/// Shapes, bindings and assets of one page.
#[derive(Debug, Clone, Default)]
pub struct CanvasDocument {
    pub shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    pub z_order: Vec<ShapeId>,
    /// Bindings in creation order.
    pub bindings: Vec<Binding>,
    pub assets: HashMap<AssetId, Asset>,
}

impl CanvasDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    /// Get shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// `ids` plus all of their descendants, parents before children.
    fn with_descendants(&self, ids: &[ShapeId]) -> Vec<ShapeId> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let mut stack: Vec<ShapeId> = ids.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !self.shapes.contains_key(&id) || !seen.insert(id) {
                continue;
            }
            result.push(id);
            for child in self.z_order.iter().rev() {
                if self
                    .shapes
                    .get(child)
                    .is_some_and(|shape| shape.parent == ParentId::Shape(id))
                {
                    stack.push(*child);
                }
            }
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeEvent {
    Created(ShapeId),
    Changed(ShapeId),
}

#[derive(Default)]
struct SideEffects {
    next_id: SideEffectId,
    before_change: Vec<(SideEffectId, BeforeChangeHandler)>,
    after_create: Vec<(SideEffectId, AfterShapeHandler)>,
    after_change: Vec<(SideEffectId, AfterShapeHandler)>,
}

impl SideEffects {
    fn next_id(&mut self) -> SideEffectId {
        self.next_id += 1;
        self.next_id
    }

    fn remove(&mut self, id: SideEffectId) {
        self.before_change.retain(|(handler_id, _)| *handler_id != id);
        self.after_create.retain(|(handler_id, _)| *handler_id != id);
        self.after_change.retain(|(handler_id, _)| *handler_id != id);
    }

    fn len(&self) -> usize {
        self.before_change.len() + self.after_create.len() + self.after_change.len()
    }
}

/// Runtime editor state.
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Camera for view transform.
    pub camera: Camera,
    /// Currently selected shape IDs.
    pub selection: Vec<ShapeId>,
    pub viewport_size: Size,
    config: PinboardConfig,
    registry: Registry,
    current_tool: String,
    cursor: Cursor,
    side_effects: SideEffects,
    pending: VecDeque<ShapeEvent>,
    depth: usize,
    completing: bool,
    /// Snapshots of shapes being translated, taken when the translation began.
    translating: HashMap<ShapeId, Shape>,
    screenshots: Vec<ScreenshotRequest>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(PinboardConfig::default())
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("document", &self.document)
            .field("camera", &self.camera)
            .field("selection", &self.selection)
            .field("current_tool", &self.current_tool)
            .field("registry", &self.registry)
            .field("side_effects", &self.side_effects.len())
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Create a canvas with every built-in extension registered.
    pub fn new(config: PinboardConfig) -> Self {
        let registry = Registry::with_defaults(&config);
        Self::with_registry(config, registry)
    }

    /// Create a canvas with a custom set of extensions.
    pub fn with_registry(config: PinboardConfig, registry: Registry) -> Self {
        Self {
            document: CanvasDocument::new(),
            camera: Camera::new(),
            selection: Vec::new(),
            viewport_size: Size::new(1280.0, 800.0),
            config,
            registry,
            current_tool: SELECT_TOOL.to_string(),
            cursor: Cursor::Default,
            side_effects: SideEffects::default(),
            pending: VecDeque::new(),
            depth: 0,
            completing: false,
            translating: HashMap::new(),
            screenshots: Vec::new(),
        }
    }

    pub fn config(&self) -> &PinboardConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Set the viewport size and re-apply camera constraints.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
        self.camera.constrain(self.viewport_size);
    }

    pub fn is_selected(&self, id: ShapeId) -> bool {
        self.selection.contains(&id)
    }

    pub fn current_tool(&self) -> &str {
        &self.current_tool
    }

    /// State path of the current tool, e.g. `screenshot.dragging`.
    pub fn path(&self) -> String {
        self.registry
            .tool(&self.current_tool)
            .map(|tool| tool.path())
            .unwrap_or_else(|| format!("{}.idle", self.current_tool))
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Page-space overlay rectangle of the current tool.
    pub fn tool_overlay(&self) -> Option<Rect> {
        self.registry.tool(&self.current_tool)?.overlay()
    }

    /// Drain the screenshot requests captured so far, oldest first.
    pub fn take_screenshot_requests(&mut self) -> Vec<ScreenshotRequest> {
        std::mem::take(&mut self.screenshots)
    }

    /// Screenshot requests captured so far, oldest first.
    pub fn screenshot_requests(&self) -> &[ScreenshotRequest] {
        &self.screenshots
    }

    /// Run `f` as one operation. Notifications raised inside are delivered
    /// after the outermost operation returns.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        if self.depth == 0 {
            self.complete_operation();
        }
        result
    }

    /// Resize a shape through its handler. Ignored for shapes that cannot resize.
    pub fn resize_shape(&mut self, id: ShapeId, size: Size) {
        let Some(shape) = self.document.get_shape(id) else {
            return;
        };
        let Some(handler) = self.registry.shape(shape.kind()) else {
            return;
        };
        if !handler.capabilities().resizable {
            log::debug!("Shape {} of type {} cannot be resized", id, shape.kind());
            return;
        }
        if let Some(props) = handler.on_resize(shape, size) {
            self.update_shapes(vec![ShapeUpdate::new(id).props(props)]);
        }
    }

    // Input

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.dispatch_tool(|tool, editor| tool.on_pointer_down(editor, &event));
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.dispatch_tool(|tool, editor| tool.on_pointer_move(editor, &event));
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.dispatch_tool(|tool, editor| tool.on_pointer_up(editor, &event));
    }

    pub fn double_click(&mut self, event: PointerEvent) {
        self.dispatch_tool(|tool, editor| tool.on_double_click(editor, &event));
    }

    /// Escape: cancel whatever the current tool is doing.
    pub fn cancel(&mut self) {
        self.dispatch_tool(|tool, editor| tool.on_cancel(editor));
    }

    /// Call into the current tool. A tool that switches away from itself gets
    /// its exit hook once its handler has returned.
    fn dispatch_tool(&mut self, f: impl FnOnce(&mut dyn ToolHandler, &mut dyn Editor)) {
        let id = self.current_tool.clone();
        let Some(mut tool) = self.registry.take_tool(&id) else {
            return;
        };
        self.batch(|canvas| {
            f(tool.as_mut(), canvas);
            if canvas.current_tool != id {
                tool.on_exit(canvas);
            }
        });
        self.registry.restore_tool(tool);
    }

    fn with_tool(&mut self, id: &str, f: impl FnOnce(&mut dyn ToolHandler, &mut dyn Editor)) {
        let Some(mut tool) = self.registry.take_tool(id) else {
            return;
        };
        f(tool.as_mut(), self);
        self.registry.restore_tool(tool);
    }

    fn with_binding_handler(
        &mut self,
        kind: &str,
        f: impl FnOnce(&mut dyn BindingHandler, &mut dyn Editor),
    ) {
        let Some(mut handler) = self.registry.take_binding(kind) else {
            log::debug!("Binding handler {kind} busy or missing, skipping callback");
            return;
        };
        f(handler.as_mut(), self);
        self.registry.restore_binding(handler);
    }

    // Operations

    /// Deliver queued notifications, then let binding handlers react to the
    /// completed operation. Handler writes are queued again and delivered in a
    /// further pass, up to `max_operation_passes`. Whatever is still queued
    /// after the last pass is delivered by the next operation.
    fn complete_operation(&mut self) {
        if self.completing {
            return;
        }
        self.completing = true;

        let mut passes = 0;
        loop {
            self.flush_events();
            passes += 1;
            for kind in self.registry.binding_kinds() {
                self.with_binding_handler(kind, |handler, editor| {
                    handler.on_operation_complete(editor)
                });
            }
            if self.pending.is_empty() {
                break;
            }
            if passes >= self.config.max_operation_passes {
                // Leftover notifications start the next operation.
                log::warn!(
                    "Operation did not settle after {} passes, deferring {} notification(s)",
                    passes,
                    self.pending.len()
                );
                break;
            }
        }

        self.completing = false;
    }

    fn flush_events(&mut self) {
        while let Some(event) = self.pending.pop_front() {
            match event {
                ShapeEvent::Created(id) => {
                    let handlers: Vec<_> = self
                        .side_effects
                        .after_create
                        .iter()
                        .map(|(_, handler)| handler.clone())
                        .collect();
                    for handler in handlers {
                        if let Some(shape) = self.document.get_shape(id).cloned() {
                            handler(self, &shape);
                        }
                    }
                }
                ShapeEvent::Changed(id) => {
                    let handlers: Vec<_> = self
                        .side_effects
                        .after_change
                        .iter()
                        .map(|(_, handler)| handler.clone())
                        .collect();
                    for handler in handlers {
                        if let Some(shape) = self.document.get_shape(id).cloned() {
                            handler(self, &shape);
                        }
                    }
                    self.notify_bindings_changed(id);
                }
            }
        }
    }

    /// A shape's page transform also moves its descendants, so bindings to
    /// any of them are told.
    fn notify_bindings_changed(&mut self, id: ShapeId) {
        let affected = self.document.with_descendants(&[id]);
        for kind in self.registry.binding_kinds() {
            for shape_id in &affected {
                for binding in self.bindings_to_shape(*shape_id, kind) {
                    self.with_binding_handler(kind, |handler, editor| {
                        handler.on_after_change_to_shape(editor, &binding)
                    });
                }
            }
        }
    }

    fn local_transform(shape: &Shape) -> Affine {
        Affine::translate(shape.position.to_vec2()) * Affine::rotate(shape.rotation)
    }

    fn parent_exists(&self, parent: ParentId) -> bool {
        match parent {
            ParentId::Page => true,
            ParentId::Shape(id) => self.document.shapes.contains_key(&id),
        }
    }
}

impl Editor for Canvas {
    fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.document.get_shape(id)
    }

    fn current_page_shape_ids(&self) -> Vec<ShapeId> {
        self.document.z_order.clone()
    }

    fn sorted_child_ids(&self, parent: ParentId) -> Vec<ShapeId> {
        self.document
            .shapes_ordered()
            .filter(|shape| shape.parent == parent)
            .map(|shape| shape.id)
            .collect()
    }

    fn z_index(&self, id: ShapeId) -> Option<usize> {
        self.document.z_order.iter().position(|&shape_id| shape_id == id)
    }

    fn create_shapes(&mut self, shapes: Vec<Shape>) -> EditorResult<()> {
        for (i, shape) in shapes.iter().enumerate() {
            if self.document.shapes.contains_key(&shape.id)
                || shapes[..i].iter().any(|other| other.id == shape.id)
            {
                return Err(EditorError::DuplicateShape(shape.id));
            }
            if let ParentId::Shape(parent) = shape.parent {
                let created_earlier = shapes[..i].iter().any(|other| other.id == parent);
                if !created_earlier && !self.parent_exists(shape.parent) {
                    return Err(EditorError::ShapeNotFound(parent));
                }
            }
        }

        self.batch(|canvas| {
            for shape in shapes {
                let id = shape.id;
                canvas.document.z_order.push(id);
                canvas.document.shapes.insert(id, shape);
                canvas.pending.push_back(ShapeEvent::Created(id));
            }
        });
        Ok(())
    }

    fn update_shapes(&mut self, updates: Vec<ShapeUpdate>) {
        self.batch(|canvas| {
            for update in updates {
                let Some(prev) = canvas.document.get_shape(update.id).cloned() else {
                    log::debug!("Ignoring update for missing shape {}", update.id);
                    continue;
                };
                let handlers: Vec<_> = canvas
                    .side_effects
                    .before_change
                    .iter()
                    .map(|(_, handler)| handler.clone())
                    .collect();
                let next = handlers
                    .iter()
                    .fold(update.apply(&prev), |next, handler| handler(&prev, next));
                if next == prev {
                    continue;
                }
                canvas.document.shapes.insert(prev.id, next);
                canvas.pending.push_back(ShapeEvent::Changed(prev.id));
            }
        });
    }

    fn delete_shapes(&mut self, ids: &[ShapeId]) {
        let ids = self.document.with_descendants(ids);
        if ids.is_empty() {
            return;
        }

        self.batch(|canvas| {
            for &id in &ids {
                if !canvas.document.shapes.contains_key(&id) {
                    continue;
                }
                for kind in canvas.registry.binding_kinds() {
                    for binding in canvas.bindings_to_shape(id, kind) {
                        let still_bound = canvas.document.bindings.iter().any(|b| b.id == binding.id);
                        if still_bound {
                            canvas.with_binding_handler(kind, |handler, editor| {
                                handler.on_before_delete_to_shape(editor, &binding)
                            });
                        }
                    }
                }
            }

            for &id in &ids {
                if canvas.document.shapes.remove(&id).is_none() {
                    continue;
                }
                canvas.document.z_order.retain(|&shape_id| shape_id != id);
                canvas.document.bindings.retain(|binding| !binding.touches(id));
                canvas.selection.retain(|&shape_id| shape_id != id);
                canvas.translating.remove(&id);
            }
        });
    }

    fn send_to_back(&mut self, ids: &[ShapeId]) {
        let (mut back, front): (Vec<_>, Vec<_>) = self
            .document
            .z_order
            .iter()
            .partition(|id| ids.contains(id));
        back.extend(front);
        self.document.z_order = back;
    }

    fn select(&mut self, ids: &[ShapeId]) {
        self.selection = ids
            .iter()
            .copied()
            .filter(|id| self.document.shapes.contains_key(id))
            .collect();
    }

    fn shape_geometry(&self, id: ShapeId) -> Option<Rect> {
        let shape = self.document.get_shape(id)?;
        Some(self.registry.shape(shape.kind())?.geometry(shape))
    }

    fn shape_page_transform(&self, id: ShapeId) -> Option<Affine> {
        let mut current = self.document.get_shape(id)?;
        let mut transform = Affine::IDENTITY;
        // Bounded walk so a corrupt parent cycle cannot hang.
        for _ in 0..=self.document.len() {
            transform = Self::local_transform(current) * transform;
            match current.parent {
                ParentId::Page => return Some(transform),
                ParentId::Shape(parent) => current = self.document.get_shape(parent)?,
            }
        }
        None
    }

    fn shapes_at_point(&self, point: Point) -> Vec<ShapeId> {
        self.document
            .z_order
            .iter()
            .rev()
            .copied()
            .filter(|&id| {
                match (self.shape_geometry(id), self.point_in_shape_space(id, point)) {
                    (Some(geometry), Some(local)) => geometry.contains(local),
                    _ => false,
                }
            })
            .collect()
    }

    fn bindings_to_shape(&self, id: ShapeId, kind: &str) -> Vec<Binding> {
        self.document
            .bindings
            .iter()
            .filter(|binding| binding.to_id == id && binding.kind() == kind)
            .cloned()
            .collect()
    }

    fn bindings_from_shape(&self, id: ShapeId, kind: &str) -> Vec<Binding> {
        self.document
            .bindings
            .iter()
            .filter(|binding| binding.from_id == id && binding.kind() == kind)
            .cloned()
            .collect()
    }

    fn can_bind_shapes(&self, from: ShapeId, to: ShapeId, kind: &str) -> bool {
        let (Some(from_shape), Some(to_shape)) =
            (self.document.get_shape(from), self.document.get_shape(to))
        else {
            return false;
        };
        let (Some(from_handler), Some(to_handler)) = (
            self.registry.shape(from_shape.kind()),
            self.registry.shape(to_shape.kind()),
        ) else {
            return false;
        };
        let opts = CanBindOptions {
            from_kind: from_shape.kind(),
            to_kind: to_shape.kind(),
            binding_kind: kind,
        };
        from_handler.can_bind(&opts) && to_handler.can_bind(&opts)
    }

    fn create_binding(&mut self, binding: NewBinding) -> EditorResult<BindingId> {
        for id in [binding.from_id, binding.to_id] {
            if !self.document.shapes.contains_key(&id) {
                return Err(EditorError::ShapeNotFound(id));
            }
        }
        if !self.can_bind_shapes(binding.from_id, binding.to_id, binding.kind()) {
            return Err(EditorError::CannotBind {
                from: binding.from_id,
                to: binding.to_id,
                kind: binding.kind(),
            });
        }
        let binding = binding.into_binding();
        let id = binding.id;
        self.document.bindings.push(binding);
        Ok(id)
    }

    fn delete_bindings(&mut self, ids: &[BindingId]) {
        self.document
            .bindings
            .retain(|binding| !ids.contains(&binding.id));
    }

    fn asset(&self, id: AssetId) -> Option<&Asset> {
        self.document.assets.get(&id)
    }

    fn create_assets(&mut self, assets: Vec<Asset>) {
        for asset in assets {
            self.document.assets.insert(asset.id, asset);
        }
    }

    fn delete_assets(&mut self, ids: &[AssetId]) {
        for id in ids {
            self.document.assets.remove(id);
        }
    }

    fn register_before_change_handler(&mut self, handler: BeforeChangeHandler) -> SideEffectId {
        let id = self.side_effects.next_id();
        self.side_effects.before_change.push((id, handler));
        id
    }

    fn register_after_create_handler(&mut self, handler: AfterShapeHandler) -> SideEffectId {
        let id = self.side_effects.next_id();
        self.side_effects.after_create.push((id, handler));
        id
    }

    fn register_after_change_handler(&mut self, handler: AfterShapeHandler) -> SideEffectId {
        let id = self.side_effects.next_id();
        self.side_effects.after_change.push((id, handler));
        id
    }

    fn unregister_side_effect(&mut self, id: SideEffectId) {
        self.side_effects.remove(id);
    }

    fn set_camera_options(&mut self, options: CameraOptions) {
        self.camera.set_options(options);
        self.camera.constrain(self.viewport_size);
    }

    fn reset_camera(&mut self) {
        self.camera.reset(self.viewport_size);
    }

    fn viewport_screen_bounds(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.viewport_size)
    }

    fn zoom_level(&self) -> f64 {
        self.camera.zoom
    }

    fn page_to_viewport(&self, point: Point) -> Point {
        self.camera.page_to_screen(point)
    }

    fn set_current_tool(&mut self, id: &str) {
        if self.current_tool == id {
            return;
        }
        let previous = std::mem::replace(&mut self.current_tool, id.to_string());
        log::debug!("Tool change: {previous} -> {id}");
        // A tool that is mid-dispatch is not in the registry; it gets its
        // exit hook from `dispatch_tool`.
        self.with_tool(&previous, |tool, editor| tool.on_exit(editor));
        self.cursor = Cursor::Default;
        self.with_tool(id, |tool, editor| tool.on_enter(editor));
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn begin_translating(&mut self, ids: &[ShapeId]) {
        self.batch(|canvas| {
            for &id in ids {
                let Some(shape) = canvas.document.get_shape(id).cloned() else {
                    continue;
                };
                canvas.translating.insert(id, shape.clone());
                if let Some(handler) = canvas.registry.shape(shape.kind()) {
                    handler.on_translate_start(canvas, &shape);
                }
            }
        });
    }

    fn translate_shapes(&mut self, ids: &[ShapeId], delta: Vec2) {
        let updates: Vec<_> = ids
            .iter()
            .filter_map(|&id| {
                let origin = self.shape_page_origin(id)?;
                let position = self.point_in_parent_space(id, origin + delta)?;
                Some(ShapeUpdate::new(id).position(position))
            })
            .collect();
        self.update_shapes(updates);
    }

    fn end_translating(&mut self, ids: &[ShapeId]) {
        self.batch(|canvas| {
            for &id in ids {
                let Some(initial) = canvas.translating.remove(&id) else {
                    continue;
                };
                let Some(shape) = canvas.document.get_shape(id).cloned() else {
                    continue;
                };
                if let Some(handler) = canvas.registry.shape(shape.kind()) {
                    handler.on_translate_end(canvas, &initial, &shape);
                }
            }
        });
    }

    fn capture_screenshot(&mut self, request: ScreenshotRequest) {
        log::info!(
            "Screenshot of {} shape(s) in {:?} ({})",
            request.shape_ids.len(),
            request.bounds,
            if request.copy_to_clipboard { "clipboard" } else { "download" }
        );
        self.screenshots.push(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{BindingProps, PinBindingProps};
    use crate::shapes::{FrameProps, GeoProps, PinProps, ShapeProps};
    use std::cell::Cell;
    use std::rc::Rc;

    fn geo(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::new(ShapeProps::Geo(GeoProps::new(w, h))).at(Point::new(x, y))
    }

    #[test]
    fn test_create_and_z_order() {
        let mut canvas = Canvas::default();
        let a = geo(0.0, 0.0, 10.0, 10.0);
        let b = geo(0.0, 0.0, 10.0, 10.0);
        let (a_id, b_id) = (a.id, b.id);
        canvas.create_shapes(vec![a, b]).unwrap();

        assert_eq!(canvas.document.len(), 2);
        assert_eq!(canvas.z_index(a_id), Some(0));
        assert_eq!(canvas.z_index(b_id), Some(1));
        assert_eq!(canvas.current_page_shape_ids(), vec![a_id, b_id]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut canvas = Canvas::default();
        let a = geo(0.0, 0.0, 10.0, 10.0);
        canvas.create_shapes(vec![a.clone()]).unwrap();
        assert!(matches!(
            canvas.create_shapes(vec![a.clone()]),
            Err(EditorError::DuplicateShape(id)) if id == a.id
        ));
        assert_eq!(canvas.document.len(), 1);
    }

    #[test]
    fn test_missing_parent_rejected() {
        let mut canvas = Canvas::default();
        let orphan = geo(0.0, 0.0, 10.0, 10.0).with_parent(ParentId::Shape(uuid::Uuid::new_v4()));
        assert!(matches!(
            canvas.create_shapes(vec![orphan]),
            Err(EditorError::ShapeNotFound(_))
        ));
    }

    #[test]
    fn test_send_to_back_keeps_relative_order() {
        let mut canvas = Canvas::default();
        let shapes: Vec<_> = (0..4).map(|_| geo(0.0, 0.0, 10.0, 10.0)).collect();
        let ids: Vec<_> = shapes.iter().map(|s| s.id).collect();
        canvas.create_shapes(shapes).unwrap();

        canvas.send_to_back(&[ids[3], ids[1]]);
        assert_eq!(canvas.current_page_shape_ids(), vec![ids[1], ids[3], ids[0], ids[2]]);
    }

    #[test]
    fn test_shapes_at_point_front_to_back() {
        let mut canvas = Canvas::default();
        let back = geo(0.0, 0.0, 100.0, 100.0);
        let front = geo(50.0, 50.0, 100.0, 100.0);
        let (back_id, front_id) = (back.id, front.id);
        canvas.create_shapes(vec![back, front]).unwrap();

        assert_eq!(canvas.shapes_at_point(Point::new(75.0, 75.0)), vec![front_id, back_id]);
        assert_eq!(canvas.shapes_at_point(Point::new(25.0, 25.0)), vec![back_id]);
        assert!(canvas.shapes_at_point(Point::new(500.0, 500.0)).is_empty());
    }

    #[test]
    fn test_page_transform_through_parent() {
        let mut canvas = Canvas::default();
        let frame = Shape::new(ShapeProps::Frame(FrameProps::new(200.0, 200.0)))
            .at(Point::new(100.0, 50.0));
        let child = geo(10.0, 20.0, 30.0, 30.0).with_parent(ParentId::Shape(frame.id));
        let (frame_id, child_id) = (frame.id, child.id);
        canvas.create_shapes(vec![frame, child]).unwrap();

        let origin = canvas.shape_page_origin(child_id).unwrap();
        assert!((origin.x - 110.0).abs() < 1e-10);
        assert!((origin.y - 70.0).abs() < 1e-10);

        let bounds = canvas.shape_page_bounds(child_id).unwrap();
        assert!((bounds.x1 - 140.0).abs() < 1e-10);

        let local = canvas.point_in_parent_space(child_id, Point::new(150.0, 150.0)).unwrap();
        assert!((local.x - 50.0).abs() < 1e-10);
        assert!((local.y - 100.0).abs() < 1e-10);

        assert_eq!(canvas.sorted_child_ids(ParentId::Shape(frame_id)), vec![child_id]);
    }

    #[test]
    fn test_rotated_page_transform() {
        let mut canvas = Canvas::default();
        let mut shape = geo(10.0, 0.0, 20.0, 10.0);
        shape.rotation = std::f64::consts::FRAC_PI_2;
        let id = shape.id;
        canvas.create_shapes(vec![shape]).unwrap();

        let transform = canvas.shape_page_transform(id).unwrap();
        let corner = transform * Point::new(20.0, 0.0);
        assert!((corner.x - 10.0).abs() < 1e-10);
        assert!((corner.y - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_delete_removes_descendants_and_bindings() {
        let mut canvas = Canvas::default();
        let frame = Shape::new(ShapeProps::Frame(FrameProps::new(200.0, 200.0)));
        let child = geo(0.0, 0.0, 30.0, 30.0).with_parent(ParentId::Shape(frame.id));
        let other = geo(0.0, 0.0, 30.0, 30.0);
        let pin = Shape::new(ShapeProps::Pin(PinProps::default()));
        let (frame_id, child_id, other_id, pin_id) = (frame.id, child.id, other.id, pin.id);
        canvas.create_shapes(vec![frame, child, other, pin]).unwrap();
        canvas
            .create_binding(NewBinding::new(
                pin_id,
                other_id,
                BindingProps::Pin(PinBindingProps::default()),
            ))
            .unwrap();
        canvas.select(&[child_id]);

        canvas.delete_shapes(&[frame_id]);
        assert!(canvas.shape(child_id).is_none());
        assert!(canvas.selection.is_empty());
        assert_eq!(canvas.document.bindings.len(), 1);

        // The pin goes with its only target.
        canvas.delete_shapes(&[other_id]);
        assert!(canvas.shape(pin_id).is_none());
        assert!(canvas.document.bindings.is_empty());
        assert!(canvas.document.is_empty());
    }

    #[test]
    fn test_create_binding_missing_shape() {
        let mut canvas = Canvas::default();
        let pin = Shape::new(ShapeProps::Pin(PinProps::default()));
        let pin_id = pin.id;
        canvas.create_shapes(vec![pin]).unwrap();
        let result = canvas.create_binding(NewBinding::new(
            pin_id,
            uuid::Uuid::new_v4(),
            BindingProps::Pin(PinBindingProps::default()),
        ));
        assert!(matches!(result, Err(EditorError::ShapeNotFound(_))));
    }

    #[test]
    fn test_noop_update_not_notified() {
        let mut canvas = Canvas::default();
        let shape = geo(5.0, 5.0, 10.0, 10.0);
        let id = shape.id;
        canvas.create_shapes(vec![shape]).unwrap();

        let changes = Rc::new(Cell::new(0));
        let counter = changes.clone();
        canvas.register_after_change_handler(Rc::new(move |_editor: &mut dyn Editor, _shape: &Shape| {
            counter.set(counter.get() + 1);
        }));

        canvas.update_shapes(vec![ShapeUpdate::new(id).position(Point::new(5.0, 5.0))]);
        assert_eq!(changes.get(), 0);
        canvas.update_shapes(vec![ShapeUpdate::new(id).position(Point::new(6.0, 5.0))]);
        assert_eq!(changes.get(), 1);
    }

    #[test]
    fn test_notifications_deferred_to_batch_end() {
        let mut canvas = Canvas::default();
        let shape = geo(0.0, 0.0, 10.0, 10.0);
        let id = shape.id;
        canvas.create_shapes(vec![shape]).unwrap();

        let changes = Rc::new(Cell::new(0));
        let counter = changes.clone();
        canvas.register_after_change_handler(Rc::new(move |_editor: &mut dyn Editor, _shape: &Shape| {
            counter.set(counter.get() + 1);
        }));

        canvas.batch(|canvas| {
            canvas.update_shapes(vec![ShapeUpdate::new(id).position(Point::new(1.0, 0.0))]);
            canvas.update_shapes(vec![ShapeUpdate::new(id).position(Point::new(2.0, 0.0))]);
            assert_eq!(changes.get(), 0);
        });
        assert_eq!(changes.get(), 2);
    }

    #[test]
    fn test_before_change_handler_rewrites() {
        let mut canvas = Canvas::default();
        let shape = geo(0.0, 0.0, 10.0, 10.0).locked(true);
        let id = shape.id;
        canvas.create_shapes(vec![shape]).unwrap();

        let handler_id = canvas.register_before_change_handler(Rc::new(|prev: &Shape, next: Shape| {
            if next.is_locked { next } else { Shape { is_locked: true, ..prev.clone() } }
        }));

        canvas.update_shapes(vec![ShapeUpdate::new(id).locked(false)]);
        assert!(canvas.shape(id).unwrap().is_locked);

        canvas.unregister_side_effect(handler_id);
        canvas.update_shapes(vec![ShapeUpdate::new(id).locked(false)]);
        assert!(!canvas.shape(id).unwrap().is_locked);
    }

    #[test]
    fn test_after_create_handler() {
        let mut canvas = Canvas::default();
        let created = Rc::new(Cell::new(0));
        let counter = created.clone();
        canvas.register_after_create_handler(Rc::new(move |_editor: &mut dyn Editor, _shape: &Shape| {
            counter.set(counter.get() + 1);
        }));
        canvas
            .create_shapes(vec![geo(0.0, 0.0, 1.0, 1.0), geo(0.0, 0.0, 1.0, 1.0)])
            .unwrap();
        assert_eq!(created.get(), 2);
    }

    struct Restless {
        target: ShapeId,
        calls: Rc<Cell<usize>>,
    }

    impl BindingHandler for Restless {
        fn kind(&self) -> &'static str {
            "restless"
        }

        fn default_props(&self) -> BindingProps {
            BindingProps::Pin(PinBindingProps::default())
        }

        fn on_operation_complete(&mut self, editor: &mut dyn Editor) {
            self.calls.set(self.calls.get() + 1);
            if let Some(shape) = editor.shape(self.target) {
                let next = shape.position + Vec2::new(1.0, 0.0);
                editor.update_shapes(vec![ShapeUpdate::new(self.target).position(next)]);
            }
        }
    }

    #[test]
    fn test_operation_passes_capped() {
        let mut canvas = Canvas::default();
        let shape = geo(0.0, 0.0, 10.0, 10.0);
        let id = shape.id;
        canvas.create_shapes(vec![shape]).unwrap();

        let calls = Rc::new(Cell::new(0));
        canvas.registry_mut().register_binding(Box::new(Restless {
            target: id,
            calls: calls.clone(),
        }));
        let changes = Rc::new(Cell::new(0));
        let counter = changes.clone();
        canvas.register_after_change_handler(Rc::new(move |_: &mut dyn Editor, _: &Shape| {
            counter.set(counter.get() + 1);
        }));
        canvas.update_shapes(vec![ShapeUpdate::new(id).position(Point::new(1.0, 0.0))]);

        let cap = canvas.config().max_operation_passes;
        assert_eq!(calls.get(), cap);
        assert_eq!(changes.get(), cap);
        assert_eq!(canvas.pending.len(), 1);

        // The deferred change is delivered with the next operation.
        assert!(canvas.registry_mut().take_binding("restless").is_some());
        let other = geo(50.0, 0.0, 10.0, 10.0);
        let other_id = other.id;
        canvas.create_shapes(vec![other]).unwrap();
        canvas.update_shapes(vec![ShapeUpdate::new(other_id).position(Point::new(60.0, 0.0))]);
        assert_eq!(changes.get(), cap + 2);
        assert!(canvas.pending.is_empty());
    }

    #[test]
    fn test_resize_respects_capabilities() {
        let mut canvas = Canvas::default();
        let card = Shape::new(ShapeProps::Card(Default::default()));
        let pin = Shape::new(ShapeProps::Pin(PinProps::default()));
        let (card_id, pin_id) = (card.id, pin.id);
        canvas.create_shapes(vec![card, pin]).unwrap();

        canvas.resize_shape(card_id, Size::new(120.0, 80.0));
        let bounds = canvas.shape_geometry(card_id).unwrap();
        assert!((bounds.width() - 120.0).abs() < f64::EPSILON);

        canvas.resize_shape(pin_id, Size::new(120.0, 80.0));
        let bounds = canvas.shape_geometry(pin_id).unwrap();
        assert!((bounds.width() - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_translate_in_page_space() {
        let mut canvas = Canvas::default();
        let frame = Shape::new(ShapeProps::Frame(FrameProps::new(200.0, 200.0)))
            .at(Point::new(100.0, 100.0));
        let child = geo(10.0, 10.0, 30.0, 30.0).with_parent(ParentId::Shape(frame.id));
        let child_id = child.id;
        canvas.create_shapes(vec![frame, child]).unwrap();

        canvas.translate_shapes(&[child_id], Vec2::new(5.0, -5.0));
        let position = canvas.shape(child_id).unwrap().position;
        assert!((position.x - 15.0).abs() < 1e-10);
        assert!((position.y - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_unknown_tool_is_inert() {
        let mut canvas = Canvas::default();
        canvas.set_current_tool("laser");
        canvas.pointer_down(PointerEvent::new(Point::ZERO));
        assert_eq!(canvas.current_tool(), "laser");
        assert_eq!(canvas.path(), "laser.idle");
        assert!(canvas.document.is_empty());
    }
}
