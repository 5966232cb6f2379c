//! Extension points registered into the host.
//!
//! Each extension kind has a fixed method set: [`ShapeHandler`] for shape
//! types, [`ToolHandler`] for interactive tools and [`BindingHandler`] for
//! binding types. The [`Registry`] keys them by type tag.

use crate::bindings::{Binding, BindingProps, PinBindingHandler};
use crate::config::PinboardConfig;
use crate::editor::Editor;
use crate::shapes::{
    CardShapeHandler, FrameShapeHandler, GeoShapeHandler, ImageShapeHandler, PinShapeHandler,
    Shape, ShapeProps,
};
use crate::tools::{CardTool, PinTool, PointerEvent, ScreenshotTool, ToolDescriptor};
use kurbo::{BezPath, Rect, Shape as KurboShape, Size};
use std::collections::HashMap;
use std::rc::Rc;

/// Capability flags the host reads from a shape type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeCapabilities {
    pub resizable: bool,
    pub aspect_ratio_locked: bool,
    pub editable: bool,
    pub hide_rotate_handle: bool,
}

impl Default for ShapeCapabilities {
    fn default() -> Self {
        Self {
            resizable: true,
            aspect_ratio_locked: false,
            editable: false,
            hide_rotate_handle: false,
        }
    }
}

/// Arguments to [`ShapeHandler::can_bind`].
#[derive(Debug, Clone, Copy)]
pub struct CanBindOptions<'a> {
    pub from_kind: &'a str,
    pub to_kind: &'a str,
    pub binding_kind: &'a str,
}

/// Behavior of one shape type.
pub trait ShapeHandler {
    /// Type tag this handler is registered under.
    fn kind(&self) -> &'static str;

    /// Props used when a shape of this type is created without explicit props.
    fn default_props(&self) -> ShapeProps;

    fn capabilities(&self) -> ShapeCapabilities {
        ShapeCapabilities::default()
    }

    /// Geometry bounds in shape space.
    fn geometry(&self, shape: &Shape) -> Rect;

    /// Outline drawn when the shape is hovered or selected.
    fn indicator(&self, shape: &Shape) -> BezPath {
        self.geometry(shape).to_path(0.1)
    }

    /// Whether this shape accepts taking part in a binding. Asked of both ends.
    fn can_bind(&self, _opts: &CanBindOptions<'_>) -> bool {
        true
    }

    /// New props after a resize to `size`, or `None` if the shape cannot resize.
    fn on_resize(&self, _shape: &Shape, _size: Size) -> Option<ShapeProps> {
        None
    }

    fn on_translate_start(&self, _editor: &mut dyn Editor, _shape: &Shape) {}

    fn on_translate_end(&self, _editor: &mut dyn Editor, _initial: &Shape, _shape: &Shape) {}
}

/// An interactive tool driven by pointer events.
pub trait ToolHandler {
    /// Toolbar metadata; `id` is the registry key.
    fn descriptor(&self) -> ToolDescriptor;

    /// Current state-machine path, e.g. `screenshot.dragging`.
    fn path(&self) -> String;

    fn on_enter(&mut self, _editor: &mut dyn Editor) {}

    fn on_exit(&mut self, _editor: &mut dyn Editor) {}

    fn on_pointer_down(&mut self, _editor: &mut dyn Editor, _event: &PointerEvent) {}

    fn on_pointer_move(&mut self, _editor: &mut dyn Editor, _event: &PointerEvent) {}

    fn on_pointer_up(&mut self, _editor: &mut dyn Editor, _event: &PointerEvent) {}

    fn on_double_click(&mut self, _editor: &mut dyn Editor, _event: &PointerEvent) {}

    fn on_cancel(&mut self, _editor: &mut dyn Editor) {}

    /// Page-space rectangle to draw in front of the canvas, if any.
    fn overlay(&self) -> Option<Rect> {
        None
    }
}

/// Behavior of one binding type.
pub trait BindingHandler {
    fn kind(&self) -> &'static str;

    fn default_props(&self) -> BindingProps;

    /// The target of `binding` (or one of its ancestors) changed.
    fn on_after_change_to_shape(&mut self, _editor: &mut dyn Editor, _binding: &Binding) {}

    /// The target of `binding` is about to be deleted.
    fn on_before_delete_to_shape(&mut self, _editor: &mut dyn Editor, _binding: &Binding) {}

    /// A host operation finished and all queued notifications were delivered.
    fn on_operation_complete(&mut self, _editor: &mut dyn Editor) {}
}

/// Lookup tables of registered extensions.
///
/// Tool and binding handlers are stateful; the host takes them out while
/// calling into them and puts them back afterwards, so a handler can never be
/// re-entered while it is running.
#[derive(Default)]
pub struct Registry {
    shapes: HashMap<&'static str, Rc<dyn ShapeHandler>>,
    tools: HashMap<&'static str, Box<dyn ToolHandler>>,
    tool_order: Vec<&'static str>,
    bindings: HashMap<&'static str, Box<dyn BindingHandler>>,
    binding_order: Vec<&'static str>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in shape, tool and binding type.
    pub fn with_defaults(config: &PinboardConfig) -> Self {
        let mut registry = Self::new();
        registry.register_shape(Rc::new(GeoShapeHandler));
        registry.register_shape(Rc::new(FrameShapeHandler));
        registry.register_shape(Rc::new(ImageShapeHandler));
        registry.register_shape(Rc::new(CardShapeHandler));
        registry.register_shape(Rc::new(PinShapeHandler));
        registry.register_tool(Box::new(CardTool::new()));
        registry.register_tool(Box::new(PinTool::new()));
        registry.register_tool(Box::new(ScreenshotTool::new()));
        registry.register_binding(Box::new(PinBindingHandler::new(config.relaxation.clone())));
        registry
    }

    pub fn register_shape(&mut self, handler: Rc<dyn ShapeHandler>) {
        self.shapes.insert(handler.kind(), handler);
    }

    pub fn register_tool(&mut self, handler: Box<dyn ToolHandler>) {
        let id = handler.descriptor().id;
        if !self.tool_order.contains(&id) {
            self.tool_order.push(id);
        }
        self.tools.insert(id, handler);
    }

    pub fn register_binding(&mut self, handler: Box<dyn BindingHandler>) {
        let kind = handler.kind();
        if !self.binding_order.contains(&kind) {
            self.binding_order.push(kind);
        }
        self.bindings.insert(kind, handler);
    }

    /// Shape handler for a type tag.
    pub fn shape(&self, kind: &str) -> Option<Rc<dyn ShapeHandler>> {
        self.shapes.get(kind).cloned()
    }

    pub fn tool(&self, id: &str) -> Option<&dyn ToolHandler> {
        self.tools.get(id).map(|tool| tool.as_ref())
    }

    /// Registered tool IDs in registration order.
    pub fn tool_ids(&self) -> &[&'static str] {
        &self.tool_order
    }

    /// Toolbar metadata for every registered tool, in registration order.
    pub fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.tool_order
            .iter()
            .filter_map(|id| self.tools.get(id))
            .map(|tool| tool.descriptor())
            .collect()
    }

    /// Registered binding kinds in registration order.
    pub fn binding_kinds(&self) -> Vec<&'static str> {
        self.binding_order.clone()
    }

    pub fn has_binding(&self, kind: &str) -> bool {
        self.binding_order.iter().any(|k| *k == kind)
    }

    pub(crate) fn take_tool(&mut self, id: &str) -> Option<Box<dyn ToolHandler>> {
        self.tools.remove(id)
    }

    pub(crate) fn restore_tool(&mut self, handler: Box<dyn ToolHandler>) {
        self.tools.insert(handler.descriptor().id, handler);
    }

    pub(crate) fn take_binding(&mut self, kind: &str) -> Option<Box<dyn BindingHandler>> {
        self.bindings.remove(kind)
    }

    pub(crate) fn restore_binding(&mut self, handler: Box<dyn BindingHandler>) {
        self.bindings.insert(handler.kind(), handler);
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut shapes: Vec<_> = self.shapes.keys().collect();
        shapes.sort();
        f.debug_struct("Registry")
            .field("shapes", &shapes)
            .field("tools", &self.tool_order)
            .field("bindings", &self.binding_order)
            .finish()
    }
}
