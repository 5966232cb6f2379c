//! Pin marker shape and its attach/detach lifecycle.
//!
//! A pin's origin is its anchor point. Dragging a pin detaches it from
//! everything; dropping it binds it to every eligible shape underneath.

use super::{Shape, ShapeId, ShapeProps};
use crate::bindings::{BindingProps, NewBinding, PIN_BINDING, PinBindingProps};
use crate::editor::Editor;
use crate::handler::{CanBindOptions, ShapeCapabilities, ShapeHandler};
use crate::math::{anchor_in_rect, zero_fix};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Type tag for pins.
pub const PIN: &str = "pin";

/// Horizontal offset of the marker box from the anchor point.
pub const PIN_OFFSET_X: f64 = -16.0;
/// Vertical offset of the marker box from the anchor point.
pub const PIN_OFFSET_Y: f64 = -26.0;
/// Side length of the marker box.
pub const PIN_SIZE: f64 = 32.0;

/// Pins carry no properties; relationships live in bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PinProps {}

/// Handler for [`PIN`] shapes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PinShapeHandler;

impl PinShapeHandler {
    /// Shapes under `pin` that it may bind to: hit at the anchor point, bind
    /// eligible, same parent, lower in the z-order and not a locked image.
    fn binding_targets(editor: &dyn Editor, pin: &Shape, page_anchor: Point) -> Vec<ShapeId> {
        let Some(pin_index) = editor.z_index(pin.id) else {
            return Vec::new();
        };
        editor
            .shapes_at_point(page_anchor)
            .into_iter()
            .filter(|&id| id != pin.id)
            .filter(|&id| {
                let Some(target) = editor.shape(id) else {
                    return false;
                };
                // Locked PDF pages must never be moved by the solver.
                if target.is_image() && target.is_locked {
                    return false;
                }
                editor.can_bind_shapes(pin.id, id, PIN_BINDING)
                    && target.parent == pin.parent
                    && editor.z_index(id).is_some_and(|index| index < pin_index)
            })
            .collect()
    }
}

impl ShapeHandler for PinShapeHandler {
    fn kind(&self) -> &'static str {
        PIN
    }

    fn default_props(&self) -> ShapeProps {
        ShapeProps::Pin(PinProps::default())
    }

    fn capabilities(&self) -> ShapeCapabilities {
        ShapeCapabilities {
            resizable: false,
            aspect_ratio_locked: true,
            editable: false,
            hide_rotate_handle: true,
        }
    }

    fn geometry(&self, _shape: &Shape) -> Rect {
        Rect::new(
            PIN_OFFSET_X,
            PIN_OFFSET_Y,
            PIN_OFFSET_X + PIN_SIZE,
            PIN_OFFSET_Y + PIN_SIZE,
        )
    }

    fn can_bind(&self, opts: &CanBindOptions<'_>) -> bool {
        if opts.binding_kind == PIN_BINDING {
            return opts.to_kind != PIN;
        }
        true
    }

    fn on_translate_start(&self, editor: &mut dyn Editor, shape: &Shape) {
        let ids: Vec<_> = editor
            .bindings_from_shape(shape.id, PIN_BINDING)
            .iter()
            .map(|binding| binding.id)
            .collect();
        if !ids.is_empty() {
            log::debug!("Detaching pin {} from {} shape(s)", shape.id, ids.len());
            editor.delete_bindings(&ids);
        }
    }

    fn on_translate_end(&self, editor: &mut dyn Editor, _initial: &Shape, shape: &Shape) {
        let Some(page_anchor) = editor.shape_page_origin(shape.id) else {
            return;
        };

        for target in Self::binding_targets(editor, shape, page_anchor) {
            let Some(geometry) = editor.shape_geometry(target) else {
                continue;
            };
            let Some(point) = editor.point_in_shape_space(target, page_anchor) else {
                continue;
            };
            let anchor = anchor_in_rect(zero_fix(geometry), point);
            let binding = NewBinding::new(
                shape.id,
                target,
                BindingProps::Pin(PinBindingProps { anchor }),
            );
            if let Err(err) = editor.create_binding(binding) {
                log::warn!("Failed to pin {} to {}: {}", shape.id, target, err);
            }
        }
    }
}
