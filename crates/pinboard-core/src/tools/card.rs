//! Box tool that creates size-button cards.

use super::{PointerEvent, SELECT_TOOL, ToolDescriptor, is_drag};
use crate::editor::{Cursor, Editor};
use crate::handler::ToolHandler;
use crate::shapes::{CardProps, SIZE_BUTTON, Shape, ShapeId, ShapeProps, ShapeUpdate};
use kurbo::{Point, Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
enum CardToolState {
    Idle,
    Pointing { origin: Point },
    Resizing { origin: Point, shape: ShapeId },
}

/// Click to drop a default-size card centred on the pointer, or drag to
/// draw one. Returns to the select tool once the card exists.
#[derive(Debug, Clone)]
pub struct CardTool {
    state: CardToolState,
}

impl Default for CardTool {
    fn default() -> Self {
        Self::new()
    }
}

impl CardTool {
    pub fn new() -> Self {
        Self {
            state: CardToolState::Idle,
        }
    }

    fn create(editor: &mut dyn Editor, position: Point, props: CardProps) -> Option<ShapeId> {
        let shape = Shape::new(ShapeProps::Card(props)).at(position);
        let id = shape.id;
        match editor.create_shapes(vec![shape]) {
            Ok(()) => Some(id),
            Err(err) => {
                log::warn!("Failed to create card: {err}");
                None
            }
        }
    }

    fn resize_to(editor: &mut dyn Editor, shape: ShapeId, origin: Point, point: Point) {
        let Some(ShapeProps::Card(props)) = editor.shape(shape).map(|s| s.props.clone()) else {
            return;
        };
        let rect = Rect::from_points(origin, point);
        let props = CardProps {
            w: rect.width().max(1.0),
            h: rect.height().max(1.0),
            ..props
        };
        editor.update_shapes(vec![
            ShapeUpdate::new(shape)
                .position(rect.origin())
                .props(ShapeProps::Card(props)),
        ]);
    }

    fn finish(&mut self, editor: &mut dyn Editor, shape: ShapeId) {
        editor.select(&[shape]);
        self.state = CardToolState::Idle;
        editor.set_current_tool(SELECT_TOOL);
    }
}

impl ToolHandler for CardTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            id: SIZE_BUTTON,
            label: "Size Button",
            icon: "group",
            kbd: "1",
        }
    }

    fn path(&self) -> String {
        let state = match self.state {
            CardToolState::Idle => "idle",
            CardToolState::Pointing { .. } => "pointing",
            CardToolState::Resizing { .. } => "resizing",
        };
        format!("{SIZE_BUTTON}.{state}")
    }

    fn on_enter(&mut self, editor: &mut dyn Editor) {
        self.state = CardToolState::Idle;
        editor.set_cursor(Cursor::Cross);
    }

    fn on_exit(&mut self, _editor: &mut dyn Editor) {
        self.state = CardToolState::Idle;
    }

    fn on_pointer_down(&mut self, _editor: &mut dyn Editor, event: &PointerEvent) {
        self.state = CardToolState::Pointing {
            origin: event.point,
        };
    }

    fn on_pointer_move(&mut self, editor: &mut dyn Editor, event: &PointerEvent) {
        match self.state {
            CardToolState::Pointing { origin } => {
                if !is_drag(origin, event.point, editor.zoom_level()) {
                    return;
                }
                let props = CardProps {
                    w: 1.0,
                    h: 1.0,
                    ..CardProps::default()
                };
                if let Some(shape) = Self::create(editor, origin, props) {
                    self.state = CardToolState::Resizing { origin, shape };
                    Self::resize_to(editor, shape, origin, event.point);
                }
            }
            CardToolState::Resizing { origin, shape } => {
                Self::resize_to(editor, shape, origin, event.point);
            }
            CardToolState::Idle => {}
        }
    }

    fn on_pointer_up(&mut self, editor: &mut dyn Editor, event: &PointerEvent) {
        match self.state {
            CardToolState::Pointing { .. } => {
                let props = CardProps::default();
                let position = event.point - Vec2::new(props.w / 2.0, props.h / 2.0);
                match Self::create(editor, position, props) {
                    Some(shape) => self.finish(editor, shape),
                    None => self.state = CardToolState::Idle,
                }
            }
            CardToolState::Resizing { shape, .. } => self.finish(editor, shape),
            CardToolState::Idle => {}
        }
    }

    // Double clicks are left to the host.
    fn on_double_click(&mut self, _editor: &mut dyn Editor, _event: &PointerEvent) {}

    fn on_cancel(&mut self, editor: &mut dyn Editor) {
        if let CardToolState::Resizing { shape, .. } = self.state {
            editor.delete_shapes(&[shape]);
        }
        self.state = CardToolState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;

    fn card_props(canvas: &Canvas, id: ShapeId) -> CardProps {
        match &canvas.shape(id).unwrap().props {
            ShapeProps::Card(props) => props.clone(),
            other => panic!("expected card, got {other:?}"),
        }
    }

    #[test]
    fn test_click_creates_centred_default_card() {
        let mut canvas = Canvas::default();
        canvas.set_current_tool(SIZE_BUTTON);
        assert_eq!(canvas.cursor(), Cursor::Cross);

        canvas.pointer_down(PointerEvent::new(Point::new(400.0, 300.0)));
        canvas.pointer_up(PointerEvent::new(Point::new(400.0, 300.0)));

        assert_eq!(canvas.document.len(), 1);
        let id = canvas.selection[0];
        let shape = canvas.shape(id).unwrap();
        assert_eq!(shape.position, Point::new(250.0, 200.0));
        let props = card_props(&canvas, id);
        assert!((props.w - 300.0).abs() < f64::EPSILON);
        assert!((props.h - 200.0).abs() < f64::EPSILON);
        assert_eq!(canvas.current_tool(), SELECT_TOOL);
    }

    #[test]
    fn test_drag_creates_spanning_card() {
        let mut canvas = Canvas::default();
        canvas.set_current_tool(SIZE_BUTTON);

        canvas.pointer_down(PointerEvent::new(Point::new(100.0, 100.0)));
        canvas.pointer_move(PointerEvent::new(Point::new(150.0, 120.0)));
        assert_eq!(canvas.path(), "size-button.resizing");
        canvas.pointer_move(PointerEvent::new(Point::new(60.0, 180.0)));
        canvas.pointer_up(PointerEvent::new(Point::new(60.0, 180.0)));

        let id = canvas.selection[0];
        assert_eq!(canvas.shape(id).unwrap().position, Point::new(60.0, 100.0));
        let props = card_props(&canvas, id);
        assert!((props.w - 40.0).abs() < f64::EPSILON);
        assert!((props.h - 80.0).abs() < f64::EPSILON);
        assert_eq!(canvas.current_tool(), SELECT_TOOL);
    }

    #[test]
    fn test_small_jitter_is_a_click() {
        let mut canvas = Canvas::default();
        canvas.set_current_tool(SIZE_BUTTON);
        canvas.pointer_down(PointerEvent::new(Point::new(0.0, 0.0)));
        canvas.pointer_move(PointerEvent::new(Point::new(1.0, 1.0)));
        assert_eq!(canvas.path(), "size-button.pointing");
        canvas.pointer_up(PointerEvent::new(Point::new(1.0, 1.0)));
        let props = card_props(&canvas, canvas.selection[0]);
        assert!((props.w - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cancel_while_resizing_removes_card() {
        let mut canvas = Canvas::default();
        canvas.set_current_tool(SIZE_BUTTON);
        canvas.pointer_down(PointerEvent::new(Point::new(0.0, 0.0)));
        canvas.pointer_move(PointerEvent::new(Point::new(50.0, 50.0)));
        assert_eq!(canvas.document.len(), 1);

        canvas.cancel();
        assert!(canvas.document.is_empty());
        assert_eq!(canvas.path(), "size-button.idle");
    }
}
