//! Drag-rectangle screenshot tool.

use super::{Modifiers, PointerEvent, SELECT_TOOL, ScreenshotRequest, ToolDescriptor, is_drag};
use crate::editor::{Cursor, Editor};
use crate::handler::ToolHandler;
use crate::math::collides;
use kurbo::{Point, Rect, Vec2};

const SCREENSHOT: &str = "screenshot";

#[derive(Debug, Clone, Copy, PartialEq)]
enum ScreenshotState {
    Idle,
    Pointing {
        origin: Point,
    },
    Dragging {
        origin: Point,
        current: Point,
        modifiers: Modifiers,
    },
}

/// Drag a box over the canvas to export the shapes it touches.
///
/// Shift squares the box, alt centres it on the press point. Releasing with
/// ctrl held copies to the clipboard instead of downloading.
#[derive(Debug, Clone)]
pub struct ScreenshotTool {
    state: ScreenshotState,
}

impl Default for ScreenshotTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenshotTool {
    pub fn new() -> Self {
        Self {
            state: ScreenshotState::Idle,
        }
    }

    /// The page-space box while dragging.
    pub fn screenshot_box(&self) -> Option<Rect> {
        match self.state {
            ScreenshotState::Dragging {
                origin,
                current,
                modifiers,
            } => Some(drag_box(origin, current, modifiers)),
            _ => None,
        }
    }

    fn complete(&mut self, editor: &mut dyn Editor, bounds: Rect, copy_to_clipboard: bool) {
        let shape_ids: Vec<_> = editor
            .current_page_shape_ids()
            .into_iter()
            .filter(|&id| {
                editor
                    .shape_page_bounds(id)
                    .is_some_and(|page_bounds| collides(bounds, page_bounds))
            })
            .collect();

        if !shape_ids.is_empty() {
            editor.capture_screenshot(ScreenshotRequest {
                shape_ids,
                bounds,
                copy_to_clipboard,
            });
        }
        self.state = ScreenshotState::Idle;
        editor.set_current_tool(SELECT_TOOL);
    }
}

fn drag_box(origin: Point, current: Point, modifiers: Modifiers) -> Rect {
    let mut delta = current - origin;
    if modifiers.shift {
        let side = delta.x.abs().max(delta.y.abs());
        delta = Vec2::new(side * delta.x.signum(), side * delta.y.signum());
    }
    if modifiers.alt {
        Rect::from_points(origin - delta, origin + delta)
    } else {
        Rect::from_points(origin, origin + delta)
    }
}

/// Convert a page-space screenshot box to viewport pixels for drawing in
/// front of the canvas.
pub fn screenshot_overlay(editor: &dyn Editor, page_box: Rect) -> Rect {
    let zoom = editor.zoom_level();
    let origin = editor.page_to_viewport(page_box.origin());
    Rect::from_origin_size(origin, page_box.size() * zoom)
}

impl ToolHandler for ScreenshotTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            id: SCREENSHOT,
            label: "Screen Shot",
            icon: "photo",
            kbd: "3",
        }
    }

    fn path(&self) -> String {
        let state = match self.state {
            ScreenshotState::Idle => "idle",
            ScreenshotState::Pointing { .. } => "pointing",
            ScreenshotState::Dragging { .. } => "dragging",
        };
        format!("{SCREENSHOT}.{state}")
    }

    fn on_enter(&mut self, editor: &mut dyn Editor) {
        self.state = ScreenshotState::Idle;
        editor.set_cursor(Cursor::Cross);
    }

    fn on_exit(&mut self, _editor: &mut dyn Editor) {
        self.state = ScreenshotState::Idle;
    }

    fn on_pointer_down(&mut self, _editor: &mut dyn Editor, event: &PointerEvent) {
        self.state = ScreenshotState::Pointing {
            origin: event.point,
        };
    }

    fn on_pointer_move(&mut self, editor: &mut dyn Editor, event: &PointerEvent) {
        match self.state {
            ScreenshotState::Pointing { origin } => {
                if is_drag(origin, event.point, editor.zoom_level()) {
                    self.state = ScreenshotState::Dragging {
                        origin,
                        current: event.point,
                        modifiers: event.modifiers,
                    };
                }
            }
            ScreenshotState::Dragging { origin, .. } => {
                self.state = ScreenshotState::Dragging {
                    origin,
                    current: event.point,
                    modifiers: event.modifiers,
                };
            }
            ScreenshotState::Idle => {}
        }
    }

    fn on_pointer_up(&mut self, editor: &mut dyn Editor, event: &PointerEvent) {
        match self.state {
            ScreenshotState::Dragging { origin, .. } => {
                let bounds = drag_box(origin, event.point, event.modifiers);
                self.complete(editor, bounds, event.modifiers.ctrl);
            }
            ScreenshotState::Pointing { .. } | ScreenshotState::Idle => {
                self.state = ScreenshotState::Idle;
            }
        }
    }

    fn on_cancel(&mut self, _editor: &mut dyn Editor) {
        self.state = ScreenshotState::Idle;
    }

    fn overlay(&self) -> Option<Rect> {
        self.screenshot_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::shapes::{GeoProps, Shape, ShapeProps};

    fn shift() -> Modifiers {
        Modifiers {
            shift: true,
            ..Modifiers::NONE
        }
    }

    #[test]
    fn test_drag_box_modifiers() {
        let origin = Point::new(100.0, 100.0);
        let current = Point::new(140.0, 120.0);

        let plain = drag_box(origin, current, Modifiers::NONE);
        assert_eq!(plain, Rect::new(100.0, 100.0, 140.0, 120.0));

        let square = drag_box(origin, current, shift());
        assert_eq!(square, Rect::new(100.0, 100.0, 140.0, 140.0));

        let centred = drag_box(
            origin,
            current,
            Modifiers {
                alt: true,
                ..Modifiers::NONE
            },
        );
        assert_eq!(centred, Rect::new(60.0, 80.0, 140.0, 120.0));

        // Squaring keeps the drag direction.
        let up_left = drag_box(origin, Point::new(90.0, 70.0), shift());
        assert_eq!(up_left, Rect::new(70.0, 70.0, 100.0, 100.0));
    }

    #[test]
    fn test_state_machine_paths() {
        let mut canvas = Canvas::default();
        canvas.set_current_tool(SCREENSHOT);
        assert_eq!(canvas.path(), "screenshot.idle");
        assert_eq!(canvas.cursor(), Cursor::Cross);

        canvas.pointer_down(PointerEvent::new(Point::new(0.0, 0.0)));
        assert_eq!(canvas.path(), "screenshot.pointing");
        canvas.pointer_move(PointerEvent::new(Point::new(2.0, 0.0)));
        assert_eq!(canvas.path(), "screenshot.pointing");
        canvas.pointer_move(PointerEvent::new(Point::new(50.0, 40.0)));
        assert_eq!(canvas.path(), "screenshot.dragging");
        assert_eq!(canvas.tool_overlay(), Some(Rect::new(0.0, 0.0, 50.0, 40.0)));

        canvas.cancel();
        assert_eq!(canvas.path(), "screenshot.idle");
        assert_eq!(canvas.tool_overlay(), None);
    }

    #[test]
    fn test_release_captures_intersecting_shapes() {
        let mut canvas = Canvas::default();
        let inside = Shape::new(ShapeProps::Geo(GeoProps::new(50.0, 50.0))).at(Point::new(20.0, 20.0));
        let outside = Shape::new(ShapeProps::Geo(GeoProps::new(50.0, 50.0))).at(Point::new(500.0, 500.0));
        let inside_id = inside.id;
        canvas.create_shapes(vec![inside, outside]).unwrap();
        canvas.set_current_tool(SCREENSHOT);

        canvas.pointer_down(PointerEvent::new(Point::new(0.0, 0.0)));
        canvas.pointer_move(PointerEvent::new(Point::new(100.0, 100.0)));
        canvas.pointer_up(PointerEvent::new(Point::new(100.0, 100.0)));

        let requests = canvas.take_screenshot_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].shape_ids, vec![inside_id]);
        assert_eq!(requests[0].bounds, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(!requests[0].copy_to_clipboard);
        assert_eq!(canvas.current_tool(), SELECT_TOOL);
    }

    #[test]
    fn test_ctrl_copies_and_empty_box_captures_nothing() {
        let mut canvas = Canvas::default();
        canvas.set_current_tool(SCREENSHOT);
        canvas.pointer_down(PointerEvent::new(Point::new(0.0, 0.0)));
        canvas.pointer_move(PointerEvent::new(Point::new(100.0, 100.0)));
        canvas.pointer_up(PointerEvent::new(Point::new(100.0, 100.0)));
        assert!(canvas.take_screenshot_requests().is_empty());

        let shape = Shape::new(ShapeProps::Geo(GeoProps::new(10.0, 10.0)));
        canvas.create_shapes(vec![shape]).unwrap();
        canvas.set_current_tool(SCREENSHOT);
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        canvas.pointer_down(PointerEvent::new(Point::new(0.0, 0.0)));
        canvas.pointer_move(PointerEvent::new(Point::new(100.0, 100.0)));
        canvas.pointer_up(PointerEvent::new(Point::new(100.0, 100.0)).with_modifiers(ctrl));
        let requests = canvas.take_screenshot_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].copy_to_clipboard);
    }

    #[test]
    fn test_overlay_in_viewport_space() {
        let mut canvas = Canvas::default();
        canvas.camera.zoom = 2.0;
        canvas.camera.offset = Vec2::new(10.0, 20.0);
        let overlay = screenshot_overlay(&canvas, Rect::new(5.0, 5.0, 25.0, 15.0));
        assert_eq!(overlay, Rect::new(20.0, 30.0, 60.0, 50.0));
    }
}
