//! Tool that drops pins and drags them into place.

use super::{PointerEvent, ToolDescriptor};
use crate::editor::{Cursor, Editor};
use crate::handler::ToolHandler;
use crate::shapes::{PIN, PinProps, Shape, ShapeId, ShapeProps};
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
enum PinToolState {
    Idle,
    Translating { pin: ShapeId, last: Point },
}

/// Pointer down creates a pin and starts translating it; releasing it binds
/// the pin to whatever lies underneath. The tool stays active afterwards.
#[derive(Debug, Clone)]
pub struct PinTool {
    state: PinToolState,
}

impl Default for PinTool {
    fn default() -> Self {
        Self::new()
    }
}

impl PinTool {
    pub fn new() -> Self {
        Self {
            state: PinToolState::Idle,
        }
    }
}

impl ToolHandler for PinTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            id: PIN,
            label: "Pin",
            icon: "link",
            kbd: "2",
        }
    }

    fn path(&self) -> String {
        match self.state {
            PinToolState::Idle => format!("{PIN}.idle"),
            PinToolState::Translating { .. } => format!("{PIN}.translating"),
        }
    }

    fn on_enter(&mut self, editor: &mut dyn Editor) {
        editor.set_cursor(Cursor::Cross);
    }

    fn on_exit(&mut self, editor: &mut dyn Editor) {
        if let PinToolState::Translating { pin, .. } = self.state {
            editor.end_translating(&[pin]);
        }
        self.state = PinToolState::Idle;
    }

    fn on_pointer_down(&mut self, editor: &mut dyn Editor, event: &PointerEvent) {
        let pin = Shape::new(ShapeProps::Pin(PinProps::default())).at(event.point);
        let id = pin.id;
        if let Err(err) = editor.create_shapes(vec![pin]) {
            log::warn!("Failed to create pin: {err}");
            return;
        }
        editor.select(&[id]);
        editor.begin_translating(&[id]);
        self.state = PinToolState::Translating {
            pin: id,
            last: event.point,
        };
    }

    fn on_pointer_move(&mut self, editor: &mut dyn Editor, event: &PointerEvent) {
        if let PinToolState::Translating { pin, last } = self.state {
            editor.translate_shapes(&[pin], event.point - last);
            self.state = PinToolState::Translating {
                pin,
                last: event.point,
            };
        }
    }

    fn on_pointer_up(&mut self, editor: &mut dyn Editor, _event: &PointerEvent) {
        if let PinToolState::Translating { pin, .. } = self.state {
            editor.end_translating(&[pin]);
        }
        self.state = PinToolState::Idle;
    }

    fn on_cancel(&mut self, editor: &mut dyn Editor) {
        if let PinToolState::Translating { pin, .. } = self.state {
            editor.delete_shapes(&[pin]);
        }
        self.state = PinToolState::Idle;
    }
}
