//! Pinboard Core Library
//!
//! Pin bindings, custom shapes, interactive tools and PDF import/export for
//! a host canvas editor, plus an in-memory reference host.

pub mod bindings;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod editor;
pub mod error;
pub mod handler;
pub mod math;
pub mod pdf;
pub mod shapes;
pub mod tools;

pub use bindings::{
    Binding, BindingId, BindingProps, NewBinding, PIN_BINDING, PinBindingHandler, PinBindingProps,
};
pub use camera::{Camera, CameraBehavior, CameraConstraints, CameraOptions, InitialZoom};
pub use canvas::{Canvas, CanvasDocument};
pub use config::{PdfConfig, PinboardConfig, RelaxationConfig};
pub use editor::{Cursor, Editor, SideEffectId};
pub use error::{EditorError, EditorResult, PdfError, PdfResult};
pub use handler::{BindingHandler, Registry, ShapeCapabilities, ShapeHandler, ToolHandler};
pub use pdf::{AppliedPdf, ExportedPdf, PdfDocument, PdfLoader, apply_pdf_to_editor, export_pdf};
pub use shapes::{ParentId, Shape, ShapeId, ShapeProps, ShapeUpdate};
pub use tools::{Modifiers, PointerEvent, ScreenshotRequest, ToolDescriptor};
