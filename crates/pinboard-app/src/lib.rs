//! Pinboard Application
//!
//! The application shell: PDF session state, the control bar and toolbar,
//! keyboard shortcuts and the native and WASM entry points.

mod app;
mod shortcuts;
mod ui;

pub use app::{App, AppConfig, PdfBackend};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
pub use ui::{ControlButton, ToolbarItem, UiAction, UiState};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebApp, run_wasm};
