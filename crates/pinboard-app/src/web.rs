//! WebAssembly entry point and the JS-facing wrapper around [`App`].

use crate::{App, AppConfig};
use kurbo::Point;
use pinboard_core::Modifiers;
use wasm_bindgen::prelude::*;

/// Initialize logging and panic reporting.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Fails only if a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Starting Pinboard (WASM)");
}

/// The application as seen from JavaScript.
///
/// PDF rendering and writing stay on the JS side; this wrapper drives the
/// canvas, the tools and the control bar text.
#[wasm_bindgen]
pub struct WebApp {
    app: App,
}

#[wasm_bindgen]
impl WebApp {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> WebApp {
        let config = AppConfig {
            width: width.max(0.0) as u32,
            height: height.max(0.0) as u32,
            device_pixel_ratio,
            ..AppConfig::default()
        };
        WebApp {
            app: App::new(config),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.app.set_viewport_size(width, height);
    }

    /// Returns `true` if the key was a shortcut.
    pub fn key_down(&mut self, key: &str, ctrl: bool, shift: bool) -> bool {
        let handled = self.app.shortcuts().find(key, ctrl, shift).is_some();
        if let Some(action) = self.app.handle_key(key, ctrl, shift) {
            log::debug!("Shortcut {action:?} is handled by the page");
        }
        handled
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, shift: bool, alt: bool, ctrl: bool) {
        self.app
            .pointer_down(Point::new(x, y), Modifiers { shift, alt, ctrl });
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, shift: bool, alt: bool, ctrl: bool) {
        self.app
            .pointer_move(Point::new(x, y), Modifiers { shift, alt, ctrl });
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, shift: bool, alt: bool, ctrl: bool) {
        self.app
            .pointer_up(Point::new(x, y), Modifiers { shift, alt, ctrl });
    }

    pub fn current_tool(&self) -> String {
        self.app.canvas().current_tool().to_string()
    }

    pub fn status_text(&self) -> Option<String> {
        self.app.status_text()
    }

    pub fn export_button_label(&self) -> String {
        self.app.export_button_label()
    }

    /// Pending screenshot regions as JSON.
    pub fn take_screenshot_requests(&mut self) -> String {
        let requests: Vec<_> = self
            .app
            .take_screenshot_requests()
            .into_iter()
            .map(|request| {
                serde_json::json!({
                    "shapeIds": request.shape_ids,
                    "bounds": request.bounds,
                    "copyToClipboard": request.copy_to_clipboard,
                })
            })
            .collect();
        serde_json::Value::Array(requests).to_string()
    }
}
