//! Application state: the canvas, the current PDF and the control bar.

use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use crate::ui::{
    ControlButton, PRIMARY_BUTTON_COLOR, SECONDARY_BUTTON_COLOR, UiAction, UiState,
    screenshot_box, toolbar_items,
};
use kurbo::Point;
use pinboard_core::pdf::{
    AppliedPdf, CanvasRasterizer, ExportedPdf, Fetcher, FilePicker, PdfLoader, PdfRenderer,
    PdfWriterFactory, apply_pdf_to_editor, export_pdf,
};
use pinboard_core::{Canvas, Editor, Modifiers, PinboardConfig, PointerEvent, ScreenshotRequest};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f64,
    pub config: PinboardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Pinboard".to_string(),
            width: 1280,
            height: 800,
            device_pixel_ratio: 1.0,
            config: PinboardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Platform services for reading and writing PDFs.
pub struct PdfBackend {
    pub renderer: Box<dyn PdfRenderer>,
    pub writers: Box<dyn PdfWriterFactory>,
    pub rasterizer: Box<dyn CanvasRasterizer>,
    pub fetcher: Box<dyn Fetcher>,
    pub picker: Box<dyn FilePicker>,
}

/// The application shell around a [`Canvas`].
pub struct App {
    config: AppConfig,
    canvas: Canvas,
    shortcuts: ShortcutRegistry,
    loader: PdfLoader,
    applied: Option<AppliedPdf>,
    applied_revision: u64,
    backend: Option<PdfBackend>,
    is_exporting: bool,
    export_progress: f64,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let mut canvas = Canvas::new(config.config.clone());
        canvas.set_viewport_size(f64::from(config.width), f64::from(config.height));
        let shortcuts = ShortcutRegistry::from_registry(canvas.registry());
        let loader = PdfLoader::new(config.config.pdf.clone(), config.device_pixel_ratio);
        Self {
            config,
            canvas,
            shortcuts,
            loader,
            applied: None,
            applied_revision: 0,
            backend: None,
            is_exporting: false,
            export_progress: 0.0,
        }
    }

    pub fn with_pdf_backend(mut self, backend: PdfBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn shortcuts(&self) -> &ShortcutRegistry {
        &self.shortcuts
    }

    pub fn pdf_loader(&self) -> &PdfLoader {
        &self.loader
    }

    pub fn applied_pdf(&self) -> Option<&AppliedPdf> {
        self.applied.as_ref()
    }

    // PDF

    pub async fn open_pdf(&mut self) {
        let Some(backend) = &self.backend else {
            log::warn!("No PDF backend configured");
            return;
        };
        if self
            .loader
            .open_file_picker(backend.picker.as_ref(), backend.renderer.as_ref())
            .await
        {
            self.sync_pdf();
        }
    }

    pub async fn load_pdf_from_url(&mut self, url: &str) {
        let Some(backend) = &self.backend else {
            log::warn!("No PDF backend configured");
            return;
        };
        self.loader
            .load_from_url(backend.fetcher.as_ref(), backend.renderer.as_ref(), url)
            .await;
        self.sync_pdf();
    }

    pub async fn load_pdf_bytes(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let Some(backend) = &self.backend else {
            log::warn!("No PDF backend configured");
            return;
        };
        self.loader
            .load_from_bytes(backend.renderer.as_ref(), name, bytes)
            .await;
        self.sync_pdf();
    }

    /// Export the annotated PDF. Failures are logged and yield `None`.
    pub async fn export_pdf(&mut self, mut on_progress: impl FnMut(f64)) -> Option<ExportedPdf> {
        if self.is_exporting {
            return None;
        }
        let (Some(backend), Some(pdf)) = (&self.backend, self.loader.pdf()) else {
            return None;
        };

        self.is_exporting = true;
        self.export_progress = 0.0;
        let progress = &mut self.export_progress;
        let result = export_pdf(
            &self.canvas,
            pdf,
            backend.writers.as_ref(),
            backend.rasterizer.as_ref(),
            |value| {
                *progress = value;
                on_progress(value);
            },
        )
        .await;
        self.is_exporting = false;

        match result {
            Ok(exported) => Some(exported),
            Err(err) => {
                log::error!("PDF export error: {err}");
                None
            }
        }
    }

    /// Swap the PDF on the canvas for the loader's current document.
    fn sync_pdf(&mut self) {
        if self.loader.revision() == self.applied_revision {
            return;
        }
        self.applied_revision = self.loader.revision();

        if let Some(applied) = self.applied.take() {
            applied.dispose(&mut self.canvas);
        }
        let Some(pdf) = self.loader.pdf() else {
            return;
        };
        match apply_pdf_to_editor(&mut self.canvas, pdf, &self.config.config.pdf) {
            Ok(applied) => self.applied = Some(applied),
            Err(err) => log::error!("Failed to place {} on the canvas: {err}", pdf.name),
        }
    }

    /// Take the current PDF off the canvas.
    pub fn close(&mut self) {
        if let Some(applied) = self.applied.take() {
            applied.dispose(&mut self.canvas);
        }
    }

    // Control bar

    pub fn is_exporting(&self) -> bool {
        self.is_exporting
    }

    pub fn export_progress(&self) -> f64 {
        self.export_progress
    }

    pub fn can_export(&self) -> bool {
        self.loader.pdf().is_some() && !self.is_exporting
    }

    pub fn export_button_label(&self) -> String {
        if self.is_exporting {
            format!("Exporting… {}%", (self.export_progress * 100.0).round())
        } else {
            "Export PDF".to_string()
        }
    }

    /// Status line: loading, the last error, or the loaded page count.
    pub fn status_text(&self) -> Option<String> {
        if self.loader.is_loading() {
            return Some("Loading PDF...".to_string());
        }
        if let Some(error) = self.loader.error() {
            return Some(error.to_string());
        }
        self.loader
            .pdf()
            .map(|pdf| format!("PDF loaded ({} pages)", pdf.page_count()))
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            title: self.config.title.clone(),
            toolbar: toolbar_items(&self.canvas),
            open_button: ControlButton::new("Open PDF", PRIMARY_BUTTON_COLOR),
            url_button: ControlButton::new("Load from URL", SECONDARY_BUTTON_COLOR),
            export_button: ControlButton::new(self.export_button_label(), PRIMARY_BUTTON_COLOR)
                .disabled(!self.can_export()),
            status: self.status_text(),
            status_is_error: !self.loader.is_loading() && self.loader.error().is_some(),
            screenshot_box: screenshot_box(&self.canvas),
        }
    }

    /// Run a UI action. Returns the exported PDF for [`UiAction::ExportPdf`].
    pub async fn handle_action(&mut self, action: UiAction) -> Option<ExportedPdf> {
        match action {
            UiAction::SetTool(id) => self.canvas.set_current_tool(&id),
            UiAction::Cancel => self.canvas.cancel(),
            UiAction::OpenPdf => self.open_pdf().await,
            UiAction::LoadPdfFromUrl(url) => self.load_pdf_from_url(&url).await,
            UiAction::ExportPdf => return self.export_pdf(|_| {}).await,
        }
        None
    }

    // Input

    /// Handle a key press. Tool switches and cancel run immediately; PDF
    /// actions are returned for the platform to run through [`App::handle_action`].
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool) -> Option<UiAction> {
        let action = self.shortcuts.find(key, ctrl, shift)?.action;
        match action {
            ShortcutAction::SetTool(id) => {
                self.canvas.set_current_tool(id);
                None
            }
            ShortcutAction::Cancel => {
                self.canvas.cancel();
                None
            }
            ShortcutAction::OpenPdf => Some(UiAction::OpenPdf),
            ShortcutAction::ExportPdf => Some(UiAction::ExportPdf),
        }
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.canvas.set_viewport_size(width, height);
        if let Some(applied) = &mut self.applied {
            applied.on_viewport_changed(&mut self.canvas);
        }
    }

    fn pointer_event(&self, screen_point: Point, modifiers: Modifiers) -> PointerEvent {
        PointerEvent::new(self.canvas.camera.screen_to_page(screen_point)).with_modifiers(modifiers)
    }

    pub fn pointer_down(&mut self, screen_point: Point, modifiers: Modifiers) {
        let event = self.pointer_event(screen_point, modifiers);
        self.canvas.pointer_down(event);
    }

    pub fn pointer_move(&mut self, screen_point: Point, modifiers: Modifiers) {
        let event = self.pointer_event(screen_point, modifiers);
        self.canvas.pointer_move(event);
    }

    pub fn pointer_up(&mut self, screen_point: Point, modifiers: Modifiers) {
        let event = self.pointer_event(screen_point, modifiers);
        self.canvas.pointer_up(event);
    }

    /// Screenshot regions captured since the last call.
    pub fn take_screenshot_requests(&mut self) -> Vec<ScreenshotRequest> {
        self.canvas.take_screenshot_requests()
    }

    pub fn zoom_level(&self) -> f64 {
        self.canvas.zoom_level()
    }
}
