//! PDF documents on the canvas.
//!
//! Pages are rasterized through a [`PdfRenderer`], laid out top to bottom and
//! placed on the canvas as locked image shapes. Export draws everything drawn
//! on top of each page back into the source PDF through a [`PdfWriter`].
//! The PDF codecs and the canvas rasterizer are provided by the platform.

mod apply;
mod export;
mod loader;
mod raster;

pub use apply::{AppliedPdf, apply_pdf_to_editor};
pub use export::{ExportedPdf, export_pdf};
pub use loader::{
    DEFAULT_FILE_NAME, PDF_MIME_TYPE, PdfLoader, file_name_from_url, load_pdf_document,
};
pub use raster::{BoxRasterizer, RasterImage, decode_png, decode_png_data_url, png_data_url};

use crate::editor::Editor;
use crate::error::PdfResult;
use crate::shapes::{AssetId, ShapeId};
use kurbo::{Rect, Size};
use std::future::Future;
use std::pin::Pin;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// One rasterized page and where it sits on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPage {
    /// PNG data URL of the page raster.
    pub src: String,
    /// Page-space bounds of the page shape.
    pub bounds: Rect,
    pub asset_id: AssetId,
    pub shape_id: ShapeId,
}

/// A loaded PDF: its rasterized pages and the source bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfDocument {
    pub name: String,
    pub pages: Vec<PdfPage>,
    pub source: Vec<u8>,
}

impl PdfDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_shape_ids(&self) -> Vec<ShapeId> {
        self.pages.iter().map(|page| page.shape_id).collect()
    }

    /// Union of all page bounds.
    pub fn bounds(&self) -> Option<Rect> {
        let mut pages = self.pages.iter();
        let first = pages.next()?.bounds;
        Some(pages.fold(first, |acc, page| acc.union(page.bounds)))
    }
}

/// Reads PDF bytes and renders pages to rasters.
pub trait PdfRenderer {
    fn page_count<'a>(&'a self, source: &'a [u8]) -> BoxFuture<'a, PdfResult<usize>>;

    /// Render page `index` (0-based) at `scale` raster pixels per PDF unit.
    fn render_page<'a>(
        &'a self,
        source: &'a [u8],
        index: usize,
        scale: f64,
    ) -> BoxFuture<'a, PdfResult<RasterImage>>;
}

/// Opens PDF bytes for modification.
pub trait PdfWriterFactory {
    fn load<'a>(&'a self, source: &'a [u8]) -> BoxFuture<'a, PdfResult<Box<dyn PdfWriter>>>;
}

/// An editable PDF document.
pub trait PdfWriter {
    fn page_count(&self) -> usize;

    /// Size of page `index` in PDF units.
    fn page_size(&self, index: usize) -> Option<Size>;

    /// Embed a PNG and draw it into `rect` on page `index` (origin bottom-left).
    fn draw_png<'a>(
        &'a mut self,
        index: usize,
        png: &'a [u8],
        rect: Rect,
    ) -> BoxFuture<'a, PdfResult<()>>;

    /// Serialize the document.
    fn save(&mut self) -> BoxFuture<'_, PdfResult<Vec<u8>>>;
}

/// Options for exporting part of the canvas as an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageExportOptions {
    /// Page-space region to export.
    pub bounds: Rect,
    pub scale: f64,
    pub padding: f64,
    pub background: bool,
}

impl ImageExportOptions {
    /// Transparent export of exactly `bounds` at 1:1.
    pub fn clipped(bounds: Rect) -> Self {
        Self {
            bounds,
            scale: 1.0,
            padding: 0.0,
            background: false,
        }
    }
}

/// Rasterizes canvas shapes to PNG.
pub trait CanvasRasterizer {
    fn to_png<'a>(
        &'a self,
        editor: &'a dyn Editor,
        ids: &'a [ShapeId],
        options: ImageExportOptions,
    ) -> BoxFuture<'a, PdfResult<Vec<u8>>>;
}

/// Response of a [`Fetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Whether the status is 2xx.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetches remote documents.
pub trait Fetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, PdfResult<FetchResponse>>;
}

/// A file chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Platform file dialog.
pub trait FilePicker {
    /// Let the user pick one file matching the `accept` MIME type. `None` if cancelled.
    fn pick_file<'a>(&'a self, accept: &'a str) -> BoxFuture<'a, Option<PickedFile>>;
}
