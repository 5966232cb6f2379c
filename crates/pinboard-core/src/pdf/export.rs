//! Writing canvas annotations back into the source PDF.

use super::{CanvasRasterizer, ImageExportOptions, PdfDocument, PdfWriterFactory};
use crate::editor::Editor;
use crate::error::{PdfError, PdfResult};
use crate::math::collides;
use crate::shapes::ShapeId;
use kurbo::{Point, Rect};

/// The serialized result of [`export_pdf`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedPdf {
    /// Suggested download name.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ExportedPdf {
    pub const MIME_TYPE: &'static str = super::PDF_MIME_TYPE;
}

struct Progress<F> {
    done: usize,
    total: usize,
    on_progress: F,
}

impl<F: FnMut(f64)> Progress<F> {
    fn tick(&mut self) {
        self.done += 1;
        (self.on_progress)(self.done as f64 / self.total as f64);
    }
}

/// Draw every non-page shape over the PDF page it overlaps and save the result.
///
/// Each page that has shapes on it gets a transparent raster of the page
/// region stretched over the whole PDF page. Progress is reported as a
/// fraction after loading, after each of two steps per page, and after saving.
pub async fn export_pdf(
    editor: &dyn Editor,
    pdf: &PdfDocument,
    writers: &dyn PdfWriterFactory,
    rasterizer: &dyn CanvasRasterizer,
    on_progress: impl FnMut(f64),
) -> PdfResult<ExportedPdf> {
    let mut progress = Progress {
        done: 0,
        total: pdf.pages.len() * 2 + 2,
        on_progress,
    };

    let mut writer = writers.load(&pdf.source).await?;
    progress.tick();

    if writer.page_count() != pdf.pages.len() {
        return Err(PdfError::PageCountMismatch {
            source_pages: writer.page_count(),
            document_pages: pdf.pages.len(),
        });
    }

    let page_ids = pdf.page_shape_ids();
    let all_ids: Vec<ShapeId> = editor
        .current_page_shape_ids()
        .into_iter()
        .filter(|id| !page_ids.contains(id))
        .collect();

    for (index, page) in pdf.pages.iter().enumerate() {
        let on_page = all_ids.iter().any(|&id| {
            editor
                .shape_page_bounds(id)
                .is_some_and(|bounds| collides(bounds, page.bounds))
        });
        if !on_page {
            progress.tick();
            progress.tick();
            continue;
        }

        let png = rasterizer
            .to_png(editor, &all_ids, ImageExportOptions::clipped(page.bounds))
            .await?;
        progress.tick();

        let size = writer.page_size(index).ok_or_else(|| {
            PdfError::Write(format!("page {index} missing from output document"))
        })?;
        writer
            .draw_png(index, &png, Rect::from_origin_size(Point::ZERO, size))
            .await?;
        progress.tick();
    }

    let bytes = writer.save().await?;
    progress.tick();
    log::info!("Exported {} ({} bytes)", pdf.name, bytes.len());

    Ok(ExportedPdf {
        name: pdf.name.clone(),
        bytes,
    })
}
