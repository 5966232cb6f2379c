//! Loading PDFs into rasterized, laid-out pages.

use super::{Fetcher, FilePicker, PdfDocument, PdfPage, PdfRenderer, PickedFile};
use crate::config::PdfConfig;
use crate::error::{PdfError, PdfResult};
use kurbo::Rect;
use percent_encoding::percent_decode_str;
use url::Url;
use uuid::Uuid;

/// Name used when a URL has no usable last path segment.
pub const DEFAULT_FILE_NAME: &str = "document.pdf";

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Base that relative URLs are resolved against.
const RELATIVE_URL_BASE: &str = "http://localhost/";

/// Rasterize every page of `source` and lay the pages out top to bottom.
///
/// Pages are rendered at `device_pixel_ratio * visual_scale` and sized in
/// page units as raster size over the device pixel ratio. They are stacked
/// with `page_spacing` between them and centred on the widest page.
pub async fn load_pdf_document(
    renderer: &dyn PdfRenderer,
    name: impl Into<String>,
    source: Vec<u8>,
    device_pixel_ratio: f64,
    config: &PdfConfig,
) -> PdfResult<PdfDocument> {
    let name = name.into();
    let dpr = if device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let scale = dpr * config.visual_scale;

    let page_count = renderer.page_count(&source).await?;
    if page_count == 0 {
        return Err(PdfError::EmptyDocument);
    }
    log::info!("Loading {name}: {page_count} page(s) at scale {scale}");

    let mut pages = Vec::with_capacity(page_count);
    let mut top = 0.0;
    let mut widest: f64 = 0.0;
    for index in 0..page_count {
        let raster = renderer.render_page(&source, index, scale).await?;
        let width = f64::from(raster.width) / dpr;
        let height = f64::from(raster.height) / dpr;
        pages.push(PdfPage {
            src: raster.to_data_url()?,
            bounds: Rect::new(0.0, top, width, top + height),
            asset_id: Uuid::new_v4(),
            shape_id: Uuid::new_v4(),
        });
        top += height + config.page_spacing;
        widest = widest.max(width);
    }

    for page in &mut pages {
        let x = (widest - page.bounds.width()) / 2.0;
        page.bounds = page.bounds.with_origin((x, page.bounds.y0));
    }

    Ok(PdfDocument {
        name,
        pages,
        source,
    })
}

/// File name for a PDF fetched from `url`: the last path segment,
/// percent-decoded, or [`DEFAULT_FILE_NAME`].
pub fn file_name_from_url(url: &str) -> String {
    let parsed = Url::parse(url).or_else(|_| Url::parse(RELATIVE_URL_BASE)?.join(url));
    let from_path = parsed.ok().and_then(|parsed| {
        let segment = parsed.path_segments()?.next_back()?.to_string();
        Some(
            percent_decode_str(&segment)
                .decode_utf8()
                .map(|decoded| decoded.into_owned())
                .unwrap_or(segment),
        )
    });
    let name = from_path.unwrap_or_else(|| url.rsplit('/').next().unwrap_or_default().to_string());
    if name.trim().is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        name
    }
}

/// Loading state for the current PDF.
///
/// A successful load replaces the document and bumps the revision. A failed
/// load only records a user-facing message; the previous document stays.
#[derive(Debug, Default)]
pub struct PdfLoader {
    config: PdfConfig,
    device_pixel_ratio: f64,
    pdf: Option<PdfDocument>,
    is_loading: bool,
    error: Option<String>,
    revision: u64,
}

impl PdfLoader {
    pub fn new(config: PdfConfig, device_pixel_ratio: f64) -> Self {
        Self {
            config,
            device_pixel_ratio,
            ..Self::default()
        }
    }

    pub fn pdf(&self) -> Option<&PdfDocument> {
        self.pdf.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Bumped whenever the current document is replaced or cleared.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_device_pixel_ratio(&mut self, device_pixel_ratio: f64) {
        self.device_pixel_ratio = device_pixel_ratio;
    }

    pub async fn load_from_bytes(
        &mut self,
        renderer: &dyn PdfRenderer,
        name: impl Into<String>,
        source: Vec<u8>,
    ) {
        self.start();
        let result = load_pdf_document(
            renderer,
            name,
            source,
            self.device_pixel_ratio,
            &self.config,
        )
        .await;
        match result {
            Ok(document) => {
                log::info!("Loaded {} ({} pages)", document.name, document.page_count());
                self.set_pdf(Some(document));
            }
            Err(err) => self.fail(err),
        }
        self.is_loading = false;
    }

    pub async fn load_from_file(&mut self, renderer: &dyn PdfRenderer, file: PickedFile) {
        self.load_from_bytes(renderer, file.name, file.bytes).await;
    }

    pub async fn load_from_url(
        &mut self,
        fetcher: &dyn Fetcher,
        renderer: &dyn PdfRenderer,
        url: &str,
    ) {
        self.start();
        let response = match fetcher.fetch(url).await {
            Ok(response) if response.ok() => response,
            Ok(response) => {
                self.fail(PdfError::Fetch {
                    status: response.status,
                });
                self.is_loading = false;
                return;
            }
            Err(err) => {
                self.fail(err);
                self.is_loading = false;
                return;
            }
        };
        self.load_from_bytes(renderer, file_name_from_url(url), response.body)
            .await;
    }

    /// Ask the user for a PDF and load it. Returns `false` if the picker was cancelled.
    pub async fn open_file_picker(
        &mut self,
        picker: &dyn FilePicker,
        renderer: &dyn PdfRenderer,
    ) -> bool {
        let Some(file) = picker.pick_file(PDF_MIME_TYPE).await else {
            return false;
        };
        self.load_from_file(renderer, file).await;
        true
    }

    fn start(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    fn fail(&mut self, err: PdfError) {
        log::error!("PDF loading error: {err}");
        self.error = Some(err.to_string());
    }

    fn set_pdf(&mut self, pdf: Option<PdfDocument>) {
        self.pdf = pdf;
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{BoxFuture, FetchResponse, RasterImage, decode_png, decode_png_data_url};
    use std::cell::RefCell;

    /// Renders pages of fixed PDF-unit sizes as transparent rasters.
    struct FakeRenderer {
        sizes: Vec<(f64, f64)>,
        scales: RefCell<Vec<f64>>,
    }

    impl FakeRenderer {
        fn new(sizes: &[(f64, f64)]) -> Self {
            Self {
                sizes: sizes.to_vec(),
                scales: RefCell::new(Vec::new()),
            }
        }
    }

    impl PdfRenderer for FakeRenderer {
        fn page_count<'a>(&'a self, source: &'a [u8]) -> BoxFuture<'a, PdfResult<usize>> {
            Box::pin(async move {
                if source.starts_with(b"%PDF") {
                    Ok(self.sizes.len())
                } else {
                    Err(PdfError::Decode("Invalid PDF structure".into()))
                }
            })
        }

        fn render_page<'a>(
            &'a self,
            _source: &'a [u8],
            index: usize,
            scale: f64,
        ) -> BoxFuture<'a, PdfResult<RasterImage>> {
            Box::pin(async move {
                self.scales.borrow_mut().push(scale);
                let (w, h) = self.sizes[index];
                Ok(RasterImage::transparent(
                    (w * scale).round() as u32,
                    (h * scale).round() as u32,
                ))
            })
        }
    }

    struct FakeFetcher {
        status: u16,
    }

    impl Fetcher for FakeFetcher {
        fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, PdfResult<FetchResponse>> {
            Box::pin(async move {
                Ok(FetchResponse {
                    status: self.status,
                    body: b"%PDF-1.7".to_vec(),
                })
            })
        }
    }

    struct FakePicker {
        file: Option<PickedFile>,
    }

    impl FilePicker for FakePicker {
        fn pick_file<'a>(&'a self, accept: &'a str) -> BoxFuture<'a, Option<PickedFile>> {
            assert_eq!(accept, "application/pdf");
            Box::pin(async move { self.file.clone() })
        }
    }

    fn pdf_bytes() -> Vec<u8> {
        b"%PDF-1.7 fake".to_vec()
    }

    #[test]
    fn test_layout() {
        let renderer = FakeRenderer::new(&[(100.0, 50.0), (200.0, 80.0)]);
        let doc = pollster::block_on(load_pdf_document(
            &renderer,
            "doc.pdf",
            pdf_bytes(),
            1.0,
            &PdfConfig::default(),
        ))
        .unwrap();

        assert_eq!(doc.name, "doc.pdf");
        assert_eq!(doc.source, pdf_bytes());
        assert_eq!(*renderer.scales.borrow(), vec![2.0, 2.0]);

        // Rasters are 2x, page units are raster / dpr.
        let first = doc.pages[0].bounds;
        assert!((first.width() - 200.0).abs() < f64::EPSILON);
        assert!((first.height() - 100.0).abs() < f64::EPSILON);
        assert!((first.x0 - 100.0).abs() < f64::EPSILON);
        assert!(first.y0.abs() < f64::EPSILON);

        let second = doc.pages[1].bounds;
        assert!(second.x0.abs() < f64::EPSILON);
        assert!((second.y0 - 132.0).abs() < f64::EPSILON);
        assert!((second.width() - 400.0).abs() < f64::EPSILON);

        assert_ne!(doc.pages[0].shape_id, doc.pages[1].shape_id);
        let png = decode_png_data_url(&doc.pages[0].src).unwrap();
        let raster = decode_png(&png).unwrap();
        assert_eq!((raster.width, raster.height), (200, 100));
    }

    #[test]
    fn test_device_pixel_ratio() {
        let renderer = FakeRenderer::new(&[(100.0, 50.0)]);
        let doc = pollster::block_on(load_pdf_document(
            &renderer,
            "doc.pdf",
            pdf_bytes(),
            2.0,
            &PdfConfig::default(),
        ))
        .unwrap();
        assert_eq!(*renderer.scales.borrow(), vec![4.0]);
        // 400 raster pixels over dpr 2.
        assert!((doc.pages[0].bounds.width() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_document() {
        let renderer = FakeRenderer::new(&[]);
        let result = pollster::block_on(load_pdf_document(
            &renderer,
            "doc.pdf",
            pdf_bytes(),
            1.0,
            &PdfConfig::default(),
        ));
        assert!(matches!(result, Err(PdfError::EmptyDocument)));
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://example.com/files/My%20Report.pdf?x=1"),
            "My Report.pdf"
        );
        assert_eq!(file_name_from_url("https://example.com/"), DEFAULT_FILE_NAME);
        assert_eq!(file_name_from_url("docs/paper.pdf"), "paper.pdf");
        assert_eq!(file_name_from_url(""), DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_loader_success() {
        let renderer = FakeRenderer::new(&[(100.0, 50.0)]);
        let mut loader = PdfLoader::new(PdfConfig::default(), 1.0);
        pollster::block_on(loader.load_from_bytes(&renderer, "doc.pdf", pdf_bytes()));

        assert!(!loader.is_loading());
        assert!(loader.error().is_none());
        assert_eq!(loader.pdf().map(|pdf| pdf.page_count()), Some(1));
        assert_eq!(loader.revision(), 1);
    }

    #[test]
    fn test_loader_error_keeps_previous() {
        let renderer = FakeRenderer::new(&[(100.0, 50.0)]);
        let mut loader = PdfLoader::new(PdfConfig::default(), 1.0);
        pollster::block_on(loader.load_from_bytes(&renderer, "doc.pdf", pdf_bytes()));
        assert!(loader.pdf().is_some());

        pollster::block_on(loader.load_from_bytes(&renderer, "bad.pdf", b"nope".to_vec()));
        assert!(!loader.is_loading());
        assert_eq!(
            loader.error(),
            Some("Failed to decode PDF: Invalid PDF structure")
        );
        assert_eq!(loader.pdf().map(|pdf| pdf.name.as_str()), Some("doc.pdf"));
        assert_eq!(loader.revision(), 1);

        // The next successful load clears the message.
        pollster::block_on(loader.load_from_bytes(&renderer, "doc2.pdf", pdf_bytes()));
        assert!(loader.error().is_none());
        assert_eq!(loader.revision(), 2);
    }

    #[test]
    fn test_load_from_url() {
        let renderer = FakeRenderer::new(&[(100.0, 50.0)]);
        let mut loader = PdfLoader::new(PdfConfig::default(), 1.0);
        pollster::block_on(loader.load_from_url(
            &FakeFetcher { status: 200 },
            &renderer,
            "https://example.com/a/b%20c.pdf",
        ));
        assert_eq!(loader.pdf().map(|pdf| pdf.name.as_str()), Some("b c.pdf"));
        assert!(loader.error().is_none());
    }

    #[test]
    fn test_load_from_url_bad_status() {
        let renderer = FakeRenderer::new(&[(100.0, 50.0)]);
        let mut loader = PdfLoader::new(PdfConfig::default(), 1.0);
        pollster::block_on(loader.load_from_url(
            &FakeFetcher { status: 404 },
            &renderer,
            "https://example.com/missing.pdf",
        ));
        assert!(loader.pdf().is_none());
        assert!(!loader.is_loading());
        assert_eq!(loader.error(), Some("Failed to fetch PDF (404)"));
        assert!(renderer.scales.borrow().is_empty());
    }

    #[test]
    fn test_open_file_picker() {
        let renderer = FakeRenderer::new(&[(100.0, 50.0), (100.0, 50.0)]);
        let mut loader = PdfLoader::new(PdfConfig::default(), 1.0);

        let cancelled = FakePicker { file: None };
        assert!(!pollster::block_on(loader.open_file_picker(&cancelled, &renderer)));
        assert_eq!(loader.revision(), 0);

        let picked = FakePicker {
            file: Some(PickedFile {
                name: "picked.pdf".into(),
                bytes: pdf_bytes(),
            }),
        };
        assert!(pollster::block_on(loader.open_file_picker(&picked, &renderer)));
        let pdf = loader.pdf().unwrap();
        assert_eq!(pdf.name, "picked.pdf");
        assert_eq!(pdf.page_count(), 2);
    }
}
