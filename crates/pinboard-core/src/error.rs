//! Error types shared across the crate.

use crate::shapes::ShapeId;
use thiserror::Error;

/// Errors raised by host editor operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Shape already exists: {0}")]
    DuplicateShape(ShapeId),
    #[error("Cannot bind {from} to {to} with a {kind} binding")]
    CannotBind {
        from: ShapeId,
        to: ShapeId,
        kind: &'static str,
    },
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors raised while loading or exporting PDF documents.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to fetch PDF ({status})")]
    Fetch { status: u16 },
    #[error("Failed to decode PDF: {0}")]
    Decode(String),
    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },
    #[error("Failed to encode page image: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("Failed to rasterize canvas: {0}")]
    Rasterize(String),
    #[error("Failed to write PDF: {0}")]
    Write(String),
    #[error("PDF page count mismatch: source has {source_pages}, document has {document_pages}")]
    PageCountMismatch {
        source_pages: usize,
        document_pages: usize,
    },
    #[error("PDF has no pages")]
    EmptyDocument,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for PDF operations.
pub type PdfResult<T> = Result<T, PdfError>;
