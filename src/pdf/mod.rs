//! PDF Module
//!
//! Turns PDF documents into per-page PNG images for OCR. Rendering is done
//! by poppler's `pdftoppm`, which must be installed and available in PATH
//! (or pointed to with `PDFTOPPM_PATH`).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_skill::pdf::PdfRasterizer;
//!
//! let rasterizer = PdfRasterizer::new(config.pdf.clone());
//! let rasterized = rasterizer.rasterize(Path::new("scan.pdf")).await?;
//! for page in rasterized.pages() {
//!     // OCR the page image
//! }
//! // Page images are deleted when `rasterized` is dropped
//! ```

mod rasterizer;

pub use rasterizer::{PdfRasterizer, RasterizedPdf};

/// PDF error types
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("PDF rasterizer not found: {0}")]
    ToolNotFound(String),

    #[error("Error converting PDF: {0}")]
    RasterizeFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfError {
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ToolNotFound(_) | Self::RasterizeFailed(_) => Some(
                "Ensure poppler is installed: brew install poppler (or apt install poppler-utils)"
                    .to_string(),
            ),
            Self::Io(_) => None,
        }
    }
}
