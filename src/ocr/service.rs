//! OCR Service
//!
//! Picks the backend for the requested mode and runs whole documents
//! through it, page by page for PDFs.

use std::path::Path;
use std::sync::Arc;

use super::{
    provider::{OcrProviderTrait, OllamaProvider},
    types::{OcrDocument, OcrError, OcrMode, PageText},
};
use crate::config::Config;
use crate::error::Result;
use crate::input::InputKind;
use crate::pdf::PdfRasterizer;

/// Per-run OCR options, usually taken from the command line
#[derive(Debug, Clone, Default)]
pub struct OcrOptions {
    pub mode: OcrMode,
    /// Custom prompt for the vision model (ignored in fast mode)
    pub prompt: Option<String>,
    /// PaddleOCR language; falls back to the configured one
    pub lang: Option<String>,
}

/// OCR service for images and PDFs
pub struct OcrService {
    provider: Arc<dyn OcrProviderTrait>,
    rasterizer: PdfRasterizer,
}

impl OcrService {
    /// Create a service backed by the provider for `options.mode`
    pub fn new(config: &Config, options: &OcrOptions) -> Result<Self> {
        let provider: Arc<dyn OcrProviderTrait> = match options.mode {
            OcrMode::Deepseek => Arc::new(OllamaProvider::new(
                &config.ollama,
                options.prompt.as_deref(),
            )?),
            OcrMode::Paddle => {
                if options.prompt.is_some() {
                    tracing::warn!("--prompt is ignored in fast mode");
                }
                let lang = options.lang.as_deref().unwrap_or(&config.paddle.lang);
                paddle_provider(config, lang)?
            }
        };

        Ok(Self::with_provider(
            provider,
            PdfRasterizer::new(config.pdf.clone()),
        ))
    }

    pub fn with_provider(provider: Arc<dyn OcrProviderTrait>, rasterizer: PdfRasterizer) -> Self {
        Self {
            provider,
            rasterizer,
        }
    }

    pub fn mode(&self) -> OcrMode {
        self.provider.mode()
    }

    /// Check input type and run the matching pipeline
    pub async fn process(&self, path: &Path) -> Result<OcrDocument> {
        match InputKind::detect(path)? {
            InputKind::Pdf => self.process_pdf(path).await,
            InputKind::Image => self.process_image(path).await,
        }
    }

    /// OCR a single image file
    pub async fn process_image(&self, path: &Path) -> Result<OcrDocument> {
        tracing::info!("Processing: {}", path.display());
        tracing::info!("Mode: {}", self.mode().label());

        let text = self.recognize_file(path).await?;

        Ok(OcrDocument::image(
            path.display().to_string(),
            self.mode(),
            text,
        ))
    }

    /// Rasterize a PDF and OCR each page in order
    pub async fn process_pdf(&self, path: &Path) -> Result<OcrDocument> {
        tracing::info!("Processing PDF: {}", path.display());
        tracing::info!("Mode: {}", self.mode().label());

        // Page images are removed when `rasterized` goes out of scope,
        // including on early return
        let rasterized = self.rasterizer.rasterize(path).await?;
        let total = rasterized.len();

        let mut pages = Vec::with_capacity(total);
        for (index, page_path) in rasterized.pages().iter().enumerate() {
            tracing::info!("OCR page {}/{}...", index + 1, total);
            let text = self.recognize_file(page_path).await?;
            pages.push(PageText {
                page: index + 1,
                text,
            });
        }

        Ok(OcrDocument::pdf(
            path.display().to_string(),
            self.mode(),
            pages,
        ))
    }

    async fn recognize_file(&self, path: &Path) -> Result<String> {
        let image_data = tokio::fs::read(path).await.map_err(|e| {
            OcrError::ImageLoad(format!("{}: {}", path.display(), e))
        })?;

        Ok(self.provider.recognize(&image_data).await?)
    }
}

#[cfg(feature = "paddle")]
fn paddle_provider(config: &Config, lang: &str) -> Result<Arc<dyn OcrProviderTrait>> {
    let models = config.paddle.resolve(lang)?;
    Ok(Arc::new(super::provider::PaddleProvider::new(models)))
}

#[cfg(not(feature = "paddle"))]
fn paddle_provider(config: &Config, lang: &str) -> Result<Arc<dyn OcrProviderTrait>> {
    config.paddle.resolve(lang)?;
    Err(OcrError::ProviderNotAvailable(
        "fast mode is unavailable: this binary was built without PaddleOCR support".to_string(),
    )
    .into())
}
