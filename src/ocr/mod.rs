//! OCR Module
//!
//! Forwards images to one of two OCR backends and reduces their answers to
//! plain text.
//!
//! Supports two backends:
//! - DeepSeek-OCR through Ollama (vision model, accepts custom prompts)
//! - PaddleOCR models run in-process (fast mode, `paddle` feature)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_skill::ocr::{OcrMode, OcrOptions, OcrService};
//!
//! let options = OcrOptions {
//!     mode: OcrMode::Deepseek,
//!     prompt: Some("Extract the table as markdown".to_string()),
//!     lang: None,
//! };
//! let service = OcrService::new(&config, &options)?;
//! let document = service.process(Path::new("invoice.pdf")).await?;
//! ```

pub mod normalize;
mod provider;
mod service;
mod types;

pub use provider::{OcrProviderTrait, OllamaProvider};
pub use service::{OcrOptions, OcrService};
pub use types::{
    DocumentContent, DocumentKind, OcrDocument, OcrError, OcrMode, PageText, DEFAULT_PROMPT,
};

#[cfg(feature = "paddle")]
pub use provider::PaddleProvider;
