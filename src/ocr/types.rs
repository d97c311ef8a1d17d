//! OCR Types
//!
//! Shared types for the OCR backends and the documents they produce.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prompt sent to the vision model when the caller supplies none
pub const DEFAULT_PROMPT: &str = "Extract all text from this image.";

/// OCR backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrMode {
    /// DeepSeek-OCR vision model served by Ollama
    Deepseek,
    /// PaddleOCR models run in-process
    Paddle,
}

impl Default for OcrMode {
    fn default() -> Self {
        Self::Deepseek
    }
}

impl OcrMode {
    pub fn from_fast_flag(fast: bool) -> Self {
        if fast {
            Self::Paddle
        } else {
            Self::Deepseek
        }
    }

    /// Human-readable label used in progress logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deepseek => "DeepSeek-OCR (smart)",
            Self::Paddle => "PaddleOCR (fast)",
        }
    }
}

impl fmt::Display for OcrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deepseek => write!(f, "deepseek"),
            Self::Paddle => write!(f, "paddle"),
        }
    }
}

/// Kind of input document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Image,
    Pdf,
}

/// OCR result for one input file
#[derive(Debug, Clone, Serialize)]
pub struct OcrDocument {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub mode: OcrMode,
    #[serde(flatten)]
    pub content: DocumentContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DocumentContent {
    Image { text: String },
    Pdf { total_pages: usize, pages: Vec<PageText> },
}

/// Text recognized on a single PDF page (1-indexed)
#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    pub page: usize,
    pub text: String,
}

impl OcrDocument {
    pub fn image(source: String, mode: OcrMode, text: String) -> Self {
        Self {
            source,
            kind: DocumentKind::Image,
            mode,
            content: DocumentContent::Image { text },
        }
    }

    pub fn pdf(source: String, mode: OcrMode, pages: Vec<PageText>) -> Self {
        Self {
            source,
            kind: DocumentKind::Pdf,
            mode,
            content: DocumentContent::Pdf {
                total_pages: pages.len(),
                pages,
            },
        }
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("Cannot connect to Ollama at {0}")]
    ConnectionFailed(String),

    #[error("Ollama request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to read image: {0}")]
    ImageLoad(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    #[error("API error: {0}")]
    ApiError(String),
}

impl OcrError {
    /// Remediation shown under the error message
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ConnectionFailed(_) => {
                Some("Start the server with: ollama serve (or brew services start ollama)".to_string())
            }
            Self::Timeout(_) => Some("Raise OCR_TIMEOUT_SECS for large pages".to_string()),
            Self::ProviderNotAvailable(_) => Some(
                "Fast mode needs a build with `--features paddle` and PaddleOCR ONNX models (see PADDLE_MODEL_DIR)"
                    .to_string(),
            ),
            _ => None,
        }
    }
}
