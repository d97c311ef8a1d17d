//! Error types for OCR Skill

use thiserror::Error;

use crate::config::ConfigError;
use crate::input::InputError;
use crate::ocr::OcrError;
use crate::pdf::PdfError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Follow-up advice printed below the error message
    pub fn hint(&self) -> Option<String> {
        match self {
            AppError::Input(e) => e.hint(),
            AppError::Pdf(e) => e.hint(),
            AppError::Ocr(e) => e.hint(),
            AppError::Config(_) | AppError::Io(_) | AppError::Json(_) => None,
        }
    }
}
