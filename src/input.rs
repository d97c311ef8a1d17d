//! Input file validation and dispatch by extension

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Image extensions accepted by both backends (lowercase, without dot)
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tiff", "tif"];

pub const PDF_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Image,
    Pdf,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file type: {0}")]
    Unsupported(String),
}

impl InputError {
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Unsupported(_) => Some(format!("Supported: {}", supported_formats())),
            Self::NotFound(_) => None,
        }
    }
}

impl InputKind {
    /// Classify an input path, failing if it is missing or of an unknown type
    pub fn detect(path: &Path) -> Result<Self, InputError> {
        if !path.exists() {
            return Err(InputError::NotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if extension == PDF_EXTENSION {
            Ok(Self::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(Self::Image)
        } else if extension.is_empty() {
            Err(InputError::Unsupported(String::new()))
        } else {
            Err(InputError::Unsupported(format!(".{}", extension)))
        }
    }
}

/// `PDF, .bmp, .gif, ...` listing for error hints
pub fn supported_formats() -> String {
    let mut extensions: Vec<String> = IMAGE_EXTENSIONS.iter().map(|ext| format!(".{}", ext)).collect();
    extensions.sort();
    format!("PDF, {}", extensions.join(", "))
}
