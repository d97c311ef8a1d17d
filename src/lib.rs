//! OCR Skill Library
//!
//! Text extraction from images and PDFs with two interchangeable backends:
//! DeepSeek-OCR served by Ollama (smart mode) and PaddleOCR models run
//! in-process (fast mode). The binary in main.rs is a thin CLI over this.
//!
//! # Modules
//!
//! - `config`: Environment-driven settings
//! - `input`: Input file classification
//! - `pdf`: Page rasterization through poppler
//! - `ocr`: Backends, normalization and the document pipeline
//! - `output`: Text / JSON rendering
//! - `check`: Environment diagnostics

pub mod check;
pub mod config;
pub mod error;
pub mod input;
pub mod ocr;
pub mod output;
pub mod pdf;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{AppError, Result};
