//! Configuration management for OCR Skill
//!
//! Settings come from the environment (a `.env` file is honoured by the
//! binary) and are then overridden by command line flags.

use std::env;
use std::path::PathBuf;

use serde::Serialize;

use crate::ocr::OcrError;

/// Default Ollama endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default vision model served by Ollama
pub const DEFAULT_MODEL: &str = "deepseek-ocr";
/// Default PaddleOCR language (Chinese + English)
pub const DEFAULT_LANG: &str = "ch";

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub paddle: PaddleConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Executable used by the environment check (`ollama --version`, `ollama list`)
    pub binary: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaddleConfig {
    pub model_dir: PathBuf,
    pub det_model: Option<PathBuf>,
    pub rec_model: Option<PathBuf>,
    pub dict_path: Option<PathBuf>,
    pub lang: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PdfConfig {
    pub pdftoppm_path: PathBuf,
    pub dpi: u32,
}

/// Model files needed by the PaddleOCR pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddleModels {
    pub det_model: PathBuf,
    pub rec_model: PathBuf,
    pub dict_path: PathBuf,
}

impl PaddleModels {
    /// Model files that do not exist on disk
    pub fn missing(&self) -> Vec<&PathBuf> {
        [&self.det_model, &self.rec_model, &self.dict_path]
            .into_iter()
            .filter(|path| !path.exists())
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ollama: OllamaConfig {
                base_url: DEFAULT_OLLAMA_URL.to_string(),
                model: DEFAULT_MODEL.to_string(),
                timeout_secs: 120,
                binary: PathBuf::from("ollama"),
            },
            paddle: PaddleConfig {
                model_dir: PathBuf::from("models"),
                det_model: None,
                rec_model: None,
                dict_path: None,
                lang: DEFAULT_LANG.to_string(),
            },
            pdf: PdfConfig {
                pdftoppm_path: PathBuf::from("pdftoppm"),
                dpi: 200,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let base_url = lookup("OLLAMA_BASE_URL").unwrap_or(defaults.ollama.base_url);
        if base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "OLLAMA_BASE_URL",
                value: base_url,
                reason: "must not be empty".to_string(),
            });
        }

        let timeout_secs = parse_var(&lookup, "OCR_TIMEOUT_SECS", defaults.ollama.timeout_secs)?;
        let dpi = parse_var(&lookup, "PDF_DPI", defaults.pdf.dpi)?;
        if dpi == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PDF_DPI",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(Config {
            ollama: OllamaConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                model: lookup("OCR_MODEL").unwrap_or(defaults.ollama.model),
                timeout_secs,
                binary: lookup("OLLAMA_BIN")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.ollama.binary),
            },
            paddle: PaddleConfig {
                model_dir: lookup("PADDLE_MODEL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.paddle.model_dir),
                det_model: lookup("PADDLE_DET_MODEL").map(PathBuf::from),
                rec_model: lookup("PADDLE_REC_MODEL").map(PathBuf::from),
                dict_path: lookup("PADDLE_DICT_PATH").map(PathBuf::from),
                lang: lookup("PADDLE_LANG").unwrap_or(defaults.paddle.lang),
            },
            pdf: PdfConfig {
                pdftoppm_path: lookup("PDFTOPPM_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.pdf.pdftoppm_path),
                dpi,
            },
        })
    }
}

impl PaddleConfig {
    /// Resolve the model files for a language
    ///
    /// Explicit paths win; otherwise the detection model is shared at
    /// `<model_dir>/det.onnx` and recognition assets live under
    /// `<model_dir>/<lang>/`.
    pub fn resolve(&self, lang: &str) -> Result<PaddleModels, OcrError> {
        validate_language(lang)?;

        let lang_dir = self.model_dir.join(lang);
        Ok(PaddleModels {
            det_model: self
                .det_model
                .clone()
                .unwrap_or_else(|| self.model_dir.join("det.onnx")),
            rec_model: self
                .rec_model
                .clone()
                .unwrap_or_else(|| lang_dir.join("rec.onnx")),
            dict_path: self
                .dict_path
                .clone()
                .unwrap_or_else(|| lang_dir.join("dict.txt")),
        })
    }
}

/// Language codes become path components, so keep them to a safe alphabet
fn validate_language(lang: &str) -> Result<(), OcrError> {
    if lang.is_empty() || lang.len() > 20 {
        return Err(OcrError::InvalidLanguage(format!(
            "invalid language code length: {:?}",
            lang
        )));
    }
    if let Some(c) = lang
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-')
    {
        return Err(OcrError::InvalidLanguage(format!(
            "invalid character {:?} in language code {:?}",
            c, lang
        )));
    }
    Ok(())
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                var,
                reason: e.to_string(),
                value,
            }),
    }
}
