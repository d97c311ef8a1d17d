//! Individual environment probes

use std::process::Stdio;

use tokio::process::Command;

use super::{sample_png, CheckReport, CheckResult, CheckStatus, Section};
use crate::config::Config;
use crate::ocr::{OcrProviderTrait, OllamaProvider};
use crate::pdf::PdfRasterizer;

/// Runs every environment check against one configuration
pub struct SetupChecker {
    config: Config,
}

impl SetupChecker {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run all checks; the smoke test only runs when the core checks pass
    pub async fn run(&self) -> CheckReport {
        let mut checks = vec![
            self.check_ollama_binary().await,
            self.check_ollama_server().await,
            self.check_model().await,
        ];
        let core_passed = checks.iter().all(|c| c.status == CheckStatus::Pass);

        checks.push(self.check_paddle());
        checks.push(self.check_poppler().await);

        if core_passed {
            checks.push(self.smoke_test().await);
        } else {
            tracing::debug!("Skipping smoke test, core checks failed");
        }

        CheckReport::new(checks)
    }

    /// `ollama --version`
    pub async fn check_ollama_binary(&self) -> CheckResult {
        const NAME: &str = "Ollama Installation";

        let output = Command::new(&self.config.ollama.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
                let version = if stdout.is_empty() {
                    String::from_utf8_lossy(&output.stderr).trim().to_string()
                } else {
                    stdout
                };
                CheckResult::pass(Section::Core, NAME, format!("Ollama installed: {}", version))
            }
            _ => CheckResult::fail(Section::Core, NAME, "Ollama not found")
                .with_hint("Install with: brew install ollama (or see https://ollama.com/download)"),
        }
    }

    /// `GET /api/tags` answers
    pub async fn check_ollama_server(&self) -> CheckResult {
        const NAME: &str = "Ollama Server";
        let base_url = &self.config.ollama.base_url;

        let available = match OllamaProvider::new(&self.config.ollama, None) {
            Ok(provider) => provider.is_available().await,
            Err(e) => {
                tracing::warn!("Could not create Ollama client: {}", e);
                false
            }
        };

        if available {
            CheckResult::pass(
                Section::Core,
                NAME,
                format!("Ollama server is running at {}", base_url),
            )
        } else {
            CheckResult::fail(
                Section::Core,
                NAME,
                format!("Ollama server not running at {}", base_url),
            )
            .with_hint("Start with: ollama serve (or brew services start ollama)")
        }
    }

    /// The configured model shows up in `ollama list`
    pub async fn check_model(&self) -> CheckResult {
        const NAME: &str = "DeepSeek-OCR Model";
        let model = &self.config.ollama.model;

        let output = Command::new(&self.config.ollama.binary)
            .arg("list")
            .stdin(Stdio::null())
            .output()
            .await;

        let listing = match output {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                tracing::debug!("ollama list failed ({}): {}", output.status, stderr);
                let mut result = CheckResult::fail(
                    Section::Core,
                    NAME,
                    format!("Could not list models: ollama list exited with {}", output.status),
                );
                if !stderr.is_empty() {
                    result = result.with_hint(stderr);
                }
                return result.with_hint("Start with: ollama serve (or brew services start ollama)");
            }
            Err(e) => {
                return CheckResult::fail(
                    Section::Core,
                    NAME,
                    format!(
                        "Could not list models: cannot run {}: {}",
                        self.config.ollama.binary.display(),
                        e
                    ),
                )
                .with_hint("Install with: brew install ollama (or see https://ollama.com/download)")
            }
        };

        match find_model_line(&listing, model) {
            Some(line) => CheckResult::pass(
                Section::Core,
                NAME,
                format!("Model {} installed: {}", model, line),
            ),
            None => CheckResult::fail(Section::Core, NAME, format!("Model {} not found", model))
                .with_hint(format!("Pull with: ollama pull {}", model)),
        }
    }

    /// PaddleOCR support compiled in and model files on disk
    pub fn check_paddle(&self) -> CheckResult {
        const NAME: &str = "PaddleOCR";
        let paddle = &self.config.paddle;

        if !cfg!(feature = "paddle") {
            return CheckResult::warn(
                Section::FastMode,
                NAME,
                "PaddleOCR support not compiled in (fast mode unavailable)",
            )
            .with_hint("Rebuild with: cargo install ocr-skill --features paddle");
        }

        let models = match paddle.resolve(&paddle.lang) {
            Ok(models) => models,
            Err(e) => return CheckResult::warn(Section::FastMode, NAME, e.to_string()),
        };

        let missing = models.missing();
        if missing.is_empty() {
            CheckResult::pass(
                Section::FastMode,
                NAME,
                format!(
                    "PaddleOCR models found for language '{}' (for fast mode)",
                    paddle.lang
                ),
            )
        } else {
            let mut result = CheckResult::warn(
                Section::FastMode,
                NAME,
                "PaddleOCR model files missing (fast mode unavailable)",
            );
            for path in missing {
                result = result.with_hint(format!("Missing: {}", path.display()));
            }
            result.with_hint("Set PADDLE_MODEL_DIR or PADDLE_DET_MODEL / PADDLE_REC_MODEL / PADDLE_DICT_PATH")
        }
    }

    /// `pdftoppm -v`
    pub async fn check_poppler(&self) -> CheckResult {
        const NAME: &str = "Poppler";

        match PdfRasterizer::new(self.config.pdf.clone()).version().await {
            Ok(version) => CheckResult::pass(Section::Pdf, NAME, format!("Poppler installed: {}", version)),
            Err(e) => {
                tracing::debug!("pdftoppm probe failed: {}", e);
                CheckResult::warn(Section::Pdf, NAME, "Poppler not found (PDF support unavailable)")
                    .with_hint("Install with: brew install poppler (or apt install poppler-utils)")
            }
        }
    }

    /// Send a generated image through the vision model
    pub async fn smoke_test(&self) -> CheckResult {
        const NAME: &str = "DeepSeek-OCR Test";

        let png = match sample_png() {
            Ok(png) => png,
            Err(e) => {
                return CheckResult::fail(
                    Section::SmokeTest,
                    NAME,
                    format!("Could not build test image: {}", e),
                )
            }
        };

        let provider = match OllamaProvider::new(&self.config.ollama, None) {
            Ok(provider) => provider,
            Err(e) => {
                return CheckResult::fail(Section::SmokeTest, NAME, format!("DeepSeek-OCR test failed: {}", e))
            }
        };

        tracing::info!("Calling {}...", self.config.ollama.model);
        match provider.recognize(&png).await {
            Ok(text) if !text.trim().is_empty() => {
                let preview: String = text.trim().chars().take(80).collect();
                CheckResult::pass(
                    Section::SmokeTest,
                    NAME,
                    format!("DeepSeek-OCR test passed. Output: {}...", preview),
                )
            }
            Ok(_) => CheckResult::fail(Section::SmokeTest, NAME, "DeepSeek-OCR returned empty result"),
            Err(e) => CheckResult::fail(Section::SmokeTest, NAME, format!("DeepSeek-OCR test failed: {}", e)),
        }
    }
}

/// First line of an `ollama list` listing that mentions `model`
fn find_model_line(listing: &str, model: &str) -> Option<String> {
    let needle = model.to_lowercase();
    listing
        .lines()
        .find(|line| line.to_lowercase().contains(&needle))
        .map(|line| line.trim().to_string())
}
