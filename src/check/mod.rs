//! Environment Check
//!
//! Probes for everything the OCR backends rely on (Ollama, the vision
//! model, PaddleOCR model files, poppler) and reports what is missing.
//!
//! Checks in the core section must pass for smart mode to work. Fast mode
//! and PDF support are optional and only produce warnings.

mod probes;
mod sample;

use std::fmt::Write as _;

use serde::Serialize;

pub use probes::SetupChecker;
pub use sample::sample_png;

const RULE: &str = "=======================================================";

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
}

impl CheckStatus {
    /// Prefix used on the detail line
    fn tag(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "[OK]",
            CheckStatus::Fail => "[FAIL]",
            CheckStatus::Warn => "[WARN]",
        }
    }

    /// Label used in the summary table
    fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warn => "WARN",
        }
    }
}

/// Group a check is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Core,
    FastMode,
    Pdf,
    SmokeTest,
}

impl Section {
    const ORDER: [Section; 4] = [Section::Core, Section::FastMode, Section::Pdf, Section::SmokeTest];

    fn title(&self) -> &'static str {
        match self {
            Section::Core => "Core Requirements (DeepSeek-OCR)",
            Section::FastMode => "Optional: Fast Mode (PaddleOCR)",
            Section::Pdf => "Optional: PDF Support",
            Section::SmokeTest => "Quick DeepSeek-OCR Test",
        }
    }
}

/// A single diagnostic check result
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub section: Section,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

impl CheckResult {
    pub fn pass(section: Section, name: &str, message: impl Into<String>) -> Self {
        Self::new(section, name, CheckStatus::Pass, message)
    }

    pub fn fail(section: Section, name: &str, message: impl Into<String>) -> Self {
        Self::new(section, name, CheckStatus::Fail, message)
    }

    pub fn warn(section: Section, name: &str, message: impl Into<String>) -> Self {
        Self::new(section, name, CheckStatus::Warn, message)
    }

    fn new(section: Section, name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            section,
            status,
            message: message.into(),
            hints: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

/// Complete diagnostic report
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub checks: Vec<CheckResult>,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl CheckReport {
    pub fn new(checks: Vec<CheckResult>) -> Self {
        let count = |status| checks.iter().filter(|c| c.status == status).count();
        let passed = count(CheckStatus::Pass);
        let failed = count(CheckStatus::Fail);
        let warnings = count(CheckStatus::Warn);

        Self {
            checks,
            passed,
            failed,
            warnings,
        }
    }

    /// Ready when nothing failed; warnings are allowed
    pub fn is_ready(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_ready() {
            0
        } else {
            1
        }
    }

    /// Human-readable report, section by section, followed by a summary
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "OCR Skill Environment Check");
        let _ = writeln!(out, "(DeepSeek-OCR + PaddleOCR Dual Mode)");
        let _ = writeln!(out, "{}", RULE);

        for section in Section::ORDER {
            let mut checks = self.checks.iter().filter(|c| c.section == section).peekable();
            if checks.peek().is_none() {
                continue;
            }

            let _ = writeln!(out);
            let _ = writeln!(out, "--- {} ---", section.title());
            for check in checks {
                let _ = writeln!(out, "{} {}", check.status.tag(), check.message);
                for hint in &check.hints {
                    let _ = writeln!(out, "       {}", hint);
                }
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", RULE);
        let _ = writeln!(out, "Summary");
        let _ = writeln!(out, "{}", RULE);
        for check in &self.checks {
            let _ = writeln!(out, "  {}: {}", check.name, check.status.label());
        }
        let _ = writeln!(out);

        if self.is_ready() {
            let _ = writeln!(out, "All core checks passed! OCR Skill is ready.");
            let _ = writeln!(out);
            let _ = writeln!(out, "Quick start:");
            let _ = writeln!(out, "  ocr-skill ocr image.png           # DeepSeek-OCR (smart)");
            let _ = writeln!(out, "  ocr-skill ocr image.png --fast    # PaddleOCR (fast)");
            let _ = writeln!(
                out,
                "  ocr-skill ocr image.png --prompt 'Extract table as markdown'"
            );
        } else {
            let _ = writeln!(
                out,
                "{} check(s) failed. Please fix the issues above.",
                self.failed
            );
        }

        out
    }
}
