//! PDF rasterization through poppler's `pdftoppm`

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tempfile::TempDir;
use tokio::process::Command;

use super::PdfError;
use crate::config::PdfConfig;

/// File name prefix handed to pdftoppm; pages come back as `page-<n>.png`
const PAGE_PREFIX: &str = "page";

/// Rendered page images of one PDF
///
/// The images live in a private temporary directory that is removed when
/// this value is dropped.
#[derive(Debug)]
pub struct RasterizedPdf {
    dir: TempDir,
    pages: Vec<PathBuf>,
}

impl RasterizedPdf {
    /// Page images in page order
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Converts PDF pages to PNG images with an external tool
#[derive(Debug, Clone)]
pub struct PdfRasterizer {
    config: PdfConfig,
}

impl PdfRasterizer {
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    pub fn dpi(&self) -> u32 {
        self.config.dpi
    }

    /// Render every page of `pdf_path` to PNG
    pub async fn rasterize(&self, pdf_path: &Path) -> Result<RasterizedPdf, PdfError> {
        let dir = tempfile::Builder::new().prefix("ocr-skill-").tempdir()?;
        let prefix = dir.path().join(PAGE_PREFIX);

        tracing::debug!(
            tool = %self.config.pdftoppm_path.display(),
            dpi = self.config.dpi,
            "Rasterizing {}",
            pdf_path.display()
        );

        let output = Command::new(&self.config.pdftoppm_path)
            .arg("-r")
            .arg(self.config.dpi.to_string())
            .arg("-png")
            .arg(tool_path_arg(pdf_path))
            .arg(&prefix)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PdfError::RasterizeFailed(if stderr.is_empty() {
                format!("pdftoppm exited with {}", output.status)
            } else {
                stderr
            }));
        }

        let pages = collect_pages(dir.path(), PAGE_PREFIX).await?;
        for index in 0..pages.len() {
            tracing::info!("Converted page {}/{}", index + 1, pages.len());
        }

        Ok(RasterizedPdf { dir, pages })
    }

    /// Version banner of the rasterizer, e.g. `pdftoppm version 24.02.0`
    pub async fn version(&self) -> Result<String, PdfError> {
        let output = Command::new(&self.config.pdftoppm_path)
            .arg("-v")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        // pdftoppm prints its banner on stderr
        let banner = if output.stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            String::from_utf8_lossy(&output.stderr).into_owned()
        };

        Ok(banner
            .lines()
            .next()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .unwrap_or_else(|| "installed".to_string()))
    }

    fn spawn_error(&self, e: std::io::Error) -> PdfError {
        if e.kind() == std::io::ErrorKind::NotFound {
            PdfError::ToolNotFound(self.config.pdftoppm_path.display().to_string())
        } else {
            PdfError::Io(e)
        }
    }
}

/// Keep relative paths such as `-r.pdf` from being parsed as options
fn tool_path_arg(path: &Path) -> PathBuf {
    if path.as_os_str().to_string_lossy().starts_with('-') {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

/// Find `<prefix>-<n>.png` files and order them by page number
///
/// pdftoppm zero-pads the number to the width of the page count, so the
/// number is parsed rather than relying on lexical order.
async fn collect_pages(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, PdfError> {
    let mut numbered = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(page) = page_number(name, prefix) {
            numbered.push((page, entry.path()));
        }
    }

    numbered.sort_by_key(|(page, _)| *page);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

fn page_number(file_name: &str, prefix: &str) -> Option<usize> {
    let digits = file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(".png")?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
