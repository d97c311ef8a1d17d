//! Rendering and writing of OCR results

use std::path::Path;

use crate::error::Result;
use crate::ocr::{DocumentContent, OcrDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Render a document as plain text or pretty-printed JSON
pub fn render(document: &OcrDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(document)?),
        OutputFormat::Text => Ok(match &document.content {
            DocumentContent::Image { text } => text.clone(),
            DocumentContent::Pdf { pages, .. } => pages
                .iter()
                .map(|page| format!("=== Page {} ===\n{}", page.page, page.text))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }),
    }
}

/// Write rendered output to `path`, or print it to stdout
pub async fn emit(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            tokio::fs::write(path, rendered).await?;
            tracing::info!("Output saved to: {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrMode, PageText};

    fn pdf_document() -> OcrDocument {
        OcrDocument::pdf(
            "contract.pdf".to_string(),
            OcrMode::Deepseek,
            vec![
                PageText { page: 1, text: "Article 1".to_string() },
                PageText { page: 2, text: "Article 2".to_string() },
            ],
        )
    }

    #[test]
    fn test_image_text_is_raw() {
        let doc = OcrDocument::image("a.png".to_string(), OcrMode::Paddle, "line 1\nline 2".to_string());
        assert_eq!(render(&doc, OutputFormat::Text).unwrap(), "line 1\nline 2");
    }

    #[test]
    fn test_pdf_text_has_page_headers() {
        assert_eq!(
            render(&pdf_document(), OutputFormat::Text).unwrap(),
            "=== Page 1 ===\nArticle 1\n\n=== Page 2 ===\nArticle 2"
        );
    }

    #[test]
    fn test_empty_pdf_text() {
        let doc = OcrDocument::pdf("empty.pdf".to_string(), OcrMode::Deepseek, Vec::new());
        assert_eq!(render(&doc, OutputFormat::Text).unwrap(), "");
    }

    #[test]
    fn test_json_is_pretty_and_ordered() {
        let rendered = render(&pdf_document(), OutputFormat::Json).unwrap();
        assert!(rendered.starts_with("{\n  \"source\": \"contract.pdf\",\n  \"type\": \"pdf\",\n  \"mode\": \"deepseek\",\n  \"total_pages\": 2,"));

        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["pages"][0]["text"], "Article 1");
    }

    #[test]
    fn test_json_keeps_unicode() {
        let doc = OcrDocument::image("票据.png".to_string(), OcrMode::Deepseek, "提取表格".to_string());
        let rendered = render(&doc, OutputFormat::Json).unwrap();
        assert!(rendered.contains("\"text\": \"提取表格\""));
        assert!(rendered.contains("票据.png"));
    }

    #[tokio::test]
    async fn test_emit_writes_file_verbatim() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("result.txt");

        emit("no trailing newline", Some(&path)).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "no trailing newline");
    }
}
