//! OCR Providers
//!
//! Defines the provider trait and implementations for the two OCR backends.

use std::time::Duration;

use async_trait::async_trait;

use super::normalize;
use super::types::{OcrError, OcrMode, DEFAULT_PROMPT};
use crate::config::OllamaConfig;

/// OCR provider trait
#[async_trait]
pub trait OcrProviderTrait: Send + Sync {
    /// Get the backend this provider talks to
    fn mode(&self) -> OcrMode;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Perform OCR on an encoded image (PNG, JPEG, ...)
    async fn recognize(&self, image_data: &[u8]) -> Result<String, OcrError>;
}

/// Ollama vision model provider (DeepSeek-OCR by default)
pub struct OllamaProvider {
    client: reqwest::Client,
    /// Ollama API URL
    base_url: String,
    /// Model name (e.g., "deepseek-ocr", "llava")
    model: String,
    prompt: String,
    timeout_secs: u64,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig, prompt: Option<&str>) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            prompt: prompt.unwrap_or(DEFAULT_PROMPT).to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    fn transport_error(&self, e: reqwest::Error) -> OcrError {
        if e.is_timeout() {
            OcrError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            OcrError::ConnectionFailed(self.base_url.clone())
        } else {
            OcrError::ApiError(format!("Failed to call Ollama: {}", e))
        }
    }
}

#[async_trait]
impl OcrProviderTrait for OllamaProvider {
    fn mode(&self) -> OcrMode {
        OcrMode::Deepseek
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn recognize(&self, image_data: &[u8]) -> Result<String, OcrError> {
        use base64::Engine;

        let url = format!("{}/api/chat", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_data);

        let request = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": self.prompt,
                "images": [image_base64]
            }],
            "stream": false
        });

        tracing::debug!(model = %self.model, bytes = image_data.len(), "Sending image to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                OcrError::Timeout(self.timeout_secs)
            } else {
                OcrError::ApiError(format!("Failed to parse response: {}", e))
            }
        })?;

        Ok(normalize::vlm_text(&result))
    }
}

/// PaddleOCR provider running ONNX models in-process
#[cfg(feature = "paddle")]
pub struct PaddleProvider {
    models: crate::config::PaddleModels,
    pipeline: tokio::sync::OnceCell<std::sync::Arc<oar_ocr::oarocr::OAROCR>>,
}

#[cfg(feature = "paddle")]
impl PaddleProvider {
    pub fn new(models: crate::config::PaddleModels) -> Self {
        Self {
            models,
            pipeline: tokio::sync::OnceCell::new(),
        }
    }

    /// Build the pipeline on first use and reuse it for later pages
    async fn pipeline(&self) -> Result<std::sync::Arc<oar_ocr::oarocr::OAROCR>, OcrError> {
        use oar_ocr::oarocr::OAROCRBuilder;

        self.pipeline
            .get_or_try_init(|| async {
                if let Some(path) = self.models.missing().first() {
                    return Err(OcrError::ProviderNotAvailable(format!(
                        "PaddleOCR model file not found: {}",
                        path.display()
                    )));
                }

                tracing::info!("Initializing PaddleOCR (first run loads models)...");
                let models = self.models.clone();
                let ocr = tokio::task::spawn_blocking(move || {
                    OAROCRBuilder::new(models.det_model, models.rec_model, models.dict_path).build()
                })
                .await
                .map_err(|e| OcrError::ProcessingError(format!("PaddleOCR init task failed: {}", e)))?
                .map_err(|e| {
                    OcrError::ProviderNotAvailable(format!("Failed to load PaddleOCR models: {}", e))
                })?;

                Ok(std::sync::Arc::new(ocr))
            })
            .await
            .cloned()
    }
}

#[cfg(feature = "paddle")]
#[async_trait]
impl OcrProviderTrait for PaddleProvider {
    fn mode(&self) -> OcrMode {
        OcrMode::Paddle
    }

    async fn is_available(&self) -> bool {
        self.models.missing().is_empty()
    }

    async fn recognize(&self, image_data: &[u8]) -> Result<String, OcrError> {
        let image = image::load_from_memory(image_data)
            .map_err(|e| OcrError::ImageLoad(format!("Failed to decode image: {}", e)))?
            .to_rgb8();

        let ocr = self.pipeline().await?;
        let results = tokio::task::spawn_blocking(move || ocr.predict(vec![image]))
            .await
            .map_err(|e| OcrError::ProcessingError(format!("PaddleOCR task failed: {}", e)))?
            .map_err(|e| OcrError::ProcessingError(e.to_string()))?;

        let Some(result) = results.into_iter().next() else {
            return Ok(String::new());
        };

        Ok(normalize::join_lines(
            result.text_regions.iter().map(|region| region.text.as_deref()),
        ))
    }
}

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub mode: OcrMode,
    pub available: bool,
    pub calls: std::sync::atomic::AtomicUsize,
    /// Fail on this call number (1-indexed)
    pub fail_on: Option<usize>,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(mode: OcrMode) -> Self {
        Self {
            mode,
            available: true,
            calls: std::sync::atomic::AtomicUsize::new(0),
            fail_on: None,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrProviderTrait for MockProvider {
    fn mode(&self) -> OcrMode {
        self.mode
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn recognize(&self, image_data: &[u8]) -> Result<String, OcrError> {
        let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        if self.fail_on == Some(call) {
            return Err(OcrError::ProcessingError(format!("mock failure on call {}", call)));
        }
        Ok(format!("call {}: {} bytes", call, image_data.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_mock_ollama, MockOllama};

    fn ollama_config(base_url: &str) -> OllamaConfig {
        OllamaConfig {
            base_url: base_url.to_string(),
            model: "deepseek-ocr".to_string(),
            timeout_secs: 5,
            binary: "ollama".into(),
        }
    }

    #[tokio::test]
    async fn test_recognize_sends_chat_request() {
        let mock = spawn_mock_ollama(MockOllama::reply("Hello OCR Test")).await;
        let provider = OllamaProvider::new(&ollama_config(&mock.base_url), None).unwrap();

        let text = provider.recognize(b"fake-png").await.unwrap();
        assert_eq!(text, "Hello OCR Test");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let body = &requests[0];
        assert_eq!(body["model"], "deepseek-ocr");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], DEFAULT_PROMPT);
        // base64("fake-png")
        assert_eq!(body["messages"][0]["images"][0], "ZmFrZS1wbmc=");
    }

    #[tokio::test]
    async fn test_custom_prompt_is_forwarded() {
        let mock = spawn_mock_ollama(MockOllama::reply("| a | b |")).await;
        let provider = OllamaProvider::new(
            &ollama_config(&mock.base_url),
            Some("Extract the table as markdown"),
        )
        .unwrap();

        provider.recognize(b"img").await.unwrap();
        assert_eq!(
            mock.requests()[0]["messages"][0]["content"],
            "Extract the table as markdown"
        );
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let mock = spawn_mock_ollama(MockOllama::status(404, "model \"deepseek-ocr\" not found")).await;
        let provider = OllamaProvider::new(&ollama_config(&mock.base_url), None).unwrap();

        match provider.recognize(b"img").await {
            Err(OcrError::ApiError(message)) => {
                assert!(message.contains("404"));
                assert!(message.contains("not found"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let provider =
            OllamaProvider::new(&ollama_config(&format!("http://127.0.0.1:{}", port)), None).unwrap();

        assert!(!provider.is_available().await);
        assert!(matches!(
            provider.recognize(b"img").await,
            Err(OcrError::ConnectionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_is_available_checks_tags() {
        let mock = spawn_mock_ollama(MockOllama::reply("unused")).await;
        let provider = OllamaProvider::new(&ollama_config(&mock.base_url), None).unwrap();
        assert!(provider.is_available().await);
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let mock = spawn_mock_ollama(MockOllama::reply("ok")).await;
        let provider =
            OllamaProvider::new(&ollama_config(&format!("{}/", mock.base_url)), None).unwrap();

        assert_eq!(provider.base_url(), mock.base_url);
        assert_eq!(provider.recognize(b"img").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_generate_shape_reply() {
        let mock = spawn_mock_ollama(MockOllama::raw(serde_json::json!({
            "model": "deepseek-ocr",
            "response": "from generate",
            "done": true
        })))
        .await;
        let provider = OllamaProvider::new(&ollama_config(&mock.base_url), None).unwrap();

        assert_eq!(provider.recognize(b"img").await.unwrap(), "from generate");
    }

    #[tokio::test]
    async fn test_non_json_body_is_api_error() {
        let mock = spawn_mock_ollama(MockOllama::text_body("<html>proxy login</html>")).await;
        let provider = OllamaProvider::new(&ollama_config(&mock.base_url), None).unwrap();

        match provider.recognize(b"img").await {
            Err(OcrError::ApiError(message)) => assert!(message.starts_with("Failed to parse response")),
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        // Accept connections and hold them without ever answering
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let mut config = ollama_config(&format!("http://{}", addr));
        config.timeout_secs = 1;
        let provider = OllamaProvider::new(&config, None).unwrap();

        assert!(matches!(
            provider.recognize(b"img").await,
            Err(OcrError::Timeout(1))
        ));
    }
}
