use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::config::TranslateConfig;
use crate::error::{Result, CeviriError};
use super::{TranslationRequest, Translator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
}

/// Translator prompting a model served by Ollama
pub struct OllamaTranslator {
    client: Client,
    config: TranslateConfig,
}

impl OllamaTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }

    /// Build translation prompt asking for a JSON reply
    fn build_translation_prompt(&self, request: &TranslationRequest) -> String {
        let target = request.target;
        let source_line = match request.source {
            Some(source) => format!("The source language is: {}\n", source.name),
            None => String::new(),
        };

        format!(
            "You are a professional translator.\n\
             \n\
             CRITICAL: You must translate the text to {} ONLY. Do not translate to any other language.\n\
             The target language is: {} (language code: {})\n\
             {}\
             \n\
             Return ONLY the translation in JSON format as {{\"text\":\"your {} translation here\"}}.\n\
             Do not include any explanations, alternatives, or text in other languages.\n\
             \n\
             [Text to translate]\n\
             {}\n",
            target.name, target.name, target.code, source_line, target.name, request.text
        )
    }
}

/// Pull the translation out of a reply that ignored the JSON instruction
fn clean_translation_response(response: &str) -> String {
    let lines: Vec<&str> = response.lines().collect();

    for &line in &lines {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("Here is") ||
           trimmed.starts_with("Here are") ||
           trimmed.starts_with("Option") ||
           trimmed.starts_with("**Option") ||
           trimmed.starts_with("Translation:") ||
           trimmed.starts_with("- ") ||
           trimmed.starts_with("* ") {
            continue;
        }

        if trimmed.starts_with("**") && trimmed.ends_with("**") {
            continue;
        }

        if trimmed.chars().count() > 3 {
            return trimmed.to_string();
        }
    }

    lines
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .unwrap_or(response)
        .to_string()
}

#[async_trait]
impl Translator for OllamaTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let body = GenerateRequest {
            model: self.config.model.clone(),
            prompt: self.build_translation_prompt(request),
            stream: false,
            format: "json".to_string(),
        };

        let url = format!("{}/api/generate", self.endpoint());
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CeviriError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CeviriError::Translation(format!(
                "Ollama API error {}: {}", status, error_text
            )));
        }

        let generated: GenerateResponse = response.json().await
            .map_err(|e| CeviriError::Translation(format!("Failed to parse response: {}", e)))?;

        let raw_response = generated.response.trim();
        debug!("Raw Ollama response: {}", raw_response);

        if raw_response.is_empty() {
            return Err(CeviriError::Translation("Empty translation received".to_string()));
        }

        if let Ok(result) = serde_json::from_str::<TranslationResult>(raw_response) {
            let text = result.text.trim();
            if text.is_empty() {
                return Err(CeviriError::Translation("Empty translation received".to_string()));
            }
            return Ok(text.to_string());
        }

        Ok(clean_translation_response(raw_response))
    }

    async fn check_availability(&self) -> Result<()> {
        let url = format!("{}/api/show", self.endpoint());

        let response = self.client
            .post(&url)
            .json(&json!({ "name": self.config.model }))
            .send()
            .await
            .map_err(|e| CeviriError::Translation(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            info!("Ollama model '{}' is available", self.config.model);
            Ok(())
        } else {
            Err(CeviriError::Translation(format!(
                "Ollama model '{}' not found. Please pull the model first: ollama pull {}",
                self.config.model, self.config.model
            )))
        }
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, TranslatorBackend};
    use crate::language::resolve_tag;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn translator_for(server: &MockServer) -> OllamaTranslator {
        let mut config = Config::default().translate;
        config.backend = TranslatorBackend::Ollama;
        config.endpoint = server.uri();
        config.model = "llama3.2:3b".to_string();
        OllamaTranslator::new(config).unwrap()
    }

    fn request(source: Option<&'static crate::language::Language>) -> TranslationRequest {
        TranslationRequest {
            text: "Hello, how are you?".to_string(),
            source,
            target: resolve_tag("tr"),
        }
    }

    #[test]
    fn test_prompt_names_target_and_detected_source() {
        let translator = OllamaTranslator::new(Config::default().translate).unwrap();

        let prompt = translator.build_translation_prompt(&request(Some(resolve_tag("en"))));
        assert!(prompt.contains("translate the text to Turkish ONLY"));
        assert!(prompt.contains("(language code: tr)"));
        assert!(prompt.contains("The source language is: English"));
        assert!(prompt.contains("Hello, how are you?"));

        let prompt = translator.build_translation_prompt(&request(None));
        assert!(!prompt.contains("The source language is"));
    }

    #[test]
    fn test_clean_translation_response_skips_chatter() {
        let raw = "Here is the translation:\n\n**Turkish**\nMerhaba, nasılsın?\n";
        assert_eq!(clean_translation_response(raw), "Merhaba, nasılsın?");
        assert_eq!(clean_translation_response("Evet"), "Evet");
    }

    #[tokio::test]
    async fn test_json_reply_is_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "{\"text\": \"Merhaba, nasılsın?\"}",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let translator = translator_for(&server);
        let translation = translator.translate(&request(None)).await.unwrap();
        assert_eq!(translation, "Merhaba, nasılsın?");
    }

    #[tokio::test]
    async fn test_missing_model_fails_availability_check() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/show"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let translator = translator_for(&server);
        assert!(translator.check_availability().await.is_err());
    }
}
