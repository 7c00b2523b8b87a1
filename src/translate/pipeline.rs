use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, CeviriError};
use crate::language::resolve_tag;
use super::{TranslationRequest, Translator};

#[derive(Debug, Serialize)]
struct PipelineRequest<'a> {
    inputs: &'a str,
    parameters: PipelineParameters<'a>,
}

#[derive(Debug, Serialize)]
struct PipelineParameters<'a> {
    max_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    src_lang: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tgt_lang: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PipelineCandidate {
    translation_text: String,
}

/// Translator speaking to a `translation` pipeline behind an inference endpoint
pub struct PipelineTranslator {
    client: Client,
    config: TranslateConfig,
}

impl PipelineTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl Translator for PipelineTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        // Explicit tags are only sent once the source language is known
        let (src_lang, tgt_lang) = match request.source {
            Some(source) => (Some(source.tag), Some(request.target.tag)),
            None => (None, None),
        };

        let body = PipelineRequest {
            inputs: &request.text,
            parameters: PipelineParameters {
                max_length: self.config.max_length,
                src_lang,
                tgt_lang,
            },
        };

        let url = self.url();
        debug!("Sending translation request to: {}", url);

        let mut builder = self.client.post(&url).json(&body);
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CeviriError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CeviriError::Translation(format!(
                "Inference endpoint error {}: {}", status, error_text
            )));
        }

        let candidates: Vec<PipelineCandidate> = response.json().await
            .map_err(|e| CeviriError::Translation(format!("Failed to parse response: {}", e)))?;

        let translation = candidates
            .into_iter()
            .next()
            .map(|c| c.translation_text.trim().to_string())
            .ok_or_else(|| CeviriError::Translation("No translation candidates returned".to_string()))?;

        if translation.is_empty() {
            return Err(CeviriError::Translation("Empty translation received".to_string()));
        }

        Ok(translation)
    }

    async fn check_availability(&self) -> Result<()> {
        let probe = TranslationRequest {
            text: "Hello".to_string(),
            source: None,
            target: resolve_tag(&self.config.target_language),
        };
        self.translate(&probe).await.map(|_| ())
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}
