// Translation backends
//
// Two ways to reach a translation model:
// - Pipeline: Hugging Face style inference endpoint returning translation_text
// - Ollama: general-purpose LLM prompted to translate

pub mod pipeline;
pub mod ollama;

use async_trait::async_trait;

use crate::config::{TranslateConfig, TranslatorBackend};
use crate::error::Result;
use crate::language::Language;

/// A single translation job
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub text: String,
    /// Source language, only set when it was detected
    pub source: Option<&'static Language>,
    pub target: &'static Language,
}

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate the request text, returning the first candidate produced
    async fn translate(&self, request: &TranslationRequest) -> Result<String>;

    /// Check that the backend is reachable and serves the configured model
    async fn check_availability(&self) -> Result<()>;

    /// Backend name for logs and listings
    fn name(&self) -> &'static str;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator for the configured backend
    pub fn create_translator(config: TranslateConfig) -> Result<Box<dyn Translator>> {
        let translator: Box<dyn Translator> = match config.backend {
            TranslatorBackend::Pipeline => Box::new(pipeline::PipelineTranslator::new(config)?),
            TranslatorBackend::Ollama => Box::new(ollama::OllamaTranslator::new(config)?),
        };
        Ok(translator)
    }
}
