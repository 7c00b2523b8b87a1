use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, CeviriError};
use crate::language;

fn default_max_length() -> usize {
    512
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_metrics_timeout_secs() -> u64 {
    600
}

fn default_prefix_chars() -> usize {
    200
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub translate: TranslateConfig,
    #[serde(default)]
    pub detect: DetectConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Which inference server speaks for the translation model
    pub backend: TranslatorBackend,
    /// Base URL of the inference server
    pub endpoint: String,
    /// Model identifier (e.g. "Helsinki-NLP/opus-mt-mul-tr" or an Ollama tag)
    pub model: String,
    /// Bearer token for hosted inference endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// ISO 639-1 code of the language to translate into
    pub target_language: String,
    /// Whether to detect the source language before translating
    pub language_mode: LanguageMode,
    /// Maximum generated length forwarded to the pipeline backend
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslatorBackend {
    /// Pipeline: Hugging Face style `POST /models/{model}` inference endpoint
    Pipeline,
    /// Ollama: local LLM server prompted to translate
    Ollama,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageMode {
    /// Fixed: send only the text, the model infers the source language
    Fixed,
    /// Detect: identify the source language and pass explicit language tags
    Detect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Number of leading characters handed to the language identifier
    #[serde(default = "default_prefix_chars")]
    pub prefix_chars: usize,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            prefix_chars: default_prefix_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Base URL of the metric-compute service (BERTScore, COMET)
    pub endpoint: String,
    /// HTTP request timeout in seconds
    #[serde(default = "default_metrics_timeout_secs")]
    pub timeout_secs: u64,
    pub bleu: BleuConfig,
    pub bertscore: RemoteMetricConfig,
    pub comet: RemoteMetricConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BleuConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Lowercase hypothesis and reference before scoring
    #[serde(default)]
    pub lowercase: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteMetricConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Model forwarded to the metric service; the service default is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translate: TranslateConfig {
                backend: TranslatorBackend::Pipeline,
                endpoint: "http://localhost:8080".to_string(),
                model: "Helsinki-NLP/opus-mt-mul-tr".to_string(),
                api_token: None,
                target_language: "tr".to_string(),
                language_mode: LanguageMode::Fixed,
                max_length: default_max_length(),
                timeout_secs: default_timeout_secs(),
            },
            detect: DetectConfig::default(),
            metrics: MetricsConfig {
                endpoint: "http://localhost:8090".to_string(),
                timeout_secs: default_metrics_timeout_secs(),
                bleu: BleuConfig {
                    enabled: true,
                    lowercase: false,
                },
                bertscore: RemoteMetricConfig {
                    enabled: true,
                    model: None,
                },
                comet: RemoteMetricConfig {
                    enabled: true,
                    model: Some("Unbabel/wmt22-comet-da".to_string()),
                },
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CeviriError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CeviriError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CeviriError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CeviriError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| CeviriError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Write the default configuration, refusing to replace an existing file unless `force` is set
    pub fn write_default<P: AsRef<Path>>(path: P, force: bool) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !force {
            return Err(CeviriError::Config(format!(
                "{} already exists. Use --force to overwrite",
                path.display()
            )));
        }

        Self::default().save_to_file(path)
    }

    /// Reject settings the services cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.translate.endpoint.trim().is_empty() {
            return Err(CeviriError::Config("translate.endpoint must not be empty".to_string()));
        }

        if self.translate.model.trim().is_empty() {
            return Err(CeviriError::Config("translate.model must not be empty".to_string()));
        }

        if language::lookup(&self.translate.target_language).is_none() {
            return Err(CeviriError::Config(format!(
                "Unsupported target language '{}'. Run `ceviri languages` for the list",
                self.translate.target_language
            )));
        }

        if self.detect.prefix_chars == 0 {
            return Err(CeviriError::Config("detect.prefix_chars must be greater than 0".to_string()));
        }

        let remote_enabled = self.metrics.bertscore.enabled || self.metrics.comet.enabled;
        if remote_enabled && self.metrics.endpoint.trim().is_empty() {
            return Err(CeviriError::Config(
                "metrics.endpoint must be set when BERTScore or COMET is enabled".to_string(),
            ));
        }

        Ok(())
    }
}
