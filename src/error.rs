use thiserror::Error;

#[derive(Error, Debug)]
pub enum CeviriError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Metric error ({metric}): {message}")]
    Metric { metric: String, message: String },

    #[error("Language detection error: {0}")]
    Detection(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl CeviriError {
    pub fn metric(metric: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Metric {
            metric: metric.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CeviriError>;
