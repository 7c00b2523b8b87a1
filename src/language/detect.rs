use tracing::debug;
use whatlang::Detector;

use crate::error::{Result, CeviriError};
use super::{lookup, resolve_tag, Language, DEFAULT_LANGUAGE_CODE};

/// Identifies the language of a text sample
#[cfg_attr(test, mockall::automock)]
pub trait LanguageDetector: Send + Sync {
    /// Return an ISO 639-1 code where one is known, otherwise ISO 639-3
    fn detect(&self, text: &str) -> Result<String>;
}

/// Trigram-based detector backed by whatlang
pub struct WhatlangDetector {
    detector: Detector,
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self {
            detector: Detector::new(),
        }
    }
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> Result<String> {
        let info = self
            .detector
            .detect(text)
            .ok_or_else(|| CeviriError::Detection("no language identified".to_string()))?;

        let iso639_3 = info.lang().code();
        debug!(
            "whatlang: {} (confidence {:.2}, reliable: {})",
            iso639_3,
            info.confidence(),
            info.is_reliable()
        );

        Ok(lookup(iso639_3)
            .map(|l| l.code.to_string())
            .unwrap_or_else(|| iso639_3.to_string()))
    }
}

/// Detect the source language from the first `prefix_chars` characters and
/// resolve it through the tag table. Any detection failure yields English.
pub fn detect_language(
    detector: &dyn LanguageDetector,
    text: &str,
    prefix_chars: usize,
) -> &'static Language {
    let prefix = char_prefix(text, prefix_chars);

    let code = match detector.detect(prefix) {
        Ok(code) => code,
        Err(e) => {
            debug!("Language detection failed, defaulting to {}: {}", DEFAULT_LANGUAGE_CODE, e);
            DEFAULT_LANGUAGE_CODE.to_string()
        }
    };

    let language = resolve_tag(&code);
    debug!("Detected '{}' -> {}", code, language.tag);
    language
}

fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
