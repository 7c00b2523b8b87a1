use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::language::LANGUAGES;
use crate::metrics::MetricKind;
use crate::services::ServiceStatus;
use crate::workflow::TranslationOutcome;

pub const EMPTY_SOURCE_HINT: &str = "Please enter some text to translate.";
pub const NO_REFERENCE_HINT: &str = "Add a reference translation to compute quality metrics.";

#[derive(Debug, Serialize)]
pub struct DisplayScores {
    pub bleu: String,
    pub bertscore: String,
    pub comet: String,
}

/// JSON view of one request
#[derive(Debug, Serialize)]
pub struct TranslationReport<'a> {
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: &'a TranslationOutcome,
    pub display: DisplayScores,
}

impl<'a> TranslationReport<'a> {
    pub fn new(outcome: &'a TranslationOutcome) -> Self {
        let [bleu, bertscore, comet] = outcome.scores.formatted();
        Self {
            generated_at: Utc::now(),
            outcome,
            display: DisplayScores { bleu, bertscore, comet },
        }
    }
}

/// Plain-text rendering for the terminal
pub fn render_text(outcome: &TranslationOutcome) -> String {
    if outcome.translation.is_empty() {
        return format!("{}\n", EMPTY_SOURCE_HINT);
    }

    let mut out = String::new();

    if let Some(language) = outcome.source_language {
        out.push_str(&format!("Source language: {} ({})\n\n", language.name, language.tag));
    }

    out.push_str("Model translation:\n");
    out.push_str(&outcome.translation);
    out.push_str("\n\n");

    if outcome.scores.is_computed() {
        for kind in MetricKind::ALL {
            out.push_str(&format!("{:<14} {:>8}\n", kind.label(), outcome.scores.get(kind).to_string()));
        }
    } else {
        out.push_str(NO_REFERENCE_HINT);
        out.push('\n');
    }

    out
}

/// Table of supported languages and their model tags
pub fn render_languages() -> String {
    let mut out = format!("{:<6} {:<6} {:<10} {}\n", "Code", "ISO3", "Tag", "Name");
    out.push_str(&"-".repeat(40));
    out.push('\n');
    for language in LANGUAGES {
        out.push_str(&format!(
            "{:<6} {:<6} {:<10} {}\n",
            language.code, language.iso639_3, language.tag, language.name
        ));
    }
    out
}

/// Status table printed by `ceviri check`, with the error under each failed row
pub fn render_service_check(statuses: &[ServiceStatus]) -> String {
    let mut out = format!("\n{:<45} {:<10}\n", "Service", "Status");
    out.push_str(&"-".repeat(56));
    out.push('\n');

    for status in statuses {
        out.push_str(&format!("{:<45} {:<10}\n", status.name, status.label()));
        if let Some(error) = &status.error {
            out.push_str(&format!("  {}\n", error));
        }
    }
    out
}
