use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::language::{detect_language, Language};
use crate::metrics::{MetricKind, ScoreSet, ScoreValue, ScoringSample};
use crate::services::{target_language, Services};
use crate::translate::TranslationRequest;

/// Per-request settings derived from the configuration
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub target: &'static Language,
    /// Characters of source text handed to the language detector
    pub prefix_chars: usize,
}

impl WorkflowOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            target: target_language(config)?,
            prefix_chars: config.detect.prefix_chars,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslationOutcome {
    pub request_id: Uuid,
    pub translation: String,
    /// Detected source language, when detection is enabled
    pub source_language: Option<&'static Language>,
    pub scores: ScoreSet,
}

impl TranslationOutcome {
    fn empty(request_id: Uuid) -> Self {
        Self {
            request_id,
            translation: String::new(),
            source_language: None,
            scores: ScoreSet::not_computed(),
        }
    }
}

/// Load the services for `config` and run one request.
///
/// Blank source returns the empty outcome before any service is constructed or
/// probed, so it succeeds even when the endpoints are down.
pub async fn run_translation(config: &Config, source: &str, reference: &str) -> Result<TranslationOutcome> {
    if source.trim().is_empty() {
        debug!("Empty source text, skipping service load");
        return Ok(TranslationOutcome::empty(Uuid::new_v4()));
    }

    let services = Services::load(config).await?;
    let options = WorkflowOptions::from_config(config)?;
    translate_and_score(&services, &options, source, reference).await
}

/// Translate `source` and, when a reference is given, score the translation.
///
/// Blank source returns an empty outcome without touching any service. A blank
/// reference skips scoring. Each metric failure is isolated: the failing metric
/// reads as unavailable and the others still run.
pub async fn translate_and_score(
    services: &Services,
    options: &WorkflowOptions,
    source: &str,
    reference: &str,
) -> Result<TranslationOutcome> {
    let request_id = Uuid::new_v4();
    let span = info_span!("request", id = %request_id);

    run(services, options, source.trim(), reference.trim(), request_id)
        .instrument(span)
        .await
}

async fn run(
    services: &Services,
    options: &WorkflowOptions,
    source: &str,
    reference: &str,
    request_id: Uuid,
) -> Result<TranslationOutcome> {
    if source.is_empty() {
        debug!("Empty source text, nothing to translate");
        return Ok(TranslationOutcome::empty(request_id));
    }

    let source_language = services
        .detector
        .as_deref()
        .map(|detector| detect_language(detector, source, options.prefix_chars));

    if let Some(language) = source_language {
        info!("Source language: {} ({})", language.name, language.tag);
    }

    let request = TranslationRequest {
        text: source.to_string(),
        source: source_language,
        target: options.target,
    };

    info!(
        "Translating {} chars to {} via {}",
        source.chars().count(),
        options.target.name,
        services.translator.name()
    );
    let translation = services.translator.translate(&request).await?;
    info!("Translation: {}", translation);

    let scores = if reference.is_empty() {
        debug!("No reference supplied, skipping scoring");
        ScoreSet::not_computed()
    } else {
        let sample = ScoringSample {
            prediction: translation.clone(),
            reference: reference.to_string(),
            source: source.to_string(),
        };
        score(services, &sample).await
    };

    Ok(TranslationOutcome {
        request_id,
        translation,
        source_language,
        scores,
    })
}

async fn score(services: &Services, sample: &ScoringSample) -> ScoreSet {
    let mut scores = ScoreSet::not_computed();

    for kind in MetricKind::ALL {
        let value = match services.metrics.get(kind) {
            None => ScoreValue::Unavailable,
            Some(metric) => match metric.compute(sample).await {
                Ok(score) => {
                    info!("{}: {:.2}", kind, score);
                    ScoreValue::Computed(score)
                }
                Err(e) => {
                    warn!("{} failed: {}", kind, e);
                    ScoreValue::Unavailable
                }
            },
        };
        scores.set(kind, value);
    }

    scores
}
