use tracing::{info, warn};

use crate::config::{Config, LanguageMode};
use crate::error::{Result, CeviriError};
use crate::language::{self, Language, LanguageDetector, WhatlangDetector};
use crate::metrics::{Bleu, Metric, MetricKind, RemoteMetric};
use crate::translate::{Translator, TranslatorFactory};

/// The three metric slots. An empty slot renders as unavailable.
pub struct MetricSuite {
    pub bleu: Option<Box<dyn Metric>>,
    pub bertscore: Option<Box<dyn Metric>>,
    pub comet: Option<Box<dyn Metric>>,
}

impl MetricSuite {
    pub fn get(&self, kind: MetricKind) -> Option<&dyn Metric> {
        let slot = match kind {
            MetricKind::Bleu => &self.bleu,
            MetricKind::BertScore => &self.bertscore,
            MetricKind::Comet => &self.comet,
        };
        slot.as_deref()
    }
}

/// Everything a request needs, built once at startup and shared read-only
pub struct Services {
    pub translator: Box<dyn Translator>,
    /// Present only when the source language is detected
    pub detector: Option<Box<dyn LanguageDetector>>,
    pub metrics: MetricSuite,
}

impl Services {
    /// Construct and probe all services.
    ///
    /// The translator is built but not probed. BERTScore must be reachable.
    /// COMET is optional: when
    /// its probe fails the slot stays empty and every COMET score reads as
    /// unavailable.
    pub async fn load(config: &Config) -> Result<Self> {
        let target = target_language(config)?;

        info!("Loading translator: {} ({:?})", config.translate.model, config.translate.backend);
        let translator = TranslatorFactory::create_translator(config.translate.clone())?;

        let detector: Option<Box<dyn LanguageDetector>> = match config.translate.language_mode {
            LanguageMode::Detect => {
                info!("Source language detection enabled (prefix: {} chars)", config.detect.prefix_chars);
                Some(Box::new(WhatlangDetector::new()))
            }
            LanguageMode::Fixed => None,
        };

        let bleu: Option<Box<dyn Metric>> = if config.metrics.bleu.enabled {
            Some(Box::new(Bleu::new(config.metrics.bleu.lowercase)))
        } else {
            None
        };

        let bertscore = if config.metrics.bertscore.enabled {
            let metric = RemoteMetric::new(
                MetricKind::BertScore,
                &config.metrics,
                &config.metrics.bertscore,
                target.code,
            )?;
            metric.check_availability().await?;
            Some(Box::new(metric) as Box<dyn Metric>)
        } else {
            None
        };

        let comet = if config.metrics.comet.enabled {
            let metric = RemoteMetric::new(
                MetricKind::Comet,
                &config.metrics,
                &config.metrics.comet,
                target.code,
            )?;
            match metric.check_availability().await {
                Ok(()) => Some(Box::new(metric) as Box<dyn Metric>),
                Err(e) => {
                    warn!("COMET unavailable, scores will read N/A: {}", e);
                    None
                }
            }
        } else {
            None
        };

        info!("Services loaded");

        Ok(Self {
            translator,
            detector,
            metrics: MetricSuite { bleu, bertscore, comet },
        })
    }
}

/// Outcome of probing one service
#[derive(Debug)]
pub struct ServiceStatus {
    pub name: String,
    pub required: bool,
    pub error: Option<String>,
}

impl ServiceStatus {
    fn from_result(name: impl Into<String>, required: bool, result: Result<()>) -> Self {
        Self {
            name: name.into(),
            required,
            error: result.err().map(|e| e.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn label(&self) -> &'static str {
        match (self.is_ok(), self.required) {
            (true, _) => "OK",
            (false, true) => "FAILED",
            (false, false) => "FAILED (optional)",
        }
    }
}

/// True unless some required service failed its probe
pub fn required_services_ok(statuses: &[ServiceStatus]) -> bool {
    statuses.iter().all(|status| status.is_ok() || !status.required)
}

/// Probe every enabled service without failing early
pub async fn check_services(config: &Config) -> Result<Vec<ServiceStatus>> {
    let target = target_language(config)?;
    let mut statuses = Vec::new();

    let translator = TranslatorFactory::create_translator(config.translate.clone())?;
    statuses.push(ServiceStatus::from_result(
        format!("translator ({}: {})", translator.name(), config.translate.model),
        true,
        translator.check_availability().await,
    ));

    let remote = [
        (MetricKind::BertScore, &config.metrics.bertscore, true),
        (MetricKind::Comet, &config.metrics.comet, false),
    ];
    for (kind, metric_config, required) in remote {
        if !metric_config.enabled {
            continue;
        }
        let metric = RemoteMetric::new(kind, &config.metrics, metric_config, target.code)?;
        statuses.push(ServiceStatus::from_result(
            kind.label(),
            required,
            metric.check_availability().await,
        ));
    }

    Ok(statuses)
}

/// Resolve the configured target language through the tag table
pub fn target_language(config: &Config) -> Result<&'static Language> {
    language::lookup(&config.translate.target_language).ok_or_else(|| {
        CeviriError::Config(format!(
            "Unsupported target language '{}'",
            config.translate.target_language
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> Config {
        let mut config = Config::default();
        config.translate.endpoint = server.uri();
        config.metrics.endpoint = server.uri();
        config
    }

    #[tokio::test]
    async fn test_comet_load_failure_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics/bertscore"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics/comet"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let services = Services::load(&config_for(&server)).await.unwrap();
        assert!(services.metrics.get(MetricKind::Bleu).is_some());
        assert!(services.metrics.get(MetricKind::BertScore).is_some());
        assert!(services.metrics.get(MetricKind::Comet).is_none());
        assert!(services.detector.is_none());
    }

    #[tokio::test]
    async fn test_bertscore_load_failure_fails_the_load() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(Services::load(&config_for(&server)).await.is_err());
    }

    #[tokio::test]
    async fn test_disabled_metrics_are_not_probed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.translate.language_mode = LanguageMode::Detect;
        config.metrics.bertscore.enabled = false;
        config.metrics.comet.enabled = false;

        let services = Services::load(&config).await.unwrap();
        assert!(services.detector.is_some());
        assert!(services.metrics.get(MetricKind::Bleu).is_some());
        assert!(services.metrics.get(MetricKind::BertScore).is_none());
        assert!(services.metrics.get(MetricKind::Comet).is_none());
    }

    #[tokio::test]
    async fn test_check_services_reports_each_probe() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/Helsinki-NLP/opus-mt-mul-tr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "translation_text": "Merhaba" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics/bertscore"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics/comet"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let statuses = check_services(&config_for(&server)).await.unwrap();
        assert_eq!(statuses.len(), 3);
        assert!(statuses[0].is_ok() && statuses[0].required);
        assert!(statuses[1].is_ok());
        assert!(!statuses[2].is_ok() && !statuses[2].required);
        assert_eq!(statuses[2].label(), "FAILED (optional)");
        assert!(required_services_ok(&statuses));
    }

    #[tokio::test]
    async fn test_failed_bertscore_fails_the_check() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "translation_text": "Merhaba" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/metrics/comet"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let statuses = check_services(&config_for(&server)).await.unwrap();
        assert_eq!(statuses[1].label(), "FAILED");
        assert!(!required_services_ok(&statuses));
    }

    #[test]
    fn test_target_language_resolution() {
        let config = Config::default();
        assert_eq!(target_language(&config).unwrap().tag, "tur_Latn");
    }
}
