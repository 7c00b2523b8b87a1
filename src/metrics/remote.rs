use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{MetricsConfig, RemoteMetricConfig};
use crate::error::{Result, CeviriError};
use super::{Metric, MetricKind, ScoringSample};

#[derive(Debug, Serialize)]
struct BertScoreRequest<'a> {
    predictions: [&'a str; 1],
    references: [&'a str; 1],
    lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_type: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BertScoreResponse {
    f1: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct CometRequest<'a> {
    predictions: [&'a str; 1],
    references: [&'a str; 1],
    sources: [&'a str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CometResponse {
    scores: Vec<f64>,
}

/// BERTScore or COMET computed by the metric service
pub struct RemoteMetric {
    kind: MetricKind,
    client: Client,
    endpoint: String,
    /// Language of predictions and references, BERTScore only
    lang: String,
    model: Option<String>,
}

impl RemoteMetric {
    pub fn new(
        kind: MetricKind,
        config: &MetricsConfig,
        metric: &RemoteMetricConfig,
        lang: &str,
    ) -> Result<Self> {
        if kind == MetricKind::Bleu {
            return Err(CeviriError::Config("BLEU is computed locally, not by the metric service".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            kind,
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            lang: lang.to_string(),
            model: metric.model.clone(),
        })
    }

    fn error(&self, message: impl Into<String>) -> CeviriError {
        CeviriError::metric(self.kind.service_name(), message)
    }

    async fn post<B: Serialize + ?Sized>(&self, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}/compute/{}", self.endpoint, self.kind.service_name());
        debug!("Sending {} request to: {}", self.kind, url);

        let response = self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.error(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(self.error(format!("Metric service error {}: {}", status, error_text)));
        }

        Ok(response)
    }
}

#[async_trait]
impl Metric for RemoteMetric {
    async fn compute(&self, sample: &ScoringSample) -> Result<f64> {
        let scores = match self.kind {
            MetricKind::BertScore => {
                let body = BertScoreRequest {
                    predictions: [sample.prediction.as_str()],
                    references: [sample.reference.as_str()],
                    lang: &self.lang,
                    model_type: self.model.as_deref(),
                };
                let parsed: BertScoreResponse = self.post(&body).await?.json().await
                    .map_err(|e| self.error(format!("Failed to parse response: {}", e)))?;
                // F1 is reported on the 0-100 scale like BLEU
                parsed.f1.into_iter().map(|f1| f1 * 100.0).collect::<Vec<_>>()
            }
            MetricKind::Comet => {
                let body = CometRequest {
                    predictions: [sample.prediction.as_str()],
                    references: [sample.reference.as_str()],
                    sources: [sample.source.as_str()],
                    model: self.model.as_deref(),
                };
                let parsed: CometResponse = self.post(&body).await?.json().await
                    .map_err(|e| self.error(format!("Failed to parse response: {}", e)))?;
                parsed.scores
            }
            MetricKind::Bleu => return Err(self.error("not served remotely")),
        };

        let score = scores
            .first()
            .copied()
            .ok_or_else(|| self.error("Empty score list returned"))?;

        if !score.is_finite() {
            return Err(self.error(format!("Non-finite score returned: {}", score)));
        }

        Ok(score)
    }

    async fn check_availability(&self) -> Result<()> {
        let url = format!("{}/metrics/{}", self.endpoint, self.kind.service_name());

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.error(format!("Failed to connect to metric service: {}", e)))?;

        if response.status().is_success() {
            info!("{} is available at {}", self.kind, self.endpoint);
            Ok(())
        } else {
            Err(self.error(format!("Metric not loaded on service (status {})", response.status())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn metric_for(server: &MockServer, kind: MetricKind) -> RemoteMetric {
        let mut config = Config::default().metrics;
        config.endpoint = server.uri();
        let metric = match kind {
            MetricKind::Comet => config.comet.clone(),
            _ => config.bertscore.clone(),
        };
        RemoteMetric::new(kind, &config, &metric, "tr").unwrap()
    }

    fn sample() -> ScoringSample {
        ScoringSample {
            prediction: "Merhaba, nasılsınız?".to_string(),
            reference: "Merhaba, nasılsın?".to_string(),
            source: "Hello, how are you?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bertscore_f1_is_scaled_to_percent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/compute/bertscore"))
            .and(body_json(json!({
                "predictions": ["Merhaba, nasılsınız?"],
                "references": ["Merhaba, nasılsın?"],
                "lang": "tr"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "precision": [0.93], "recall": [0.91], "f1": [0.92]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let metric = metric_for(&server, MetricKind::BertScore);
        let score = metric.compute(&sample()).await.unwrap();
        assert!((score - 92.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_comet_sends_source_and_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/compute/comet"))
            .and(body_json(json!({
                "predictions": ["Merhaba, nasılsınız?"],
                "references": ["Merhaba, nasılsın?"],
                "sources": ["Hello, how are you?"],
                "model": "Unbabel/wmt22-comet-da"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "mean_score": 0.8412, "scores": [0.8412]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let metric = metric_for(&server, MetricKind::Comet);
        let score = metric.compute(&sample()).await.unwrap();
        assert!((score - 0.8412).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_scores_are_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "scores": [] })))
            .mount(&server)
            .await;

        let metric = metric_for(&server, MetricKind::Comet);
        let err = metric.compute(&sample()).await.unwrap_err();
        assert!(matches!(err, CeviriError::Metric { ref metric, .. } if metric == "comet"));
    }

    #[tokio::test]
    async fn test_availability_probe() {
        let server = MockServer::start().await;
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

        assert!(metric_for(&server, MetricKind::BertScore).check_availability().await.is_ok());
        assert!(metric_for(&server, MetricKind::Comet).check_availability().await.is_err());
    }

    #[test]
    fn test_bleu_is_not_a_remote_metric() {
        let config = Config::default().metrics;
        assert!(RemoteMetric::new(MetricKind::Bleu, &config, &config.bertscore, "tr").is_err());
    }
}
