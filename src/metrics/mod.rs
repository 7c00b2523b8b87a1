// Translation quality metrics
//
// BLEU is computed in-process. BERTScore and COMET need large neural models and
// are delegated to a metric-compute service over HTTP.

pub mod bleu;
pub mod remote;

use std::fmt;
use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::error::Result;

pub use bleu::Bleu;
pub use remote::RemoteMetric;

/// Shown when no reference was supplied
pub const NOT_COMPUTED: &str = "–";

/// Shown when a metric failed to load or to compute
pub const UNAVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Bleu,
    BertScore,
    Comet,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Bleu, MetricKind::BertScore, MetricKind::Comet];

    /// Label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bleu => "BLEU",
            Self::BertScore => "BERTScore F1",
            Self::Comet => "COMET",
        }
    }

    /// Name used on the metric service
    pub fn service_name(&self) -> &'static str {
        match self {
            Self::Bleu => "sacrebleu",
            Self::BertScore => "bertscore",
            Self::Comet => "comet",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One (prediction, reference, source) triple to score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringSample {
    pub prediction: String,
    pub reference: String,
    pub source: String,
}

/// A quality metric scoring a single translation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Metric: Send + Sync {
    async fn compute(&self, sample: &ScoringSample) -> Result<f64>;

    /// Check that the metric can be computed at all
    async fn check_availability(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreValue {
    Computed(f64),
    NotComputed,
    Unavailable,
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed(score) => write!(f, "{:.2}", score),
            Self::NotComputed => f.write_str(NOT_COMPUTED),
            Self::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl Serialize for ScoreValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Computed(score) => serializer.serialize_f64(*score),
            _ => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSet {
    pub bleu: ScoreValue,
    pub bertscore: ScoreValue,
    pub comet: ScoreValue,
}

impl ScoreSet {
    pub fn not_computed() -> Self {
        Self {
            bleu: ScoreValue::NotComputed,
            bertscore: ScoreValue::NotComputed,
            comet: ScoreValue::NotComputed,
        }
    }

    pub fn get(&self, kind: MetricKind) -> ScoreValue {
        match kind {
            MetricKind::Bleu => self.bleu,
            MetricKind::BertScore => self.bertscore,
            MetricKind::Comet => self.comet,
        }
    }

    pub fn set(&mut self, kind: MetricKind, value: ScoreValue) {
        match kind {
            MetricKind::Bleu => self.bleu = value,
            MetricKind::BertScore => self.bertscore = value,
            MetricKind::Comet => self.comet = value,
        }
    }

    pub fn is_computed(&self) -> bool {
        MetricKind::ALL
            .iter()
            .any(|&kind| !matches!(self.get(kind), ScoreValue::NotComputed))
    }

    /// Display strings in BLEU, BERTScore, COMET order
    pub fn formatted(&self) -> [String; 3] {
        MetricKind::ALL.map(|kind| self.get(kind).to_string())
    }
}
