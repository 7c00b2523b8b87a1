//! Sentence BLEU with sacreBLEU's default settings: the `13a` tokenizer,
//! maximum n-gram order 4, `exp` smoothing and the standard brevity penalty.
//! Scores are on the 0 to 100 scale.

use std::collections::HashMap;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use super::{Metric, ScoringSample};

const MAX_NGRAM_ORDER: usize = 4;

/// log(0) stand-in, matching sacreBLEU
const LOG_ZERO: f64 = -9_999_999_999.0;

static TOKENIZER_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // punctuation except apostrophe, comma, hyphen and period
        (Regex::new(r"([{-~\[-\x60 -&(-+:-@/])").expect("13a punctuation regex"), " ${1} "),
        // period and comma unless preceded by a digit
        (Regex::new(r"([^0-9])([.,])").expect("13a period regex"), "${1} ${2} "),
        // period and comma unless followed by a digit
        (Regex::new(r"([.,])([^0-9])").expect("13a comma regex"), " ${1} ${2}"),
        // dash preceded by a digit
        (Regex::new(r"([0-9])(-)").expect("13a dash regex"), "${1} ${2} "),
    ]
});

/// Tokenize a line the way mteval-v13a does
pub fn tokenize_13a(line: &str) -> Vec<String> {
    let mut line = line
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ");

    if line.contains('&') {
        line = line
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let mut line = format!(" {} ", line);
    for (regex, replacement) in TOKENIZER_RULES.iter() {
        line = regex.replace_all(&line, *replacement).into_owned();
    }

    line.split_whitespace().map(str::to_string).collect()
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for window in tokens.windows(n) {
            *counts.entry(window).or_insert(0) += 1;
        }
    }
    counts
}

/// BLEU of one hypothesis against one reference
pub fn sentence_bleu(hypothesis: &str, reference: &str, lowercase: bool) -> f64 {
    let (hypothesis, reference) = if lowercase {
        (hypothesis.to_lowercase(), reference.to_lowercase())
    } else {
        (hypothesis.to_string(), reference.to_string())
    };

    let hyp_tokens = tokenize_13a(&hypothesis);
    let ref_tokens = tokenize_13a(&reference);
    let sys_len = hyp_tokens.len();
    let ref_len = ref_tokens.len();

    let mut precisions = [0.0_f64; MAX_NGRAM_ORDER];
    let mut smooth = 1.0_f64;

    for n in 1..=MAX_NGRAM_ORDER {
        let total = sys_len.saturating_sub(n - 1);
        if total == 0 {
            break;
        }

        let hyp_ngrams = ngram_counts(&hyp_tokens, n);
        let ref_ngrams = ngram_counts(&ref_tokens, n);
        let correct: usize = hyp_ngrams
            .iter()
            .map(|(ngram, &count)| count.min(ref_ngrams.get(ngram).copied().unwrap_or(0)))
            .sum();

        precisions[n - 1] = if correct == 0 {
            smooth *= 2.0;
            100.0 / (smooth * total as f64)
        } else {
            100.0 * correct as f64 / total as f64
        };
    }

    let brevity_penalty = if sys_len < ref_len {
        if sys_len > 0 {
            (1.0 - ref_len as f64 / sys_len as f64).exp()
        } else {
            0.0
        }
    } else {
        1.0
    };

    let log_sum: f64 = precisions
        .iter()
        .map(|&p| if p == 0.0 { LOG_ZERO } else { p.ln() })
        .sum();

    brevity_penalty * (log_sum / MAX_NGRAM_ORDER as f64).exp()
}

/// In-process BLEU metric
pub struct Bleu {
    lowercase: bool,
}

impl Bleu {
    pub fn new(lowercase: bool) -> Self {
        Self { lowercase }
    }
}

#[async_trait]
impl Metric for Bleu {
    async fn compute(&self, sample: &ScoringSample) -> Result<f64> {
        Ok(sentence_bleu(&sample.prediction, &sample.reference, self.lowercase))
    }

    async fn check_availability(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_tokenize_13a_splits_punctuation() {
        assert_eq!(tokenize_13a("Hello, world."), vec!["Hello", ",", "world", "."]);
        assert_eq!(tokenize_13a("Merhaba, nasılsın?"), vec!["Merhaba", ",", "nasılsın", "?"]);
        assert_eq!(tokenize_13a("(test)"), vec!["(", "test", ")"]);
    }

    #[test]
    fn test_tokenize_13a_keeps_numbers_and_apostrophes() {
        assert_eq!(tokenize_13a("pi is 3.14"), vec!["pi", "is", "3.14"]);
        assert_eq!(tokenize_13a("1,000 people"), vec!["1,000", "people"]);
        assert_eq!(tokenize_13a("don't"), vec!["don't"]);
        assert_eq!(tokenize_13a("pages 1-2"), vec!["pages", "1", "-", "2"]);
    }

    #[test]
    fn test_tokenize_13a_unescapes_entities() {
        assert_eq!(tokenize_13a("&quot;a&quot; &amp; b"), vec!["\"", "a", "\"", "&", "b"]);
    }

    #[test]
    fn test_identical_sentences_score_100() {
        assert_close(sentence_bleu("Merhaba, nasılsın?", "Merhaba, nasılsın?", false), 100.0);
    }

    #[test]
    fn test_partial_overlap() {
        let score = sentence_bleu("the cat sat on the mat", "the cat sat on a mat", false);
        assert_close(score, 100.0 * (1.0_f64 / 12.0).powf(0.25));
    }

    #[test]
    fn test_exp_smoothing_for_missing_ngrams() {
        let score = sentence_bleu("a b c d", "a b x d", false);
        let expected = (75.0 * (100.0 / 3.0) * 25.0 * 25.0_f64).powf(0.25);
        assert_close(score, expected);
    }

    #[test]
    fn test_short_hypothesis_scores_zero() {
        assert!(sentence_bleu("the cat", "the cat sat on the mat", false) < 1e-6);
        assert_close(sentence_bleu("", "Merhaba", false), 0.0);
    }

    #[test]
    fn test_lowercase_option() {
        assert!(sentence_bleu("MERHABA DÜNYA GÜZEL BUGÜN", "merhaba dünya güzel bugün", false) < 100.0);
        assert_close(
            sentence_bleu("MERHABA DÜNYA GÜZEL BUGÜN", "merhaba dünya güzel bugün", true),
            100.0,
        );
    }

    #[tokio::test]
    async fn test_metric_uses_prediction_and_reference() {
        let bleu = Bleu::new(false);
        let sample = ScoringSample {
            prediction: "Merhaba, nasılsın?".to_string(),
            reference: "Merhaba, nasılsın?".to_string(),
            source: "Hello, how are you?".to_string(),
        };
        assert_close(bleu.compute(&sample).await.unwrap(), 100.0);
    }
}
