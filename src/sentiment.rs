use serde::Serialize;

/// Compound scores above this are positive
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound scores below this are negative
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Sentiment category for a single piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// A classified piece of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentResult {
    pub text: String,
    pub sentiment: Sentiment,
}

/// Category counts over a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// External polarity-scoring function: a compound score in [-1, 1] for a
/// piece of text. Kept behind a trait so tests can supply fixed scores.
pub trait PolarityScorer {
    fn compound(&self, text: &str) -> f64;
}

/// VADER-based scorer. The lexicon is compiled in; construction cannot
/// fail.
pub struct VaderScorer {
    analyzer: vader_sentiment::SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: vader_sentiment::SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for VaderScorer {
    fn compound(&self, text: &str) -> f64 {
        self.analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}

/// Map a compound score to a category. The thresholds are fixed; both
/// boundary values classify as neutral.
pub fn classify(score: f64) -> Sentiment {
    if score > POSITIVE_THRESHOLD {
        Sentiment::Positive
    } else if score < NEGATIVE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Classify a batch of opinions, returning per-text results and the
/// aggregate counts.
pub fn classify_batch(
    scorer: &dyn PolarityScorer,
    opinions: Vec<String>,
) -> (Vec<SentimentResult>, SentimentSummary) {
    let mut results = Vec::with_capacity(opinions.len());
    let mut summary = SentimentSummary::default();

    for text in opinions {
        let sentiment = classify(scorer.compound(&text));
        match sentiment {
            Sentiment::Positive => summary.positive += 1,
            Sentiment::Negative => summary.negative += 1,
            Sentiment::Neutral => summary.neutral += 1,
        }
        results.push(SentimentResult { text, sentiment });
    }

    (results, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scorer returning a fixed score per text, in input order
    struct FixedScorer(Vec<f64>, std::cell::Cell<usize>);

    impl FixedScorer {
        fn new(scores: Vec<f64>) -> Self {
            Self(scores, std::cell::Cell::new(0))
        }
    }

    impl PolarityScorer for FixedScorer {
        fn compound(&self, _text: &str) -> f64 {
            let i = self.1.get();
            self.1.set(i + 1);
            self.0[i]
        }
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(classify(0.6), Sentiment::Positive);
        assert_eq!(classify(0.0501), Sentiment::Positive);
        assert_eq!(classify(-0.6), Sentiment::Negative);
        assert_eq!(classify(-0.0501), Sentiment::Negative);
        assert_eq!(classify(0.0), Sentiment::Neutral);
        assert_eq!(classify(0.04), Sentiment::Neutral);
        assert_eq!(classify(-0.04), Sentiment::Neutral);
    }

    #[test]
    fn test_boundary_values_are_neutral() {
        assert_eq!(classify(POSITIVE_THRESHOLD), Sentiment::Neutral);
        assert_eq!(classify(NEGATIVE_THRESHOLD), Sentiment::Neutral);
    }

    #[test]
    fn test_batch_summary_counts() {
        let scorer = FixedScorer::new(vec![0.8, -0.3, 0.0, 0.2]);
        let opinions = vec![
            "great".to_string(),
            "awful".to_string(),
            "meh".to_string(),
            "fine".to_string(),
        ];

        let (results, summary) = classify_batch(&scorer, opinions);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].sentiment, Sentiment::Positive);
        assert_eq!(results[1].sentiment, Sentiment::Negative);
        assert_eq!(results[2].sentiment, Sentiment::Neutral);
        assert_eq!(
            summary,
            SentimentSummary {
                positive: 2,
                negative: 1,
                neutral: 1
            }
        );
    }

    #[test]
    fn test_empty_batch() {
        let scorer = FixedScorer::new(vec![]);
        let (results, summary) = classify_batch(&scorer, Vec::new());
        assert!(results.is_empty());
        assert_eq!(summary, SentimentSummary::default());
    }

    #[test]
    fn test_vader_scorer_direction() {
        let scorer = VaderScorer::new();
        assert!(scorer.compound("I love this, it is wonderful and great!") > POSITIVE_THRESHOLD);
        assert!(scorer.compound("I hate this, it is terrible and awful!") < NEGATIVE_THRESHOLD);
    }

    #[test]
    fn test_sentiment_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Positive).unwrap();
        assert_eq!(json, r#""positive""#);
    }
}
