pub mod lstm;
pub mod metrics;
pub mod vocab;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::DEFAULT_THRESHOLD;
use lstm::LstmClassifier;
use vocab::Vocabulary;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed classifier artifact: {0}")]
    Shape(String),

    #[error("vocabulary has no entries")]
    EmptyVocabulary,

    #[error("character {symbol:?} in {name:?} is not in the vocabulary")]
    UnknownSymbol { symbol: char, name: String },
}

/// What to do with characters the vocabulary never saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UnknownPolicy {
    /// Score with the reserved unknown row.
    #[default]
    Substitute,
    /// Refuse to score the name.
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredName {
    pub name: String,
    pub score: f32,
}

/// Vocabulary + model + decision threshold.
#[derive(Debug, Clone)]
pub struct CompanyClassifier {
    vocab: Vocabulary,
    model: LstmClassifier,
    pub threshold: f32,
    pub policy: UnknownPolicy,
}

impl CompanyClassifier {
    /// Load both artifacts; either one missing is an error.
    pub fn load(vocab_path: &Path, model_path: &Path) -> Result<Self, ClassifierError> {
        let vocab = Vocabulary::load(vocab_path)?;
        let model = LstmClassifier::load(model_path)?;
        let classifier = Self::new(vocab, model)?;
        info!(
            "Loaded classifier: {} symbols, {} embedding rows",
            classifier.vocab.len(),
            classifier.model.rows()
        );
        Ok(classifier)
    }

    pub fn new(vocab: Vocabulary, mut model: LstmClassifier) -> Result<Self, ClassifierError> {
        let unknown = vocab.unknown_index();
        if model.rows() == unknown {
            // Trained without an unknown row; give it a neutral one.
            model.reserve_row(unknown);
        }
        if vocab.max_index() >= model.rows() {
            return Err(ClassifierError::Shape(format!(
                "vocabulary index {} exceeds {} embedding rows",
                vocab.max_index(),
                model.rows()
            )));
        }
        Ok(Self {
            vocab,
            model,
            threshold: DEFAULT_THRESHOLD,
            policy: UnknownPolicy::default(),
        })
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_policy(mut self, policy: UnknownPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Probability in [0, 1] that a normalized name is a company.
    pub fn score(&self, name: &str) -> Result<f32, ClassifierError> {
        let symbols = self.vocab.encode(name, self.policy)?;
        Ok(self.model.forward(&symbols))
    }

    pub fn accepts(&self, score: f32) -> bool {
        score >= self.threshold
    }

    /// Score every name and keep those at or above the threshold.
    ///
    /// Names the policy refuses are skipped, not fatal.
    pub fn filter<'a, I>(&self, names: I) -> Vec<ScoredName>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| match self.score(name) {
                Ok(score) => Some(ScoredName {
                    name: name.to_string(),
                    score,
                }),
                Err(e) => {
                    debug!("Skipping {:?}: {}", name, e);
                    None
                }
            })
            .filter(|s| self.accepts(s.score))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn fixture() -> CompanyClassifier {
        CompanyClassifier::load(
            Path::new("tests/fixtures/vocab.json"),
            Path::new("tests/fixtures/model.json"),
        )
        .unwrap()
    }

    #[test]
    fn fixture_separates_names() {
        let c = fixture();
        assert!(c.accepts(c.score("acme_robotics").unwrap()));
        assert!(!c.accepts(c.score("london").unwrap()));
    }

    #[test]
    fn unknown_row_is_padded() {
        let c = fixture();
        // 'é' is outside the fixture vocabulary.
        let p = c.score("caf\u{e9}_labs").unwrap();
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn reject_policy_skips_in_filter() {
        let c = fixture().with_policy(UnknownPolicy::Reject);
        assert!(matches!(c.score("caf\u{e9}_labs"), Err(ClassifierError::UnknownSymbol { .. })));
        let kept = c.filter(["caf\u{e9}_labs", "acme_robotics"]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "acme_robotics");
    }

    #[test]
    fn raising_threshold_never_adds_names() {
        let names = ["acme_robotics", "london", "benevolent_labs", "oxford", "a_b_c"];
        let mut previous: Option<Vec<String>> = None;
        for t in [0.0, 0.05, 0.46, 0.9, 0.99, 1.0] {
            let kept: Vec<String> = fixture()
                .with_threshold(t)
                .filter(names)
                .into_iter()
                .map(|s| s.name)
                .collect();
            if let Some(prev) = &previous {
                assert!(kept.iter().all(|n| prev.contains(n)), "threshold {t} added a name");
            }
            previous = Some(kept);
        }
    }

    #[test]
    fn missing_model_is_fatal() {
        let err = CompanyClassifier::load(
            Path::new("tests/fixtures/vocab.json"),
            Path::new("tests/fixtures/missing_model.json"),
        )
        .unwrap_err();
        assert!(matches!(err, ClassifierError::Io { .. }));
    }

    #[test]
    fn vocabulary_larger_than_model() {
        let vocab = Vocabulary::from_entries(HashMap::from([
            ("a".to_string(), 0),
            ("b".to_string(), 5),
        ]))
        .unwrap();
        let err = CompanyClassifier::new(vocab, lstm::tests::constant(2, 0.0)).unwrap_err();
        assert!(matches!(err, ClassifierError::Shape(_)));
    }
}
