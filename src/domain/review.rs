// ============================================================
// Layer 3 — Review Domain Types
// ============================================================

use serde::{Deserialize, Serialize};

use crate::domain::sentiment::Sentiment;

/// A labelled movie review as loaded from the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Raw review text (may still contain HTML line breaks)
    pub text: String,

    /// Ground-truth sentiment
    pub label: Sentiment,
}

impl Review {
    pub fn new(text: impl Into<String>, label: Sentiment) -> Self {
        Self { text: text.into(), label }
    }
}

/// The classifier's verdict for one input text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Arg-max class
    pub label: Sentiment,

    /// Softmax probability of `label`
    pub confidence: f32,
}

impl Prediction {
    /// Build a prediction from per-class probabilities
    /// (index order follows `Sentiment::ALL`).
    /// Ties resolve to the lower class index, matching argmax.
    pub fn from_probabilities(probs: &[f32]) -> Option<Self> {
        let (index, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
                Some((_, bp)) if bp >= p => best,
                _ => Some((i, p)),
            })?;
        Some(Self { label: Sentiment::from_index(index)?, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_picks_highest_probability() {
        let p = Prediction::from_probabilities(&[0.2, 0.8]).unwrap();
        assert_eq!(p.label, Sentiment::Positive);
        assert!((p.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_prediction_tie_goes_to_first_class() {
        let p = Prediction::from_probabilities(&[0.5, 0.5]).unwrap();
        assert_eq!(p.label, Sentiment::Negative);
    }

    #[test]
    fn test_prediction_rejects_empty_or_unknown_class() {
        assert!(Prediction::from_probabilities(&[]).is_none());
        // Index 2 has no Sentiment counterpart
        assert!(Prediction::from_probabilities(&[0.1, 0.1, 0.8]).is_none());
    }
}
