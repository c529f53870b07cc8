// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits:
//   - HfReviewSource and AclImdbDirSource both implement
//     ReviewSource
//   - Inferencer implements SentimentClassifier
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::review::{Prediction, Review};
use crate::domain::sentiment::Split;

// ─── ReviewSource ─────────────────────────────────────────────────────────────
/// Any component that can produce labelled reviews for a corpus split.
pub trait ReviewSource {
    /// Load every review of the given split.
    fn load_split(&self, split: Split) -> Result<Vec<Review>>;
}

// ─── SentimentClassifier ──────────────────────────────────────────────────────
/// Any component that can label free-form text with a sentiment.
pub trait SentimentClassifier {
    /// One prediction per input, in input order.
    fn classify(&self, texts: &[String]) -> Result<Vec<Prediction>>;
}
