// ============================================================
// Layer 3 — Sentiment Label
// ============================================================
// Binary sentiment with the class indices used by the corpus:
//   0 → Negative
//   1 → Positive
// The classifier head's logit at index i is the score for
// Sentiment::from_index(i).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    /// Number of classes the head predicts
    pub const COUNT: usize = 2;

    /// All labels in class-index order
    pub const ALL: [Sentiment; 2] = [Sentiment::Negative, Sentiment::Positive];

    pub fn index(self) -> usize {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Positive => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Positive => write!(f, "Positive"),
        }
    }
}

/// The two partitions the review corpus is published with.
/// Validation data is carved out of `Train` by the splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    /// Name used by the dataset hub and by the on-disk layout
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test  => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_corpus_labels() {
        assert_eq!(Sentiment::Negative.index(), 0);
        assert_eq!(Sentiment::Positive.index(), 1);
        assert_eq!(Sentiment::from_index(1), Some(Sentiment::Positive));
    }

    #[test]
    fn test_out_of_range_index() {
        assert_eq!(Sentiment::from_index(2), None);
    }

    #[test]
    fn test_display_is_human_readable() {
        assert_eq!(Sentiment::Positive.to_string(), "Positive");
        assert_eq!(Sentiment::Negative.to_string(), "Negative");
        assert_eq!(Split::Test.to_string(), "test");
    }
}
