use anyhow::Result;
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::preprocessor::Preprocessor;
use crate::data::tokenization::{EncodedText, TokenizerAdapter};
use crate::domain::review::Review;
use crate::domain::sentiment::Sentiment;

/// Reviews are tokenised in slices of this size so progress can be logged.
const ENCODE_CHUNK: usize = 2048;

/// One fully tokenised and padded review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSample {
    pub encoding: EncodedText,
    pub label:    Sentiment,
}

impl ReviewSample {
    /// Clean and tokenise labelled reviews, keeping their order.
    pub fn from_reviews(
        reviews:      &[Review],
        preprocessor: &Preprocessor,
        tokenizer:    &TokenizerAdapter,
    ) -> Result<Vec<Self>> {
        let mut samples   = Vec::with_capacity(reviews.len());
        let mut truncated = 0usize;
        for chunk in reviews.chunks(ENCODE_CHUNK) {
            let texts: Vec<String> = chunk.iter().map(|r| preprocessor.clean(&r.text)).collect();
            let encodings = tokenizer.encode_batch(&texts)?;
            truncated += encodings
                .iter()
                .filter(|e| e.real_len() == tokenizer.max_len())
                .count();
            samples.extend(
                encodings
                    .into_iter()
                    .zip(chunk)
                    .map(|(encoding, review)| ReviewSample { encoding, label: review.label }),
            );
            tracing::debug!("Tokenised {}/{} reviews", samples.len(), reviews.len());
        }
        tracing::info!(
            "Tokenised {} reviews ({} filled all {} positions)",
            samples.len(),
            truncated,
            tokenizer.max_len()
        );
        Ok(samples)
    }
}

pub struct ReviewDataset {
    samples: Vec<ReviewSample>,
}

impl ReviewDataset {
    pub fn new(samples: Vec<ReviewSample>) -> Self { Self { samples } }

    /// Number of samples per class, indexed like `Sentiment::ALL`
    pub fn class_counts(&self) -> [usize; Sentiment::COUNT] {
        let mut counts = [0; Sentiment::COUNT];
        for s in &self.samples {
            counts[s.label.index()] += 1;
        }
        counts
    }
}

impl Dataset<ReviewSample> for ReviewDataset {
    fn get(&self, index: usize) -> Option<ReviewSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
