// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Runs the model in inference mode over a sequential loader
// and aggregates loss, accuracy and a confusion matrix.
// Used for the per-epoch validation pass and for the final
// test-set report.

use anyhow::Result;
use burn::{data::dataloader::DataLoader, prelude::*};

use crate::data::batcher::ReviewBatch;
use crate::domain::sentiment::Sentiment;
use crate::ml::model::SentimentModel;

#[derive(Debug, Clone, PartialEq)]
pub struct EvalReport {
    /// Mean cross-entropy per sample (NaN when nothing was evaluated)
    pub loss: f64,

    /// confusion[actual][predicted], indexed like `Sentiment::ALL`
    pub confusion: [[usize; Sentiment::COUNT]; Sentiment::COUNT],
}

/// `total` and `correct` are derived from the confusion matrix
impl EvalReport {
    /// Number of evaluated samples
    pub fn total(&self) -> usize {
        self.confusion.iter().flatten().sum()
    }

    /// Samples on the diagonal (predicted == actual)
    pub fn correct(&self) -> usize {
        (0..Sentiment::COUNT).map(|i| self.confusion[i][i]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    /// Of the samples predicted as `class`, the fraction that really are
    pub fn precision(&self, class: Sentiment) -> f64 {
        let c = class.index();
        let predicted: usize = self.confusion.iter().map(|row| row[c]).sum();
        ratio(self.confusion[c][c], predicted)
    }

    /// Of the samples that really are `class`, the fraction predicted as such
    pub fn recall(&self, class: Sentiment) -> f64 {
        let c = class.index();
        ratio(self.confusion[c][c], self.confusion[c].iter().sum())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 { num as f64 / den as f64 } else { 0.0 }
}

pub fn evaluate<B: Backend>(
    model:  &SentimentModel<B>,
    loader: &dyn DataLoader<ReviewBatch<B>>,
) -> Result<EvalReport> {
    let mut loss_sum  = 0.0f64;
    let mut confusion = [[0usize; Sentiment::COUNT]; Sentiment::COUNT];
    let mut total     = 0usize;

    for batch in loader.iter() {
        let batch_size = batch.labels.dims()[0];
        let (loss, logits) = model.forward_loss(
            batch.input_ids,
            batch.attention_mask,
            batch.labels.clone(),
        );
        loss_sum += loss.into_scalar().elem::<f64>() * batch_size as f64;
        total    += batch_size;

        let preds  = to_indices(logits.argmax(1).flatten::<1>(0, 1))?;
        let labels = to_indices(batch.labels)?;
        for (actual, predicted) in labels.into_iter().zip(preds) {
            if actual < Sentiment::COUNT && predicted < Sentiment::COUNT {
                confusion[actual][predicted] += 1;
            }
        }
    }

    let loss = if total > 0 { loss_sum / total as f64 } else { f64::NAN };
    Ok(EvalReport { loss, confusion })
}

fn to_indices<B: Backend>(t: Tensor<B, 1, Int>) -> Result<Vec<usize>> {
    let values = t
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| anyhow::anyhow!("Cannot read predictions: {e:?}"))?;
    Ok(values.into_iter().map(|v| v as usize).collect())
}
