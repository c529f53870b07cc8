// ============================================================
// Layer 4 — Review Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<ReviewSample>
// into device tensors.
//
//   Input:  Vec of N ReviewSamples, each padded to length S
//   Output: ReviewBatch with tensors of shape [N, S] and [N]
//
// All sequences are already padded to the same length by the
// tokenizer adapter, so rows can be flattened and reshaped
// without any dynamic padding here.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
    prelude::*,
};
use std::sync::Arc;

use crate::data::dataset::{ReviewDataset, ReviewSample};
use crate::data::tokenization::EncodedText;

// ─── ReviewBatch ──────────────────────────────────────────────────────────────
/// A batch of reviews ready for the model forward pass.
#[derive(Debug, Clone)]
pub struct ReviewBatch<B: Backend> {
    /// Token IDs — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding — shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,

    /// Class indices — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

// ─── ReviewBatcher ────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct ReviewBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
}

impl<B: Backend> ReviewBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Stack equally long encodings into `(input_ids, attention_mask)`,
/// both shaped [encodings.len(), seq_len].
pub fn stack_encodings<B: Backend>(
    encodings: &[EncodedText],
    device:    &B::Device,
) -> (Tensor<B, 2, Int>, Tensor<B, 2, Int>) {
    let batch_size = encodings.len();
    let seq_len    = encodings.first().map_or(0, |e| e.input_ids.len());

    let ids_flat: Vec<i32> = encodings
        .iter()
        .flat_map(|e| e.input_ids.iter().map(|&x| x as i32))
        .collect();
    let mask_flat: Vec<i32> = encodings
        .iter()
        .flat_map(|e| e.attention_mask.iter().map(|&x| x as i32))
        .collect();

    let input_ids = Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), device)
        .reshape([batch_size, seq_len]);
    let attention_mask = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), device)
        .reshape([batch_size, seq_len]);

    (input_ids, attention_mask)
}

impl<B: Backend> Batcher<ReviewSample, ReviewBatch<B>> for ReviewBatcher<B> {
    fn batch(&self, items: Vec<ReviewSample>) -> ReviewBatch<B> {
        let labels: Vec<i32> = items.iter().map(|s| s.label.index() as i32).collect();
        let encodings: Vec<EncodedText> = items.into_iter().map(|s| s.encoding).collect();

        let (input_ids, attention_mask) = stack_encodings::<B>(&encodings, &self.device);
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ReviewBatch { input_ids, attention_mask, labels }
    }
}

// ─── Data Loaders ─────────────────────────────────────────────────────────────
/// Training batches: reshuffled every epoch from an RNG seeded with `seed`.
pub fn shuffled_loader<B: Backend>(
    dataset:     ReviewDataset,
    batch_size:  usize,
    seed:        u64,
    num_workers: usize,
    device:      B::Device,
) -> Arc<dyn DataLoader<ReviewBatch<B>>> {
    DataLoaderBuilder::new(ReviewBatcher::<B>::new(device))
        .batch_size(batch_size.max(1))
        .shuffle(seed)
        .num_workers(num_workers.max(1))
        .build(dataset)
}

/// Validation / test batches in dataset order; the last one may be short.
pub fn sequential_loader<B: Backend>(
    dataset:     ReviewDataset,
    batch_size:  usize,
    num_workers: usize,
    device:      B::Device,
) -> Arc<dyn DataLoader<ReviewBatch<B>>> {
    DataLoaderBuilder::new(ReviewBatcher::<B>::new(device))
        .batch_size(batch_size.max(1))
        .num_workers(num_workers.max(1))
        .build(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::Sentiment;
    use burn::backend::NdArray;

    fn sample(ids: Vec<u32>, mask: Vec<u32>, label: Sentiment) -> ReviewSample {
        ReviewSample {
            encoding: EncodedText { input_ids: ids, attention_mask: mask },
            label,
        }
    }

    #[test]
    fn test_batch_shapes_and_values() {
        let batcher = ReviewBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![
            sample(vec![5, 6, 0], vec![1, 1, 0], Sentiment::Positive),
            sample(vec![7, 0, 0], vec![1, 0, 0], Sentiment::Negative),
        ]);

        assert_eq!(batch.input_ids.dims(), [2, 3]);
        assert_eq!(batch.attention_mask.dims(), [2, 3]);
        assert_eq!(batch.labels.dims(), [2]);

        let labels: Vec<i64> = batch.labels.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(labels, vec![1, 0]);
        let mask_sum: i64 = batch.attention_mask.sum().into_scalar().elem();
        assert_eq!(mask_sum, 3);
    }

    /// Sample i carries token id i + 2 in first position
    fn numbered_dataset(n: u32) -> ReviewDataset {
        ReviewDataset::new(
            (0..n)
                .map(|i| sample(vec![i + 2, 0], vec![1, 0], Sentiment::Positive))
                .collect(),
        )
    }

    /// First token of every row, in the order the loader yields them
    fn visit_order(loader: &dyn DataLoader<ReviewBatch<NdArray>>) -> (Vec<i64>, Vec<usize>) {
        let mut ids   = Vec::new();
        let mut sizes = Vec::new();
        for batch in loader.iter() {
            let [n, s] = batch.input_ids.dims();
            sizes.push(n);
            let flat: Vec<i64> = batch.input_ids.into_data().convert::<i64>().to_vec().unwrap();
            ids.extend(flat.chunks(s).map(|row| row[0] - 2));
        }
        (ids, sizes)
    }

    #[test]
    fn test_sequential_loader_keeps_dataset_order() {
        let loader = sequential_loader::<NdArray>(numbered_dataset(10), 4, 1, Default::default());
        let (ids, sizes) = visit_order(loader.as_ref());
        assert_eq!(ids, (0..10).collect::<Vec<i64>>());
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_shuffled_loader_is_seeded() {
        let a = shuffled_loader::<NdArray>(numbered_dataset(16), 4, 42, 1, Default::default());
        let b = shuffled_loader::<NdArray>(numbered_dataset(16), 4, 42, 1, Default::default());
        let (order_a, _) = visit_order(a.as_ref());
        let (order_b, _) = visit_order(b.as_ref());

        assert_eq!(order_a, order_b);
        assert_ne!(order_a, (0..16).collect::<Vec<i64>>());

        // Still a permutation of the dataset
        let mut sorted = order_a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<i64>>());
    }
}
