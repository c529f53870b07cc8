// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - The model lives on an AutodiffBackend during training
//   - Only the classifier head receives gradients; the
//     encoder is frozen inside SentimentModel
//   - model.valid() gives the model on the inner backend for
//     validation, so no autograd graph is built there
//   - Validation batcher must also use the inner backend
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    data::dataset::Dataset,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{sequential_loader, shuffled_loader},
    dataset::ReviewDataset,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::evaluator::evaluate;
use crate::ml::model::{count_correct, SentimentModel};

/// The trained model and one metrics row per epoch
pub struct TrainOutcome<B: AutodiffBackend> {
    pub model:   SentimentModel<B>,
    pub history: Vec<EpochMetrics>,
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    mut model:     SentimentModel<B>,
    train_dataset: ReviewDataset,
    val_dataset:   ReviewDataset,
    ckpt_manager:  &CheckpointManager,
    metrics:       &MetricsLogger,
    device:        B::Device,
) -> Result<TrainOutcome<B>> {
    ensure!(!train_dataset.is_empty(), "Training set is empty");
    ensure!(cfg.batch_size > 0, "batch_size must be at least 1");

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // ── Training data loader (AutodiffBackend, shuffled) ──────────────────────
    let train_loader = shuffled_loader::<B>(
        train_dataset,
        cfg.batch_size,
        cfg.seed,
        cfg.num_workers,
        device.clone(),
    );

    // ── Validation data loader (InnerBackend, sequential) ─────────────────────
    let val_loader = sequential_loader::<B::InnerBackend>(
        val_dataset,
        cfg.batch_size,
        cfg.num_workers,
        device,
    );

    let mut history       = Vec::with_capacity(cfg.epochs);
    let mut best_val_loss = f64::INFINITY;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let batch_size = batch.labels.dims()[0];
            let (loss, logits) = model.forward_loss(
                batch.input_ids,
                batch.attention_mask,
                batch.labels.clone(),
            );

            loss_sum += loss.clone().into_scalar().elem::<f64>() * batch_size as f64;
            correct  += count_correct(logits, batch.labels);
            seen     += batch_size;

            // Backward pass + Adam update (head parameters only)
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);

            tracing::debug!("epoch {} | {} samples seen", epoch, seen);
        }

        let train_loss = loss_sum / seen.max(1) as f64;
        let train_acc  = correct as f64 / seen.max(1) as f64;

        // ── Validation phase ──────────────────────────────────────────────────
        let report = evaluate(&model.valid(), val_loader.as_ref())?;

        let row = EpochMetrics::new(epoch, train_loss, train_acc, report.loss, report.accuracy());
        println!(
            "Epoch {:>2}/{} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs,
            row.train_loss, row.train_acc * 100.0,
            row.val_loss, row.val_acc * 100.0,
        );
        metrics.log(&row)?;

        ckpt_manager.save_head(&model.head, epoch)?;
        if row.is_improvement(best_val_loss) {
            best_val_loss = row.val_loss;
            ckpt_manager.mark_best(epoch)?;
            tracing::info!("New best validation loss {:.4} at epoch {}", best_val_loss, epoch);
        }

        history.push(row);
    }

    tracing::info!("Training complete; metrics in '{}'", metrics.csv_path().display());
    Ok(TrainOutcome { model, history })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{dataset::ReviewSample, tokenization::EncodedText};
    use crate::domain::sentiment::Sentiment;
    use crate::ml::encoder::tiny_config;
    use crate::ml::model::ClassifierHeadConfig;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    /// Positive reviews start with token 5, negative ones with token 6
    fn toy_samples(n: usize) -> Vec<ReviewSample> {
        (0..n)
            .map(|i| {
                let label = if i % 2 == 0 { Sentiment::Positive } else { Sentiment::Negative };
                let first = if label == Sentiment::Positive { 5 } else { 6 };
                ReviewSample {
                    encoding: EncodedText {
                        input_ids:      vec![2, first, 9 + (i % 5) as u32, 0],
                        attention_mask: vec![1, 1, 1, 0],
                    },
                    label,
                }
            })
            .collect()
    }

    #[test]
    fn test_train_loop_records_every_epoch() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg    = TrainConfig {
            checkpoint_dir: dir.path().to_string_lossy().into_owned(),
            batch_size:     4,
            epochs:         2,
            lr:             1e-2,
            d_hidden_1:     16,
            d_hidden_2:     8,
            d_hidden_3:     4,
            ..TrainConfig::default()
        };

        let bert  = tiny_config();
        let model = SentimentModel::new(
            bert.init::<TestBackend>(&device),
            ClassifierHeadConfig::new(bert.hidden_size)
                .with_d_hidden_1(cfg.d_hidden_1)
                .with_d_hidden_2(cfg.d_hidden_2)
                .with_d_hidden_3(cfg.d_hidden_3)
                .init(&device),
        );

        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir).unwrap();
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();
        let outcome = train_loop(
            &cfg,
            model,
            ReviewDataset::new(toy_samples(12)),
            ReviewDataset::new(toy_samples(4)),
            &ckpt,
            &metrics,
            device,
        )
        .unwrap();

        assert_eq!(outcome.history.len(), 2);
        for row in &outcome.history {
            assert!(row.train_loss.is_finite());
            assert!((0.0..=1.0).contains(&row.val_acc));
        }
        assert!(dir.path().join("head_epoch_2.mpk").exists());
        assert!(dir.path().join("best_epoch.json").exists());

        let csv = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_empty_training_set_is_rejected() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let cfg    = TrainConfig::default();
        let bert   = tiny_config();
        let model  = SentimentModel::new(
            bert.init::<TestBackend>(&device),
            ClassifierHeadConfig::new(bert.hidden_size).init(&device),
        );
        let ckpt    = CheckpointManager::new(dir.path().to_string_lossy()).unwrap();
        let metrics = MetricsLogger::new(dir.path().to_string_lossy()).unwrap();

        let result = train_loop(
            &cfg,
            model,
            ReviewDataset::new(Vec::new()),
            ReviewDataset::new(Vec::new()),
            &ckpt,
            &metrics,
            device,
        );
        assert!(result.is_err());
    }
}
