// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train/test reviews        (Layer 4 - data)
//   Step 2: Stratified train/val split     (Layer 4 - data)
//   Step 3: Resolve pretrained files       (Layer 6 - infra)
//   Step 4: Load encoder + tokenizer       (Layer 5 / 4)
//   Step 5: Tokenise into datasets         (Layer 4 - data)
//   Step 6: Save config                    (Layer 6 - infra)
//   Step 7: Train the classifier head      (Layer 5 - ml)
//   Step 8: Evaluate on the test split     (Layer 5 - ml)
//   Step 9: Classify the example reviews   (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::module::AutodiffModule;
use serde::{Deserialize, Serialize};

use crate::application::pipeline::{
    evaluate_test_split, head_config, load_reviews, load_tokenizer, pretrained_files,
    review_source,
};
use crate::data::{
    dataset::{ReviewDataset, ReviewSample},
    preprocessor::Preprocessor,
    splitter::split_stratified,
};
use crate::domain::{
    review::{Prediction, Review},
    sentiment::Split,
    traits::SentimentClassifier,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::{
    default_device,
    evaluator::EvalReport,
    inferencer::Inferencer,
    model::SentimentModel,
    trainer::train_loop,
    weights::load_pretrained_encoder,
    TrainBackend,
};

/// Reviews classified after training as a sanity check
pub const EXAMPLE_REVIEWS: [&str; 2] = [
    "This movie was absolutely wonderful. The acting was superb and the story kept me hooked until the very end.",
    "A complete waste of time. The plot made no sense and I nearly fell asleep halfway through.",
];

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved next to the checkpoints so evaluate/predict can rebuild
// the same model and data pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// HuggingFace dataset name, used when data_dir is None
    pub dataset:           String,
    /// Extracted aclImdb directory (offline alternative to `dataset`)
    pub data_dir:          Option<String>,
    /// HuggingFace model id of the pretrained encoder
    pub pretrained:        String,
    /// Local directory with config.json / model.safetensors / tokenizer.json
    pub pretrained_dir:    Option<String>,
    /// Download cache for both the dataset and the pretrained files
    pub cache_dir:         Option<String>,
    pub checkpoint_dir:    String,
    pub max_seq_len:       usize,
    pub batch_size:        usize,
    pub epochs:            usize,
    pub lr:                f64,
    pub val_fraction:      f64,
    pub seed:              u64,
    pub num_workers:       usize,
    pub max_train_samples: Option<usize>,
    pub max_test_samples:  Option<usize>,
    pub d_hidden_1:        usize,
    pub d_hidden_2:        usize,
    pub d_hidden_3:        usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset:           "imdb".to_string(),
            data_dir:          None,
            pretrained:        "bert-base-uncased".to_string(),
            pretrained_dir:    None,
            cache_dir:         None,
            checkpoint_dir:    "checkpoints".to_string(),
            max_seq_len:       128,
            batch_size:        32,
            epochs:            2,
            lr:                1e-3,
            val_fraction:      0.2,
            seed:              42,
            num_workers:       1,
            max_train_samples: None,
            max_test_samples:  None,
            d_hidden_1:        512,
            d_hidden_2:        256,
            d_hidden_3:        64,
        }
    }
}

/// What a finished training run reports back to the CLI
pub struct TrainSummary {
    pub history:     Vec<EpochMetrics>,
    pub test_report: EvalReport,
    pub examples:    Vec<(String, Prediction)>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainSummary> {
        let cfg    = &self.config;
        let device = default_device();

        // ── Step 1: Load reviews ──────────────────────────────────────────────
        let source  = review_source(cfg);
        let reviews = load_reviews(source.as_ref(), Split::Train, cfg.max_train_samples, cfg.seed)?;

        // ── Step 2: Stratified train / validation split ───────────────────────
        let (train_reviews, val_reviews) =
            split_stratified(reviews, cfg.val_fraction, cfg.seed, |r: &Review| r.label.index());
        tracing::info!(
            "Split: {} train, {} validation",
            train_reviews.len(),
            val_reviews.len()
        );

        // ── Step 3-4: Pretrained encoder and tokenizer ────────────────────────
        let files           = pretrained_files(cfg)?;
        let (bert, encoder) = load_pretrained_encoder::<TrainBackend>(&files, &device)?;
        let tokenizer       = load_tokenizer(cfg, &files, &bert)?;

        // ── Step 5: Tokenise ──────────────────────────────────────────────────
        let preprocessor  = Preprocessor::new();
        let train_dataset = ReviewDataset::new(
            ReviewSample::from_reviews(&train_reviews, &preprocessor, &tokenizer)?,
        );
        let val_dataset = ReviewDataset::new(
            ReviewSample::from_reviews(&val_reviews, &preprocessor, &tokenizer)?,
        );
        let [neg, pos] = train_dataset.class_counts();
        tracing::info!("Training set: {} negative / {} positive", neg, pos);

        // ── Step 6: Save config for evaluate / predict ────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

        // ── Step 7: Train the head on the frozen encoder ──────────────────────
        let head  = head_config(cfg, bert.hidden_size).init::<TrainBackend>(&device);
        let model = SentimentModel::new(encoder, head);
        let outcome = train_loop(
            cfg,
            model,
            train_dataset,
            val_dataset,
            &ckpt_manager,
            &metrics,
            device.clone(),
        )?;

        // ── Step 8: Test evaluation with the best epoch's head ────────────────
        let mut model = outcome.model.valid();
        model.head    = ckpt_manager.load_head(model.head, &device)?;
        let test_report = evaluate_test_split(cfg, &model, &tokenizer, &device)?;

        // ── Step 9: Example reviews ───────────────────────────────────────────
        let texts: Vec<String> = EXAMPLE_REVIEWS.iter().map(|s| s.to_string()).collect();
        let inferencer  = Inferencer::new(model, tokenizer, cfg.batch_size, device);
        let predictions = inferencer.classify(&texts)?;

        Ok(TrainSummary {
            history: outcome.history,
            test_report,
            examples: texts.into_iter().zip(predictions).collect(),
        })
    }
}
