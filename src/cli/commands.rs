// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands, `train`, `evaluate` and
// `predict`, and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier head on top of a frozen pretrained encoder
    Train(TrainArgs),

    /// Evaluate a saved checkpoint on the test split
    Evaluate(EvaluateArgs),

    /// Classify review texts with a saved checkpoint
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// HuggingFace dataset to train on
    #[arg(long, default_value = "imdb")]
    pub dataset: String,

    /// Read an extracted aclImdb directory instead of downloading
    #[arg(long)]
    pub data_dir: Option<String>,

    /// HuggingFace id of the pretrained encoder
    #[arg(long, default_value = "bert-base-uncased")]
    pub pretrained: String,

    /// Directory holding config.json, model.safetensors and tokenizer.json
    #[arg(long)]
    pub pretrained_dir: Option<String>,

    /// Download cache for the dataset and pretrained files
    #[arg(long)]
    pub cache_dir: Option<String>,

    /// Directory for head checkpoints, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Tokens per review after padding / truncation
    #[arg(long, default_value_t = 128)]
    pub max_seq_len: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 2)]
    pub epochs: usize,

    /// Adam learning rate (constant)
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Share of the training split held out for validation
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    /// Seed for the split, subsampling and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Data loader worker threads
    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,

    /// Cap on training-split reviews (class balance kept)
    #[arg(long)]
    pub max_train_samples: Option<usize>,

    /// Cap on test-split reviews (class balance kept)
    #[arg(long)]
    pub max_test_samples: Option<usize>,

    #[arg(long, default_value_t = 512)]
    pub d_hidden_1: usize,

    #[arg(long, default_value_t = 256)]
    pub d_hidden_2: usize,

    #[arg(long, default_value_t = 64)]
    pub d_hidden_3: usize,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset:           a.dataset,
            data_dir:          a.data_dir,
            pretrained:        a.pretrained,
            pretrained_dir:    a.pretrained_dir,
            cache_dir:         a.cache_dir,
            checkpoint_dir:    a.checkpoint_dir,
            max_seq_len:       a.max_seq_len,
            batch_size:        a.batch_size,
            epochs:            a.epochs,
            lr:                a.lr,
            val_fraction:      a.val_fraction,
            seed:              a.seed,
            num_workers:       a.num_workers,
            max_train_samples: a.max_train_samples,
            max_test_samples:  a.max_test_samples,
            d_hidden_1:        a.d_hidden_1,
            d_hidden_2:        a.d_hidden_2,
            d_hidden_3:        a.d_hidden_3,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Cap on test-split reviews, overriding the training run's value
    #[arg(long)]
    pub max_test_samples: Option<usize>,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Review to classify; repeat for several
    #[arg(long = "text", required = true)]
    pub texts: Vec<String>,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
