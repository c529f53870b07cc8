// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Re-runs the test-split evaluation for a saved checkpoint
// using the configuration it was trained with.

use anyhow::Result;

use crate::application::pipeline::{evaluate_test_split, load_trained_model};
use crate::ml::{default_device, evaluator::EvalReport};

pub struct EvaluateUseCase {
    checkpoint_dir:   String,
    /// Overrides the saved max_test_samples when set
    max_test_samples: Option<usize>,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: String, max_test_samples: Option<usize>) -> Self {
        Self { checkpoint_dir, max_test_samples }
    }

    pub fn execute(&self) -> Result<EvalReport> {
        let device  = default_device();
        let trained = load_trained_model(&self.checkpoint_dir, &device)?;

        let mut cfg = trained.config;
        if self.max_test_samples.is_some() {
            cfg.max_test_samples = self.max_test_samples;
        }
        evaluate_test_split(&cfg, &trained.model, &trained.tokenizer, &device)
    }
}
