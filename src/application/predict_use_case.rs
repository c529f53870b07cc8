// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Loads the trained model once, then labels any number of
// review texts with it.

use anyhow::{ensure, Result};

use crate::application::pipeline::load_trained_model;
use crate::domain::{review::Prediction, traits::SentimentClassifier};
use crate::ml::{default_device, inferencer::Inferencer, InferBackend};

pub struct PredictUseCase {
    inferencer: Inferencer<InferBackend>,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let device  = default_device();
        let trained = load_trained_model(checkpoint_dir, &device)?;
        let inferencer = Inferencer::new(
            trained.model,
            trained.tokenizer,
            trained.config.batch_size,
            device,
        );
        Ok(Self { inferencer })
    }

    pub fn predict(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        ensure!(!texts.is_empty(), "Nothing to classify: pass at least one --text");
        self.inferencer.classify(texts)
    }
}
