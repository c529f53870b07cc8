// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Classifies free-form text with a trained SentimentModel:
//   text → clean → tokenise → encoder + head → softmax → label
use anyhow::{Context, Result};
use burn::{prelude::*, tensor::activation::softmax};

use crate::data::batcher::stack_encodings;
use crate::data::preprocessor::Preprocessor;
use crate::data::tokenization::TokenizerAdapter;
use crate::domain::review::Prediction;
use crate::domain::traits::SentimentClassifier;
use crate::ml::model::SentimentModel;

pub struct Inferencer<B: Backend> {
    model:        SentimentModel<B>,
    tokenizer:    TokenizerAdapter,
    preprocessor: Preprocessor,
    batch_size:   usize,
    device:       B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn new(
        model:      SentimentModel<B>,
        tokenizer:  TokenizerAdapter,
        batch_size: usize,
        device:     B::Device,
    ) -> Self {
        Self {
            model,
            tokenizer,
            preprocessor: Preprocessor::new(),
            batch_size: batch_size.max(1),
            device,
        }
    }

    fn classify_chunk(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        let cleaned: Vec<String> = texts.iter().map(|t| self.preprocessor.clean(t)).collect();
        let encodings = self.tokenizer.encode_batch(&cleaned)?;
        let (input_ids, attention_mask) = stack_encodings::<B>(&encodings, &self.device);

        let logits = self.model.forward(input_ids, attention_mask);
        let [_, num_classes] = logits.dims();
        let probs: Vec<f32> = softmax(logits, 1)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities: {e:?}"))?;

        probs
            .chunks(num_classes)
            .map(|row| {
                let p = Prediction::from_probabilities(row)
                    .context("Model produced an unknown class index")?;
                tracing::debug!("{} ({:.3})", p.label, p.confidence);
                Ok(p)
            })
            .collect()
    }
}

impl<B: Backend> SentimentClassifier for Inferencer<B> {
    fn classify(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        let mut predictions = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            predictions.extend(self.classify_chunk(chunk)?);
        }
        Ok(predictions)
    }
}
