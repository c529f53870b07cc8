// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here:
//
//   encoder.rs    — BERT encoder (embeddings, self-attention
//                   layers, pooler) built from burn::nn blocks
//
//   weights.rs    — copies pretrained safetensors weights
//                   into the encoder
//
//   model.rs      — 4-layer ReLU classifier head and the
//                   frozen-encoder SentimentModel
//
//   trainer.rs    — epoch loop: forward, cross-entropy,
//                   backward through the head, Adam step,
//                   validation, checkpointing
//
//   evaluator.rs  — loss / accuracy / confusion matrix in
//                   inference mode
//
//   inferencer.rs — labels ad-hoc text with a trained model
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Devlin et al. (2019) BERT

use burn::backend::{wgpu::WgpuDevice, Autodiff, Wgpu};

/// BERT encoder architecture
pub mod encoder;

/// Pretrained weight loading
pub mod weights;

/// Classifier head and frozen-encoder model
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Evaluation over a data loader
pub mod evaluator;

/// Text → sentiment inference
pub mod inferencer;

/// Backend used while training (gradients tracked)
pub type TrainBackend = Autodiff<Wgpu>;

/// Backend used for evaluation and inference
pub type InferBackend = Wgpu;

pub fn default_device() -> WgpuDevice {
    WgpuDevice::default()
}
