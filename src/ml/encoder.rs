// ============================================================
// Layer 5 — Pretrained BERT Encoder
// ============================================================
// The BERT architecture, built from Burn's nn building blocks
// so that pretrained weights can be loaded into it:
//
//   input_ids ──► word + position + token-type embeddings
//                   │
//                   ▼
//                 LayerNorm → Dropout
//                   │
//                   ▼
//                 N × encoder layer (post-norm):
//                   • multi-head self-attention (padding masked)
//                   • residual + LayerNorm
//                   • Linear → GELU → Linear
//                   • residual + LayerNorm
//                   │
//                   ▼
//                 pooler: hidden state of the first ([CLS])
//                 token → Linear → tanh  ──►  pooled [batch, hidden]
//
// In this crate the encoder is only ever used as a frozen
// feature extractor; see ml::model.
//
// Reference: Devlin et al. (2019) BERT
//            Burn Book §3 (Building Blocks)

use anyhow::{ensure, Context, Result};
use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::gelu,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ─── Configuration ────────────────────────────────────────────────────────────
/// The subset of a HuggingFace BERT `config.json` the encoder needs.
/// Unknown keys in the file are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BertConfig {
    pub vocab_size:              usize,
    pub hidden_size:             usize,
    pub num_hidden_layers:       usize,
    pub num_attention_heads:     usize,
    pub intermediate_size:       usize,
    pub max_position_embeddings: usize,
    #[serde(default = "default_type_vocab_size")]
    pub type_vocab_size:         usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps:          f64,
    #[serde(default = "default_dropout")]
    pub hidden_dropout_prob:     f64,
    #[serde(default = "default_dropout")]
    pub attention_probs_dropout_prob: f64,
    #[serde(default = "default_hidden_act")]
    pub hidden_act:              String,
}

fn default_type_vocab_size() -> usize { 2 }
fn default_layer_norm_eps() -> f64 { 1e-12 }
fn default_dropout() -> f64 { 0.1 }
fn default_hidden_act() -> String { "gelu".to_string() }

impl BertConfig {
    /// Read and validate a `config.json`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read encoder config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid encoder config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.num_attention_heads > 0 && self.hidden_size % self.num_attention_heads == 0,
            "hidden_size ({}) must be divisible by num_attention_heads ({})",
            self.hidden_size,
            self.num_attention_heads
        );
        ensure!(
            self.hidden_act == "gelu",
            "Unsupported activation '{}': only 'gelu' encoders can be loaded",
            self.hidden_act
        );
        Ok(())
    }

    /// Build a randomly initialised encoder; weights are loaded afterwards.
    pub fn init<B: Backend>(&self, device: &B::Device) -> BertEncoder<B> {
        let embeddings = BertEmbeddings {
            word:       EmbeddingConfig::new(self.vocab_size, self.hidden_size).init(device),
            position:   EmbeddingConfig::new(self.max_position_embeddings, self.hidden_size).init(device),
            token_type: EmbeddingConfig::new(self.type_vocab_size, self.hidden_size).init(device),
            norm:       self.layer_norm(device),
            dropout:    DropoutConfig::new(self.hidden_dropout_prob).init(),
        };
        let layers = (0..self.num_hidden_layers)
            .map(|_| self.build_layer(device))
            .collect();
        let pooler = BertPooler {
            dense: LinearConfig::new(self.hidden_size, self.hidden_size).init(device),
        };
        BertEncoder { embeddings, layers, pooler }
    }

    fn layer_norm<B: Backend>(&self, device: &B::Device) -> LayerNorm<B> {
        LayerNormConfig::new(self.hidden_size)
            .with_epsilon(self.layer_norm_eps)
            .init(device)
    }

    fn build_layer<B: Backend>(&self, device: &B::Device) -> BertLayer<B> {
        BertLayer {
            attention: MultiHeadAttentionConfig::new(self.hidden_size, self.num_attention_heads)
                .with_dropout(self.attention_probs_dropout_prob)
                .init(device),
            attention_norm: self.layer_norm(device),
            intermediate:   LinearConfig::new(self.hidden_size, self.intermediate_size).init(device),
            output:         LinearConfig::new(self.intermediate_size, self.hidden_size).init(device),
            output_norm:    self.layer_norm(device),
            dropout:        DropoutConfig::new(self.hidden_dropout_prob).init(),
        }
    }
}

// ─── Embeddings ───────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BertEmbeddings<B: Backend> {
    pub word:       Embedding<B>,
    pub position:   Embedding<B>,
    pub token_type: Embedding<B>,
    pub norm:       LayerNorm<B>,
    pub dropout:    Dropout,
}

impl<B: Backend> BertEmbeddings<B> {
    /// input_ids: [batch, seq_len] → [batch, seq_len, hidden]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        // Single-segment input: every token has type 0
        let token_types = Tensor::<B, 2, Int>::zeros([batch_size, seq_len], &device);

        let x = self.word.forward(input_ids)
            + self.position.forward(positions)
            + self.token_type.forward(token_types);
        self.dropout.forward(self.norm.forward(x))
    }
}

// ─── Encoder Layer ────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BertLayer<B: Backend> {
    pub attention:      MultiHeadAttention<B>,
    pub attention_norm: LayerNorm<B>,
    pub intermediate:   Linear<B>,
    pub output:         Linear<B>,
    pub output_norm:    LayerNorm<B>,
    pub dropout:        Dropout,
}

impl<B: Backend> BertLayer<B> {
    /// mask_pad: [batch, seq_len], true at padding positions
    pub fn forward(&self, x: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn = self
            .attention
            .forward(MhaInput::self_attn(x.clone()).mask_pad(mask_pad))
            .context;
        let x = self.attention_norm.forward(x + self.dropout.forward(attn));

        let ff = self.output.forward(gelu(self.intermediate.forward(x.clone())));
        self.output_norm.forward(x + self.dropout.forward(ff))
    }
}

// ─── Pooler ───────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BertPooler<B: Backend> {
    pub dense: Linear<B>,
}

impl<B: Backend> BertPooler<B> {
    /// hidden: [batch, seq_len, hidden] → [batch, hidden]
    pub fn forward(&self, hidden: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, _, d_model] = hidden.dims();
        let first = hidden
            .slice([0..batch_size, 0..1, 0..d_model])
            .reshape([batch_size, d_model]);
        self.dense.forward(first).tanh()
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct BertEncoder<B: Backend> {
    pub embeddings: BertEmbeddings<B>,
    pub layers:     Vec<BertLayer<B>>,
    pub pooler:     BertPooler<B>,
}

impl<B: Backend> BertEncoder<B> {
    /// input_ids, attention_mask: [batch, seq_len] → pooled output [batch, hidden]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let mask_pad = attention_mask.equal_elem(0);

        let mut x = self.embeddings.forward(input_ids);
        for layer in &self.layers {
            x = layer.forward(x, mask_pad.clone());
        }
        self.pooler.forward(x)
    }
}

// ─── Test Fixture ─────────────────────────────────────────────────────────────
/// A BERT small enough to run in unit tests
#[cfg(test)]
pub(crate) fn tiny_config() -> BertConfig {
    BertConfig {
        vocab_size:              32,
        hidden_size:             8,
        num_hidden_layers:       2,
        num_attention_heads:     2,
        intermediate_size:       16,
        max_position_embeddings: 16,
        type_vocab_size:         2,
        layer_norm_eps:          1e-12,
        hidden_dropout_prob:     0.1,
        attention_probs_dropout_prob: 0.1,
        hidden_act:              "gelu".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn ints(values: &[i32], shape: [usize; 2]) -> Tensor<TestBackend, 2, Int> {
        Tensor::<TestBackend, 1, Int>::from_ints(values, &Default::default()).reshape(shape)
    }

    #[test]
    fn test_pooled_output_shape() {
        let encoder = tiny_config().init::<TestBackend>(&Default::default());
        let pooled  = encoder.forward(
            ints(&[2, 5, 6, 3, 2, 7, 0, 0], [2, 4]),
            ints(&[1, 1, 1, 1, 1, 1, 0, 0], [2, 4]),
        );
        assert_eq!(pooled.dims(), [2, 8]);

        // tanh keeps every pooled value in [-1, 1]
        let values: Vec<f32> = pooled.into_data().convert::<f32>().to_vec().unwrap();
        assert!(values.iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn test_padding_does_not_change_pooled_output() {
        let encoder = tiny_config().init::<TestBackend>(&Default::default());

        let short = encoder.forward(ints(&[2, 5, 6], [1, 3]), ints(&[1, 1, 1], [1, 3]));
        let padded = encoder.forward(
            ints(&[2, 5, 6, 0, 0, 0], [1, 6]),
            ints(&[1, 1, 1, 0, 0, 0], [1, 6]),
        );

        let a: Vec<f32> = short.into_data().convert::<f32>().to_vec().unwrap();
        let b: Vec<f32> = padded.into_data().convert::<f32>().to_vec().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-4, "{x} vs {y}");
        }
    }

    #[test]
    fn test_config_parses_huggingface_json() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{
            "architectures": ["BertForMaskedLM"],
            "model_type": "bert",
            "vocab_size": 30522,
            "hidden_size": 768,
            "num_hidden_layers": 12,
            "num_attention_heads": 12,
            "intermediate_size": 3072,
            "max_position_embeddings": 512,
            "type_vocab_size": 2,
            "hidden_act": "gelu"
        }"#).unwrap();

        let cfg = BertConfig::load(&path).unwrap();
        assert_eq!(cfg.hidden_size, 768);
        assert_eq!(cfg.layer_norm_eps, 1e-12);
    }

    #[test]
    fn test_config_rejects_bad_head_count() {
        let mut cfg = tiny_config();
        cfg.num_attention_heads = 3;
        assert!(cfg.validate().is_err());
    }
}
