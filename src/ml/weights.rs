// ============================================================
// Layer 5 — Pretrained Weight Loading
// ============================================================
// Copies a HuggingFace BERT `model.safetensors` into a
// BertEncoder built from the matching config.json.
//
// Name mapping (HuggingFace → this crate):
//   embeddings.word_embeddings.weight         → embeddings.word
//   embeddings.position_embeddings.weight     → embeddings.position
//   embeddings.token_type_embeddings.weight   → embeddings.token_type
//   embeddings.LayerNorm                      → embeddings.norm
//   encoder.layer.{i}.attention.self.query    → layers[i].attention.query
//   encoder.layer.{i}.attention.self.key      → layers[i].attention.key
//   encoder.layer.{i}.attention.self.value    → layers[i].attention.value
//   encoder.layer.{i}.attention.output.dense  → layers[i].attention.output
//   encoder.layer.{i}.attention.output.LayerNorm → layers[i].attention_norm
//   encoder.layer.{i}.intermediate.dense      → layers[i].intermediate
//   encoder.layer.{i}.output.dense            → layers[i].output
//   encoder.layer.{i}.output.LayerNorm        → layers[i].output_norm
//   pooler.dense                              → pooler.dense
//
// Checkpoints exported from BertForPreTraining prefix every name
// with "bert.", and older ones name LayerNorm parameters
// gamma/beta instead of weight/bias. Both are accepted.
//
// PyTorch stores Linear weights as [out, in]; Burn as [in, out].
//
// Reference: safetensors crate documentation

use anyhow::{bail, Context, Result};
use burn::{
    module::Param,
    nn::{Embedding, LayerNorm, Linear},
    prelude::*,
};
use safetensors::{tensor::TensorView, Dtype, SafeTensors};
use std::path::Path;

use crate::infra::model_hub::PretrainedFiles;
use crate::ml::encoder::{BertConfig, BertEncoder};

/// Build the encoder described by `files.config` and fill it with
/// the weights in `files.weights`.
pub fn load_pretrained_encoder<B: Backend>(
    files:  &PretrainedFiles,
    device: &B::Device,
) -> Result<(BertConfig, BertEncoder<B>)> {
    let config  = BertConfig::load(&files.config)?;
    let encoder = load_bert_weights(config.init::<B>(device), &files.weights, device)?;
    tracing::info!(
        "Encoder ready: {} layers, hidden_size={}",
        config.num_hidden_layers,
        config.hidden_size
    );
    Ok((config, encoder))
}

/// Load `path` into `encoder`, returning the updated encoder.
pub fn load_bert_weights<B: Backend>(
    encoder: BertEncoder<B>,
    path:    impl AsRef<Path>,
    device:  &B::Device,
) -> Result<BertEncoder<B>> {
    let path  = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Cannot read weights '{}'", path.display()))?;
    let tensors = SafeTensors::deserialize(&bytes)
        .map_err(|e| anyhow::anyhow!("Cannot parse safetensors '{}': {e}", path.display()))?;

    let reader = WeightReader::new(&tensors, device);
    let encoder = reader.load_encoder(encoder)?;
    tracing::info!("Loaded {} pretrained tensors from '{}'", tensors.len(), path.display());
    Ok(encoder)
}

struct WeightReader<'a, B: Backend> {
    tensors: &'a SafeTensors<'a>,
    prefix:  &'static str,
    device:  &'a B::Device,
}

impl<'a, B: Backend> WeightReader<'a, B> {
    fn new(tensors: &'a SafeTensors<'a>, device: &'a B::Device) -> Self {
        let prefixed = tensors
            .names()
            .iter()
            .any(|n| n.starts_with("bert.embeddings."));
        Self { tensors, prefix: if prefixed { "bert." } else { "" }, device }
    }

    fn load_encoder(&self, mut enc: BertEncoder<B>) -> Result<BertEncoder<B>> {
        enc.embeddings.word       = self.embedding(enc.embeddings.word, "embeddings.word_embeddings")?;
        enc.embeddings.position   = self.embedding(enc.embeddings.position, "embeddings.position_embeddings")?;
        enc.embeddings.token_type = self.embedding(enc.embeddings.token_type, "embeddings.token_type_embeddings")?;
        enc.embeddings.norm       = self.layer_norm(enc.embeddings.norm, "embeddings.LayerNorm")?;

        let mut layers = Vec::with_capacity(enc.layers.len());
        for (i, mut layer) in enc.layers.into_iter().enumerate() {
            let base = format!("encoder.layer.{i}");
            layer.attention.query  = self.linear(layer.attention.query,  &format!("{base}.attention.self.query"))?;
            layer.attention.key    = self.linear(layer.attention.key,    &format!("{base}.attention.self.key"))?;
            layer.attention.value  = self.linear(layer.attention.value,  &format!("{base}.attention.self.value"))?;
            layer.attention.output = self.linear(layer.attention.output, &format!("{base}.attention.output.dense"))?;
            layer.attention_norm   = self.layer_norm(layer.attention_norm, &format!("{base}.attention.output.LayerNorm"))?;
            layer.intermediate     = self.linear(layer.intermediate, &format!("{base}.intermediate.dense"))?;
            layer.output           = self.linear(layer.output,       &format!("{base}.output.dense"))?;
            layer.output_norm      = self.layer_norm(layer.output_norm, &format!("{base}.output.LayerNorm"))?;
            layers.push(layer);
        }
        enc.layers = layers;

        enc.pooler.dense = self.linear(enc.pooler.dense, "pooler.dense")?;
        Ok(enc)
    }

    fn embedding(&self, mut emb: Embedding<B>, name: &str) -> Result<Embedding<B>> {
        let weight = self.tensor::<2>(&[&format!("{name}.weight")], emb.weight.dims())?;
        emb.weight = Param::from_tensor(weight);
        Ok(emb)
    }

    fn linear(&self, mut linear: Linear<B>, name: &str) -> Result<Linear<B>> {
        let [d_in, d_out] = linear.weight.dims();
        let weight = self.tensor::<2>(&[&format!("{name}.weight")], [d_out, d_in])?;
        linear.weight = Param::from_tensor(weight.transpose());
        linear.bias = Some(Param::from_tensor(
            self.tensor::<1>(&[&format!("{name}.bias")], [d_out])?,
        ));
        Ok(linear)
    }

    fn layer_norm(&self, mut norm: LayerNorm<B>, name: &str) -> Result<LayerNorm<B>> {
        let dims = norm.gamma.dims();
        let gamma = self.tensor::<1>(&[&format!("{name}.weight"), &format!("{name}.gamma")], dims)?;
        let beta  = self.tensor::<1>(&[&format!("{name}.bias"),   &format!("{name}.beta")],  dims)?;
        norm.gamma = Param::from_tensor(gamma);
        norm.beta  = Param::from_tensor(beta);
        Ok(norm)
    }

    /// First tensor found among `names`, checked against `expected` shape
    fn tensor<const D: usize>(&self, names: &[&str], expected: [usize; D]) -> Result<Tensor<B, D>> {
        for name in names {
            let full = format!("{}{}", self.prefix, name);
            let Ok(view) = self.tensors.tensor(&full) else { continue };

            if view.shape() != expected.as_slice() {
                bail!(
                    "Tensor '{}' has shape {:?}, expected {:?}",
                    full,
                    view.shape(),
                    expected
                );
            }
            let values = to_f32_vec(&view).with_context(|| format!("Tensor '{full}'"))?;
            return Ok(Tensor::from_data(TensorData::new(values, expected), self.device));
        }
        bail!("Pretrained weights are missing tensor '{}{}'", self.prefix, names[0])
    }
}

/// Decode little-endian F32/F16/BF16 data to f32
fn to_f32_vec(view: &TensorView<'_>) -> Result<Vec<f32>> {
    let data = view.data();
    let values = match view.dtype() {
        Dtype::F32 => data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        Dtype::F16 => data
            .chunks_exact(2)
            .map(|c| half::f16::from_bits(u16::from_le_bytes([c[0], c[1]])).to_f32())
            .collect(),
        Dtype::BF16 => data
            .chunks_exact(2)
            .map(|c| half::bf16::from_bits(u16::from_le_bytes([c[0], c[1]])).to_f32())
            .collect(),
        other => bail!("Unsupported dtype {other:?}"),
    };
    Ok(values)
}
