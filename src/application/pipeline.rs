// ============================================================
// Layer 2 — Shared Pipeline Steps
// ============================================================
// Building blocks used by more than one use case: choosing a
// review source, loading a (sub-sampled) split, resolving the
// pretrained files and rebuilding a trained model from disk.

use anyhow::{ensure, Result};
use burn::backend::wgpu::WgpuDevice;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::sequential_loader,
    dataset::{ReviewDataset, ReviewSample},
    loader::{AclImdbDirSource, HfReviewSource},
    preprocessor::Preprocessor,
    splitter::subsample_stratified,
    tokenization::TokenizerAdapter,
};
use crate::domain::{review::Review, sentiment::Split, traits::ReviewSource};
use crate::infra::{
    checkpoint::CheckpointManager,
    model_hub::{ModelHub, PretrainedFiles},
};
use crate::ml::{
    encoder::BertConfig,
    evaluator::{evaluate, EvalReport},
    model::{ClassifierHeadConfig, SentimentModel},
    weights::load_pretrained_encoder,
    InferBackend,
};

/// Local aclImdb directory if configured, otherwise the HF dataset
pub fn review_source(cfg: &TrainConfig) -> Box<dyn ReviewSource> {
    if let Some(dir) = &cfg.data_dir {
        return Box::new(AclImdbDirSource::new(dir));
    }
    let source = HfReviewSource::new(&cfg.dataset);
    match &cfg.cache_dir {
        Some(dir) => Box::new(source.with_cache_dir(dir)),
        None      => Box::new(source),
    }
}

/// Load one split, capped at `limit` reviews with class balance kept.
pub fn load_reviews(
    source: &dyn ReviewSource,
    split:  Split,
    limit:  Option<usize>,
    seed:   u64,
) -> Result<Vec<Review>> {
    let reviews = source.load_split(split)?;
    tracing::info!("Loaded {} {} reviews", reviews.len(), split);
    Ok(match limit {
        Some(limit) => subsample_stratified(reviews, limit, seed, |r| r.label.index()),
        None        => reviews,
    })
}

pub fn pretrained_files(cfg: &TrainConfig) -> Result<PretrainedFiles> {
    let hub = match &cfg.cache_dir {
        Some(dir) => ModelHub::new().with_cache_dir(dir),
        None      => ModelHub::new(),
    };
    hub.resolve(&cfg.pretrained, cfg.pretrained_dir.as_deref())
}

/// Tokenizer for `files`, checked against the encoder's position table
pub fn load_tokenizer(
    cfg:   &TrainConfig,
    files: &PretrainedFiles,
    bert:  &BertConfig,
) -> Result<TokenizerAdapter> {
    ensure!(
        cfg.max_seq_len <= bert.max_position_embeddings,
        "max_seq_len ({}) exceeds the encoder's max_position_embeddings ({})",
        cfg.max_seq_len,
        bert.max_position_embeddings
    );
    TokenizerAdapter::from_file(&files.tokenizer, cfg.max_seq_len)
}

pub fn head_config(cfg: &TrainConfig, d_input: usize) -> ClassifierHeadConfig {
    ClassifierHeadConfig::new(d_input)
        .with_d_hidden_1(cfg.d_hidden_1)
        .with_d_hidden_2(cfg.d_hidden_2)
        .with_d_hidden_3(cfg.d_hidden_3)
}

/// A model ready for inference: pretrained encoder + saved head
pub struct TrainedModel {
    pub config:    TrainConfig,
    pub model:     SentimentModel<InferBackend>,
    pub tokenizer: TokenizerAdapter,
}

/// Rebuild the model saved under `checkpoint_dir`.
pub fn load_trained_model(
    checkpoint_dir: &str,
    device:         &WgpuDevice,
) -> Result<TrainedModel> {
    let ckpt   = CheckpointManager::new(checkpoint_dir)?;
    let config = ckpt.load_config()?;

    let files           = pretrained_files(&config)?;
    let (bert, encoder) = load_pretrained_encoder::<InferBackend>(&files, device)?;
    let tokenizer       = load_tokenizer(&config, &files, &bert)?;

    let head  = head_config(&config, bert.hidden_size).init::<InferBackend>(device);
    let head  = ckpt.load_head(head, device)?;
    let model = SentimentModel::new(encoder, head);

    Ok(TrainedModel { config, model, tokenizer })
}

/// Tokenise the test split and report loss / accuracy / confusion.
pub fn evaluate_test_split(
    cfg:       &TrainConfig,
    model:     &SentimentModel<InferBackend>,
    tokenizer: &TokenizerAdapter,
    device:    &WgpuDevice,
) -> Result<EvalReport> {
    let source  = review_source(cfg);
    let reviews = load_reviews(source.as_ref(), Split::Test, cfg.max_test_samples, cfg.seed)?;
    let samples = ReviewSample::from_reviews(&reviews, &Preprocessor::new(), tokenizer)?;

    let loader = sequential_loader::<InferBackend>(
        ReviewDataset::new(samples),
        cfg.batch_size,
        cfg.num_workers,
        device.clone(),
    );

    let report = evaluate(model, loader.as_ref())?;
    tracing::info!(
        "Test set: {} reviews, accuracy {:.2}%",
        report.total(),
        report.accuracy() * 100.0
    );
    Ok(report)
}
