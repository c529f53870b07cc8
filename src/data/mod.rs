// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw review corpus to device-ready
// tensor batches:
//
//   HfReviewSource / AclImdbDirSource  → labelled reviews
//       │
//       ▼
//   split_stratified                   → train / validation
//       │
//       ▼
//   Preprocessor                       → clean text
//       │
//       ▼
//   TokenizerAdapter                   → fixed-length ids + mask
//       │
//       ▼
//   ReviewDataset                      → Burn's Dataset trait
//       │
//       ▼
//   ReviewBatcher + DataLoader         → shuffled / sequential batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Fetches the labelled review corpus
pub mod loader;

/// Cleans raw review text
pub mod preprocessor;

/// Stratified train/validation split and subsampling
pub mod splitter;

/// Pretrained tokenizer with fixed padding/truncation
pub mod tokenization;

/// Implements Burn's Dataset trait for tokenised reviews
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
