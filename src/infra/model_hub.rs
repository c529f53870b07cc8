// ============================================================
// Layer 6 — Pretrained Model Hub
// ============================================================
// Resolves the three files a pretrained encoder needs:
//
//   config.json        — architecture (hidden size, layers, ...)
//   model.safetensors  — weights
//   tokenizer.json     — vocabulary + normaliser rules
//
// Either from a local directory (offline use) or from the
// HuggingFace Hub via hf-hub, which downloads each file once
// and serves it from its on-disk cache afterwards.
//
// Reference: hf-hub crate documentation

use anyhow::{bail, Result};
use hf_hub::api::sync::{Api, ApiBuilder};
use std::path::{Path, PathBuf};

const CONFIG_FILE:    &str = "config.json";
const WEIGHTS_FILE:   &str = "model.safetensors";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Local paths of a pretrained encoder's files
#[derive(Debug, Clone, PartialEq)]
pub struct PretrainedFiles {
    pub config:    PathBuf,
    pub weights:   PathBuf,
    pub tokenizer: PathBuf,
}

impl PretrainedFiles {
    /// Use files from a local directory; all three must exist.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let files = Self {
            config:    dir.join(CONFIG_FILE),
            weights:   dir.join(WEIGHTS_FILE),
            tokenizer: dir.join(TOKENIZER_FILE),
        };
        for path in [&files.config, &files.weights, &files.tokenizer] {
            if !path.is_file() {
                bail!("Pretrained file '{}' not found", path.display());
            }
        }
        Ok(files)
    }
}

pub struct ModelHub {
    /// hf-hub cache location (hf-hub's default when None)
    cache_dir: Option<PathBuf>,
}

impl ModelHub {
    pub fn new() -> Self {
        Self { cache_dir: None }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Local directory if given, otherwise download `model_id`
    pub fn resolve(&self, model_id: &str, local_dir: Option<&str>) -> Result<PretrainedFiles> {
        match local_dir {
            Some(dir) => {
                tracing::info!("Using pretrained files from '{}'", dir);
                PretrainedFiles::from_dir(dir)
            }
            None => self.fetch(model_id),
        }
    }

    /// Download (or reuse cached) files for `model_id`, e.g. "bert-base-uncased"
    pub fn fetch(&self, model_id: &str) -> Result<PretrainedFiles> {
        tracing::info!("Fetching pretrained model '{}' from the HuggingFace hub", model_id);
        let repo = self.build_api()?.model(model_id.to_string());

        let get = |file: &str| {
            repo.get(file).map_err(|e| {
                anyhow::anyhow!("Cannot download '{file}' for '{model_id}': {e}")
            })
        };

        let files = PretrainedFiles {
            config:    get(CONFIG_FILE)?,
            weights:   get(WEIGHTS_FILE)?,
            tokenizer: get(TOKENIZER_FILE)?,
        };
        tracing::debug!("Pretrained files: {:?}", files);
        Ok(files)
    }

    fn build_api(&self) -> Result<Api> {
        let mut builder = ApiBuilder::new();
        if let Some(dir) = &self.cache_dir {
            builder = builder.with_cache_dir(dir.clone());
        }
        builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialise HuggingFace hub client: {e}"))
    }
}

impl Default for ModelHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_dir_with_all_files() {
        let dir = tempfile::tempdir().unwrap();
        for f in [CONFIG_FILE, WEIGHTS_FILE, TOKENIZER_FILE] {
            std::fs::write(dir.path().join(f), b"{}").unwrap();
        }
        let dir_str = dir.path().to_string_lossy().into_owned();

        let files = ModelHub::new().resolve("ignored", Some(&dir_str)).unwrap();
        assert_eq!(files.weights, dir.path().join("model.safetensors"));
    }

    #[test]
    fn test_local_dir_missing_weights() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), b"{}").unwrap();
        std::fs::write(dir.path().join(TOKENIZER_FILE), b"{}").unwrap();

        let err = PretrainedFiles::from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("model.safetensors"));
    }
}
