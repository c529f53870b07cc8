// ============================================================
// Layer 4 — Review Loaders
// ============================================================
// Two ways to obtain the labelled movie-review corpus:
//
//   HfReviewSource   — downloads a HuggingFace dataset (default
//                      "imdb") through Burn's HuggingfaceDatasetLoader.
//                      The first call fetches the data and caches it
//                      as a SQLite file; later calls read the cache.
//
//   AclImdbDirSource — reads an already extracted Stanford
//                      aclImdb archive from disk:
//                        <root>/train/pos/*.txt
//                        <root>/train/neg/*.txt
//                        <root>/test/pos/*.txt
//                        <root>/test/neg/*.txt
//
// Both implement the ReviewSource trait from Layer 3, so the
// application layer never knows where reviews came from.
//
// Reference: Burn Book §4 (Datasets)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use burn::data::dataset::{source::huggingface::HuggingfaceDatasetLoader, Dataset};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::review::Review;
use crate::domain::sentiment::{Sentiment, Split};
use crate::domain::traits::ReviewSource;

// ─── HuggingFace Hub ─────────────────────────────────────────────────────────

/// Row layout of the "imdb" dataset on the hub
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HfReviewItem {
    pub text:  String,
    pub label: usize,
}

pub struct HfReviewSource {
    /// Dataset name on the hub, e.g. "imdb"
    dataset: String,
    /// Where the SQLite cache lives (Burn's default when None)
    cache_dir: Option<PathBuf>,
}

impl HfReviewSource {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self { dataset: dataset.into(), cache_dir: None }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }
}

impl ReviewSource for HfReviewSource {
    fn load_split(&self, split: Split) -> Result<Vec<Review>> {
        tracing::info!("Fetching '{}' split '{}' from the HuggingFace hub", self.dataset, split);

        let mut loader = HuggingfaceDatasetLoader::new(&self.dataset);
        if let Some(dir) = &self.cache_dir {
            loader = loader.with_base_dir(&dir.to_string_lossy());
        }
        let dataset = loader
            .dataset::<HfReviewItem>(split.as_str())
            .map_err(|e| anyhow::anyhow!(
                "Cannot load dataset '{}' split '{}': {e}", self.dataset, split
            ))?;

        dataset
            .iter()
            .map(|item| to_review(item, &self.dataset))
            .collect()
    }
}

/// 0 = negative, 1 = positive; any other label is an error
fn to_review(item: HfReviewItem, dataset: &str) -> Result<Review> {
    let label = Sentiment::from_index(item.label)
        .with_context(|| format!("Unexpected label {} in '{}'", item.label, dataset))?;
    Ok(Review::new(item.text, label))
}

// ─── Extracted aclImdb Directory ──────────────────────────────────────────────

pub struct AclImdbDirSource {
    root: PathBuf,
}

impl AclImdbDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ReviewSource for AclImdbDirSource {
    fn load_split(&self, split: Split) -> Result<Vec<Review>> {
        let split_dir = self.root.join(split.as_str());
        if !split_dir.is_dir() {
            bail!("Review directory '{}' does not exist", split_dir.display());
        }

        let mut reviews = Vec::new();
        for (sub, label) in [("neg", Sentiment::Negative), ("pos", Sentiment::Positive)] {
            let dir = split_dir.join(sub);
            if !dir.is_dir() {
                tracing::warn!("Missing '{}' — no {} reviews loaded", dir.display(), label);
                continue;
            }
            for path in sorted_text_files(&dir)? {
                match fs::read_to_string(&path) {
                    Ok(text) => reviews.push(Review::new(text, label)),
                    // Skip the file but keep going
                    Err(e) => tracing::warn!("Skipping '{}': {}", path.display(), e),
                }
            }
        }

        tracing::info!(
            "Loaded {} '{}' reviews from '{}'",
            reviews.len(),
            split,
            self.root.display()
        );
        Ok(reviews)
    }
}

/// All `*.txt` files in `dir`, sorted by path for a deterministic order
fn sorted_text_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn test_reads_pos_and_neg_folders() {
        let root = tempfile::tempdir().unwrap();
        let train = root.path().join("train");
        write(&train.join("pos"), "1_9.txt", "Wonderful acting.");
        write(&train.join("pos"), "0_10.txt", "A masterpiece.");
        write(&train.join("neg"), "2_1.txt", "Dreadful.");
        // Non-review files are ignored
        write(&train.join("neg"), "urls.lst", "http://example.invalid");

        let reviews = AclImdbDirSource::new(root.path()).load_split(Split::Train).unwrap();

        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0], Review::new("Dreadful.", Sentiment::Negative));
        // Sorted by filename within a class
        assert_eq!(reviews[1].text, "A masterpiece.");
        assert_eq!(reviews[2].label, Sentiment::Positive);
    }

    #[test]
    fn test_hub_rows_map_to_reviews() {
        let row = HfReviewItem { text: "Loved it".to_string(), label: 1 };
        assert_eq!(
            to_review(row, "imdb").unwrap(),
            Review::new("Loved it", Sentiment::Positive)
        );

        let row = HfReviewItem { text: "Meh".to_string(), label: 0 };
        assert_eq!(to_review(row, "imdb").unwrap().label, Sentiment::Negative);
    }

    #[test]
    fn test_unknown_hub_label_is_an_error() {
        let row = HfReviewItem { text: "Unlabelled".to_string(), label: 2 };
        let err = to_review(row, "imdb").unwrap_err();
        assert!(err.to_string().contains("Unexpected label 2"));
    }

    #[test]
    fn test_missing_split_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err  = AclImdbDirSource::new(root.path()).load_split(Split::Test);
        assert!(err.is_err());
    }
}
