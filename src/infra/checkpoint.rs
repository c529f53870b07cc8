// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the classifier head with Burn's
// CompactRecorder. The encoder is never written: it is frozen,
// so it is rebuilt from the pretrained files on every load.
//
// Directory layout:
//   checkpoints/
//     head_epoch_1.mpk       ← head weights after epoch 1
//     head_epoch_2.mpk
//     ...
//     latest_epoch.json      ← last epoch written
//     best_epoch.json        ← epoch with the lowest val loss
//     train_config.json      ← hyperparameters of the run
//     metrics.csv            ← see infra::metrics
//
// Loading prefers best_epoch.json and falls back to
// latest_epoch.json when no best epoch was recorded.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::ClassifierHead;

const LATEST_FILE: &str = "latest_epoch.json";
const BEST_FILE:   &str = "best_epoch.json";
const CONFIG_FILE: &str = "train_config.json";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Write `{dir}/head_epoch_{epoch}.mpk` and move the latest pointer.
    pub fn save_head<B: Backend>(&self, head: &ClassifierHead<B>, epoch: usize) -> Result<()> {
        // Extension is appended by the recorder
        let path = self.head_path(epoch);

        CompactRecorder::new()
            .record(head.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        self.write_epoch(LATEST_FILE, epoch)?;
        tracing::debug!("Saved head checkpoint: epoch {}", epoch);
        Ok(())
    }

    pub fn mark_best(&self, epoch: usize) -> Result<()> {
        self.write_epoch(BEST_FILE, epoch)
    }

    /// Epoch a later load will use: best if recorded, else latest.
    pub fn selected_epoch(&self) -> Result<usize> {
        if let Some(epoch) = self.read_epoch(BEST_FILE)? {
            return Ok(epoch);
        }
        self.read_epoch(LATEST_FILE)?.with_context(|| {
            format!(
                "No checkpoint found in '{}'. Have you run 'train' first?",
                self.dir.display()
            )
        })
    }

    /// Restore head weights into `head`, which must have the saved architecture.
    pub fn load_head<B: Backend>(
        &self,
        head:   ClassifierHead<B>,
        device: &B::Device,
    ) -> Result<ClassifierHead<B>> {
        let epoch = self.selected_epoch()?;
        let path  = self.head_path(epoch);
        tracing::info!("Loading head checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;
        Ok(head.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' first.",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid training config '{}'", path.display()))
    }

    fn head_path(&self, epoch: usize) -> PathBuf {
        self.dir.join(format!("head_epoch_{epoch}"))
    }

    fn write_epoch(&self, file: &str, epoch: usize) -> Result<()> {
        fs::write(self.dir.join(file), serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write {file}"))
    }

    fn read_epoch(&self, file: &str) -> Result<Option<usize>> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(Some(serde_json::from_str::<usize>(s.trim())?))
    }
}
