// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores the fitted model and the configuration
// needed to rebuild it.
//
// What gets written per export:
//   1. model_compact.mpk  — CompactRecorder (named MessagePack,
//                           half precision)
//   2. model.bin          — BinFileRecorder, full precision
//   3. train_config.json  — hyper-parameters of the run
//
// The two weight files hold the same parameters. The query side
// loads model.bin, so a reload reproduces the trained weights
// exactly.
//
// Layout:
//   export/
//     model_compact.mpk
//     model.bin
//     train_config.json
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{BinFileRecorder, CompactRecorder, FullPrecisionSettings, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::NextWordModel;

const COMPACT_STEM: &str = "model_compact";
const BINARY_STEM:  &str = "model";
const CONFIG_FILE:  &str = "train_config.json";

/// All files are stored in the configured directory.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    /// Write the model in both native formats. Returns the two paths.
    pub fn save_model<B: Backend>(&self, model: &NextWordModel<B>) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        // Recorders append their own extension
        let compact = self.dir.join(COMPACT_STEM);
        CompactRecorder::new()
            .record(model.clone().into_record(), compact.clone())
            .with_context(|| format!("Failed to save model to '{}'", compact.display()))?;

        let binary = self.dir.join(BINARY_STEM);
        BinFileRecorder::<FullPrecisionSettings>::new()
            .record(model.clone().into_record(), binary.clone())
            .with_context(|| format!("Failed to save model to '{}'", binary.display()))?;

        tracing::info!("Saved model weights to '{}'", self.dir.display());
        Ok((compact.with_extension("mpk"), binary.with_extension("bin")))
    }

    /// Restore weights from model.bin into a freshly initialised model.
    ///
    /// The model must have the architecture the weights were saved
    /// with, or loading fails.
    pub fn load_model<B: Backend>(
        &self,
        model:  NextWordModel<B>,
        device: &B::Device,
    ) -> Result<NextWordModel<B>> {
        let path = self.dir.join(BINARY_STEM);
        let record = BinFileRecorder::<FullPrecisionSettings>::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model '{}'. Have you trained the model first?",
                    path.with_extension("bin").display())
            })?;
        Ok(model.load_record(record))
    }

    /// Restore weights from the compact half-precision file.
    pub fn load_compact_model<B: Backend>(
        &self,
        model:  NextWordModel<B>,
        device: &B::Device,
    ) -> Result<NextWordModel<B>> {
        let path = self.dir.join(COMPACT_STEM);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load model '{}'", path.with_extension("mpk").display()))?;
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'query'.",
                    path.display()
                )
            })?;
        Ok(serde_json::from_str(&json)?)
    }
}
