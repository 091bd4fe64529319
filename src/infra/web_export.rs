// ============================================================
// Layer 6 — Portable Web Export
// ============================================================
// Writes the fitted model as a directory a non-Rust runtime can
// pick apart without burn's native file formats:
//
//   web_model/
//     model.json              — layer topology + weights manifest
//     group1-shard1of2.bin    — full-precision weight record,
//     group1-shard2of2.bin      split into 4 MiB pieces
//
// model.json layout:
//   {
//     "format": "layers-model",
//     "modelTopology": { "class_name": "Sequential",
//                        "config": { "layers": [ InputLayer, Embedding,
//                                                LSTM, LSTM, Dense ] } },
//     "weightsManifest": [ { "paths": [...shards], "weights": [...] } ]
//   }
//
// The first layer is always an InputLayer whose batch_input_shape
// is [null, window_length]. Concatenating the shards listed in the
// manifest gives back the exact record, so `load` restores the model.

use anyhow::{Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
};
use serde_json::{json, Value};

use crate::ml::model::{NextWordModel, NextWordModelConfig};

pub const SHARD_BYTES: usize = 4 * 1024 * 1024;
const TOPOLOGY_FILE: &str = "model.json";

/// Input declaration of the first layer, as read back from model.json.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSignature {
    pub class_name:        String,
    pub batch_input_shape: Vec<Option<usize>>,
}

pub struct WebExporter {
    dir:         PathBuf,
    shard_bytes: usize,
}

impl WebExporter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), shard_bytes: SHARD_BYTES }
    }

    pub fn with_shard_bytes(mut self, shard_bytes: usize) -> Self {
        self.shard_bytes = shard_bytes.max(1);
        self
    }

    /// Write topology and weight shards. Returns the shard file names.
    pub fn export<B: Backend>(
        &self,
        model:     &NextWordModel<B>,
        model_cfg: &NextWordModelConfig,
    ) -> Result<Vec<String>> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        // ── Step 1: serialise the record to bytes ────────────────────────────
        let bytes = BinBytesRecorder::<FullPrecisionSettings>::default()
            .record(model.clone().into_record(), ())
            .context("Cannot serialise model record")?;

        // ── Step 2: write shards ─────────────────────────────────────────────
        let shards = split_shards(&bytes, self.shard_bytes);
        let names  = shard_names(shards.len());
        for (name, shard) in names.iter().zip(&shards) {
            let path = self.dir.join(name);
            fs::write(&path, shard)
                .with_context(|| format!("Cannot write shard '{}'", path.display()))?;
        }

        // ── Step 3: topology + manifest ──────────────────────────────────────
        let model_json = json!({
            "format": "layers-model",
            "generatedBy": concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION")),
            "modelTopology": topology(model_cfg),
            "weightsManifest": [{
                "paths": names,
                "weights": [{
                    "name": "next_word_model",
                    "dtype": "burn-bin-f32",
                    "byteLength": bytes.len(),
                }],
            }],
        });
        let path = self.dir.join(TOPOLOGY_FILE);
        fs::write(&path, serde_json::to_string_pretty(&model_json)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;

        tracing::info!(
            "Portable model written to '{}' ({} bytes in {} shards)",
            self.dir.display(), bytes.len(), names.len(),
        );
        Ok(names)
    }

    /// Reassemble the shards listed in model.json into a model of
    /// the same architecture.
    pub fn load<B: Backend>(
        &self,
        model:  NextWordModel<B>,
        device: &B::Device,
    ) -> Result<NextWordModel<B>> {
        let manifest = self.read_topology()?;
        let paths = manifest["weightsManifest"][0]["paths"]
            .as_array()
            .context("model.json has no weightsManifest paths")?;

        let mut bytes = Vec::new();
        for name in paths {
            let name = name.as_str().context("shard path is not a string")?;
            let path = self.dir.join(name);
            bytes.extend(
                fs::read(&path).with_context(|| format!("Cannot read shard '{}'", path.display()))?,
            );
        }

        let record = BinBytesRecorder::<FullPrecisionSettings>::default()
            .load(bytes, device)
            .context("Shards do not form a valid model record")?;
        Ok(model.load_record(record))
    }

    /// Read back the first layer's declared input.
    pub fn inspect(&self) -> Result<InputSignature> {
        let topology = self.read_topology()?;
        let first    = &topology["modelTopology"]["config"]["layers"][0];

        let class_name = first["class_name"]
            .as_str()
            .context("first layer has no class_name")?
            .to_string();
        let batch_input_shape = first["config"]["batch_input_shape"]
            .as_array()
            .context("first layer has no batch_input_shape")?
            .iter()
            .map(|d| d.as_u64().map(|d| d as usize))
            .collect();

        Ok(InputSignature { class_name, batch_input_shape })
    }

    /// Print the first layer's input shape. Never fails the export.
    pub fn sanity_check(&self) -> Option<InputSignature> {
        match self.inspect() {
            Ok(sig) => {
                let dims: Vec<String> = sig
                    .batch_input_shape
                    .iter()
                    .map(|d| d.map_or("null".to_string(), |d| d.to_string()))
                    .collect();
                println!("Portable model input: {} [{}]", sig.class_name, dims.join(", "));
                Some(sig)
            }
            Err(e) => {
                tracing::warn!("Could not re-read portable model: {:#}", e);
                None
            }
        }
    }

    fn read_topology(&self) -> Result<Value> {
        let path = self.dir.join(TOPOLOGY_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Malformed '{}'", path.display()))
    }
}

fn topology(cfg: &NextWordModelConfig) -> Value {
    json!({
        "class_name": "Sequential",
        "config": {
            "name": "next_word_lstm",
            "layers": [
                { "class_name": "InputLayer",
                  "config": { "name": "context", "batch_input_shape": [null, cfg.window_length], "dtype": "int32" } },
                { "class_name": "Embedding",
                  "config": { "name": "embedding", "input_dim": cfg.class_count, "output_dim": cfg.embedding_dim } },
                { "class_name": "LSTM",
                  "config": { "name": "sequence_lstm", "units": cfg.hidden_dim, "return_sequences": true } },
                { "class_name": "LSTM",
                  "config": { "name": "summary_lstm", "units": cfg.hidden_dim, "return_sequences": false } },
                { "class_name": "Dense",
                  "config": { "name": "output", "units": cfg.class_count, "activation": "softmax" } },
            ],
        },
    })
}

/// Split `bytes` into pieces of at most `size` bytes (at least one piece).
pub fn split_shards(bytes: &[u8], size: usize) -> Vec<&[u8]> {
    if bytes.is_empty() {
        return vec![bytes];
    }
    bytes.chunks(size.max(1)).collect()
}

/// `group1-shard{i}of{n}.bin` for i in 1..=n.
pub fn shard_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("group1-shard{i}of{count}.bin")).collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use tempfile::tempdir;

    fn small_cfg() -> NextWordModelConfig {
        NextWordModelConfig::new(9, 4).with_embedding_dim(4).with_hidden_dim(5)
    }

    fn probs(model: &NextWordModel<NdArray>) -> Vec<f32> {
        let input = Tensor::<NdArray, 2, Int>::from_ints(
            TensorData::new(vec![0i32, 2, 3, 8], [1, 4]),
            &Default::default(),
        );
        model.forward_probs(input).into_data().convert::<f32>().to_vec().unwrap()
    }

    #[test]
    fn test_shard_helpers() {
        let bytes = [1u8, 2, 3, 4, 5];
        let parts = split_shards(&bytes, 2);
        assert_eq!(parts, vec![&[1u8, 2][..], &[3, 4][..], &[5][..]]);
        assert_eq!(split_shards(&[], 4).len(), 1);
        assert_eq!(shard_names(2), vec!["group1-shard1of2.bin", "group1-shard2of2.bin"]);
    }

    #[test]
    fn test_export_declares_window_input_and_reloads() {
        let dir      = tempdir().unwrap();
        let device   = Default::default();
        let cfg      = small_cfg();
        let model    = cfg.init::<NdArray>(&device);
        let exporter = WebExporter::new(dir.path().join("web_model")).with_shard_bytes(256);

        let names = exporter.export(&model, &cfg).unwrap();
        assert!(names.len() > 1, "expected several shards, got {names:?}");

        let sig = exporter.sanity_check().unwrap();
        assert_eq!(sig.class_name, "InputLayer");
        assert_eq!(sig.batch_input_shape, vec![None, Some(4)]);

        let reloaded = exporter.load(cfg.init::<NdArray>(&device), &device).unwrap();
        assert_eq!(probs(&reloaded), probs(&model));
    }

    #[test]
    fn test_sanity_check_never_fails() {
        let dir = tempdir().unwrap();
        assert!(WebExporter::new(dir.path()).sanity_check().is_none());
    }
}
