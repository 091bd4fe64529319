// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch and
// the final evaluation scores to a JSON file next to it.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average categorical cross-entropy over the batches
//   - train_acc:  fraction of windows whose argmax was the target
//
// Output files (inside the export directory):
//   metrics.csv
//   evaluation.json
//
// Example CSV output:
//   epoch,train_loss,train_acc
//   1,7.912300,0.031000
//   2,6.804100,0.058000
//   ...
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

use crate::ml::evaluator::EvalReport;

const CSV_HEADER: &str = "epoch,train_loss,train_acc";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average loss over all batches of the epoch.
    /// An untrained model sits near ln(class_count).
    pub train_loss: f64,

    /// Range: [0.0, 1.0]
    pub train_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, train_acc: f64) -> Self {
        Self { epoch, train_loss, train_acc }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    dir:      PathBuf,
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Starts a fresh CSV holding only the header; rows from an
    /// earlier run in the same directory are discarded.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{CSV_HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { dir, csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(f, "{},{:.6},{:.6}", m.epoch, m.train_loss, m.train_acc)?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, train_acc={:.4}",
            m.epoch, m.train_loss, m.train_acc,
        );
        Ok(())
    }

    /// Write the final evaluation scores as evaluation.json.
    pub fn save_evaluation(&self, report: &EvalReport) -> Result<PathBuf> {
        let path = self.dir.join("evaluation.json");
        fs::write(&path, serde_json::to_string_pretty(report)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        Ok(path)
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
