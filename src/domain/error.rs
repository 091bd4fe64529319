// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Structural failures of the pipeline. I/O, HTTP and archive
// errors stay as the underlying library errors wrapped in
// anyhow; these variants cover the conditions the pipeline
// itself detects.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("corpus path '{0}' does not exist")]
    MissingCorpus(PathBuf),

    #[error("normalized corpus is empty, nothing to train on")]
    EmptyCorpus,

    #[error("window length must be at least 1, got {0}")]
    InvalidWindowLength(usize),

    #[error(
        "window length {window_length} leaves no training examples: \
         all {units} sentence units have at most {window_length} tokens"
    )]
    EmptyTrainingSet { window_length: usize, units: usize },

    #[error("config.json declares window length {configured}, but the model was trained with {trained}")]
    WindowLengthMismatch { trained: usize, configured: usize },

    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),
}
