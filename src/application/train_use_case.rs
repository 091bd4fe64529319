// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load + normalize the corpus      (Layer 4 - data)
//   Step 2: Fit the vocabulary               (Layer 3 - domain)
//   Step 3: Build sliding windows            (Layer 4 - data)
//   Step 4: Run the training loop            (Layer 5 - ml)
//   Step 5: Score the fitted model           (Layer 5 - ml)
//   Step 6: Export every artefact            (Layer 6 - infra)
//   Step 7: Sanity-check the portable model  (Layer 6 - infra)
//
// Nothing is written to the export directory before training has
// finished, apart from the per-epoch metrics rows.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use burn::{prelude::*, tensor::backend::AutodiffBackend};

use crate::data::{
    batcher::WindowBatcher,
    dataset::{WindowDataset, WindowSample},
    loader::{decode_lossy, TextTreeLoader},
    preprocessor::Normalizer,
    sequencer::{sentence_units, SequenceBuilder},
};
use crate::domain::{
    document::Document,
    error::PipelineError,
    traits::DocumentSource,
    vocabulary::Vocabulary,
};
use crate::infra::{
    checkpoint::ModelStore,
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
    web_export::WebExporter,
};
use crate::ml::{
    evaluator::{evaluate, EvalReport},
    model::{NextWordModel, NextWordModelConfig},
    trainer::{train_loop, MyBackend, MyInnerBackend},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved as train_config.json so the query side can rebuild the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// A text file, or a directory walked for *.<extension> files
    pub corpus:        String,
    pub output_dir:    String,
    pub extension:     String,
    pub window_length: usize,
    pub max_vocab:     usize,
    pub embedding_dim: usize,
    pub hidden_dim:    usize,
    pub epochs:        usize,
    pub batch_size:    usize,
    pub lr:            f64,
    /// `None` draws a random seed; the one used is written back
    pub seed:          Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            corpus:        "cleaned.txt".to_string(),
            output_dir:    "export".to_string(),
            extension:     "txt".to_string(),
            window_length: 20,
            max_vocab:     10_000,
            embedding_dim: 128,
            hidden_dim:    256,
            epochs:        20,
            batch_size:    128,
            lr:            1e-3,
            seed:          None,
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self, class_count: usize) -> NextWordModelConfig {
        NextWordModelConfig::new(class_count, self.window_length)
            .with_embedding_dim(self.embedding_dim)
            .with_hidden_dim(self.hidden_dim)
    }
}

/// The corpus after Steps 1-3, ready for the training loop.
#[derive(Debug)]
pub struct PreparedCorpus {
    pub text:       String,
    pub file_count: usize,
    pub vocabulary: Vocabulary,
    pub samples:    Vec<WindowSample>,
}

/// Everything a caller needs to keep querying the fresh model.
pub struct TrainOutcome<B: Backend> {
    pub vocabulary:    Vocabulary,
    pub window_length: usize,
    pub model:         NextWordModel<B>,
    pub device:        B::Device,
    pub evaluation:    EvalReport,
    pub export_dir:    PathBuf,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on the GPU backend.
    pub fn execute(&self) -> Result<TrainOutcome<MyInnerBackend>> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.execute_on::<MyBackend>(device)
    }

    /// Execute the full training pipeline end to end on backend `B`.
    pub fn execute_on<B: AutodiffBackend>(
        &self,
        device: B::Device,
    ) -> Result<TrainOutcome<B::InnerBackend>> {
        let cfg = &self.config;

        // ── Steps 1-3: Corpus → vocabulary → windows ──────────────────────────
        let prepared = self.prepare()?;
        let model_cfg = cfg.model_config(prepared.vocabulary.class_count());

        // ── Step 4: Train ─────────────────────────────────────────────────────
        let seed = cfg.seed.unwrap_or_else(rand::random);
        tracing::info!("Seed: {}", seed);

        let metrics = MetricsLogger::new(&cfg.output_dir)?;
        let model   = train_loop::<B>(
            cfg,
            &model_cfg,
            seed,
            WindowDataset::new(prepared.samples.clone()),
            &metrics,
            device.clone(),
        )?;
        println!("Training complete.");

        // ── Step 5: Evaluate ──────────────────────────────────────────────────
        let batcher    = WindowBatcher::<B::InnerBackend>::new(device.clone(), model_cfg.class_count);
        let evaluation = evaluate(&model, &prepared.samples, &batcher, cfg.batch_size)?;
        metrics.save_evaluation(&evaluation)?;

        // ── Step 6: Export ────────────────────────────────────────────────────
        let resolved = TrainConfig { seed: Some(seed), ..cfg.clone() };
        export_artifacts(&resolved, &prepared, &model_cfg, &model)?;

        // ── Step 7: Sanity check ──────────────────────────────────────────────
        WebExporter::new(web_dir(&cfg.output_dir)).sanity_check();

        Ok(TrainOutcome {
            vocabulary:    prepared.vocabulary,
            window_length: cfg.window_length,
            model,
            device,
            evaluation,
            export_dir:    PathBuf::from(&cfg.output_dir),
        })
    }

    /// Steps 1-3. Fails before any training if nothing can be learned.
    pub fn prepare(&self) -> Result<PreparedCorpus> {
        let cfg = &self.config;

        // ── Step 1: Load + normalize ──────────────────────────────────────────
        let docs   = load_corpus(Path::new(&cfg.corpus), &cfg.extension)?;
        let merged = Normalizer::new().merge(&docs);
        if merged.text.trim().is_empty() {
            return Err(PipelineError::EmptyCorpus.into());
        }
        tracing::info!(
            "Normalized corpus: {} files, {} chars",
            merged.file_count, merged.text.len(),
        );

        // ── Step 2: Vocabulary ────────────────────────────────────────────────
        let vocabulary = Vocabulary::fit_corpus(&merged.text, cfg.max_vocab);
        tracing::info!(
            "Vocabulary: {} tokens (cap {}), {} output classes",
            vocabulary.len() - 1, cfg.max_vocab, vocabulary.class_count(),
        );

        // ── Step 3: Windows ───────────────────────────────────────────────────
        let samples = SequenceBuilder::new(cfg.window_length)?.build(&merged.text, &vocabulary)?;
        tracing::info!("Built {} training windows of length {}", samples.len(), cfg.window_length);

        Ok(PreparedCorpus {
            text:       merged.text,
            file_count: merged.file_count,
            vocabulary,
            samples,
        })
    }
}

/// A directory is walked for matching files; a file is one document.
fn load_corpus(path: &Path, extension: &str) -> Result<Vec<Document>> {
    if path.is_dir() {
        return TextTreeLoader::new(path, extension).load_all();
    }
    if !path.exists() {
        return Err(PipelineError::MissingCorpus(path.to_path_buf()).into());
    }
    let bytes = fs::read(path).with_context(|| format!("Cannot read '{}'", path.display()))?;
    Ok(vec![Document::new(path.display().to_string(), decode_lossy(&bytes))])
}

/// Tokens re-encoded when checking tokenizer.json against the vocabulary.
const VERIFY_TOKENS: usize = 300;

fn verification_sample(unit: &str, max_tokens: usize) -> String {
    unit.split_whitespace().take(max_tokens).collect::<Vec<_>>().join(" ")
}

fn web_dir(output_dir: &str) -> PathBuf {
    Path::new(output_dir).join("web_model")
}

/// Write vocab.json, tokenizer.json, config.json, train_config.json,
/// both native weight files and the portable web model.
pub fn export_artifacts<B: Backend>(
    cfg:       &TrainConfig,
    prepared:  &PreparedCorpus,
    model_cfg: &NextWordModelConfig,
    model:     &NextWordModel<B>,
) -> Result<()> {
    let sidecars = TokenizerStore::new(&cfg.output_dir);
    sidecars.save_vocabulary(&prepared.vocabulary)?;
    sidecars.save_window_config(cfg.window_length)?;

    let tokenizer = sidecars.save_tokenizer(&prepared.vocabulary)?;
    if let Some(sample) = sentence_units(&prepared.text).next() {
        let sample = verification_sample(sample, VERIFY_TOKENS);
        TokenizerStore::verify(&tokenizer, &prepared.vocabulary, &sample)?;
    }

    let store = ModelStore::new(&cfg.output_dir);
    store.save_config(cfg)?;
    store.save_model(model)?;

    WebExporter::new(web_dir(&cfg.output_dir)).export(model, model_cfg)?;

    tracing::info!("Export written to '{}'", cfg.output_dir);
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use tempfile::tempdir;

    fn tiny_config(corpus: &Path, out: &Path) -> TrainConfig {
        TrainConfig {
            corpus:        corpus.display().to_string(),
            output_dir:    out.display().to_string(),
            window_length: 2,
            max_vocab:     50,
            embedding_dim: 4,
            hidden_dim:    8,
            epochs:        2,
            batch_size:    4,
            seed:          Some(3),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_prepare_from_single_file() {
        let dir    = tempdir().unwrap();
        let corpus = dir.path().join("cleaned.txt");
        fs::write(&corpus, "Der Hund bellt laut. Die Katze schläft ruhig heute").unwrap();

        let prepared = TrainUseCase::new(tiny_config(&corpus, dir.path())).prepare().unwrap();
        assert_eq!(prepared.file_count, 1);
        // Normalizing removes the period, leaving one unit of 9 tokens
        assert_eq!(prepared.samples.len(), 7);
        assert!(prepared.vocabulary.index_of("hund") > 1);
    }

    #[test]
    fn test_prepare_walks_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("corpus/sub")).unwrap();
        fs::write(dir.path().join("corpus/a.txt"), "eins zwei drei").unwrap();
        fs::write(dir.path().join("corpus/sub/b.txt"), "vier fuenf sechs").unwrap();

        let cfg      = tiny_config(&dir.path().join("corpus"), dir.path());
        let prepared = TrainUseCase::new(cfg).prepare().unwrap();
        assert_eq!(prepared.file_count, 2);
        // The newline between files is plain whitespace, not a unit boundary
        assert_eq!(prepared.samples.len(), 4);
    }

    #[test]
    fn test_empty_corpus_is_fatal() {
        let dir    = tempdir().unwrap();
        let corpus = dir.path().join("cleaned.txt");
        fs::write(&corpus, "123 !!! ...").unwrap();

        let err = TrainUseCase::new(tiny_config(&corpus, dir.path())).prepare().unwrap_err();
        assert_eq!(err.downcast_ref::<PipelineError>(), Some(&PipelineError::EmptyCorpus));
    }

    #[test]
    fn test_window_longer_than_every_unit_is_fatal() {
        let dir    = tempdir().unwrap();
        let corpus = dir.path().join("cleaned.txt");
        fs::write(&corpus, "Kurz. Da").unwrap();

        let err = TrainUseCase::new(tiny_config(&corpus, dir.path())).prepare().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::EmptyTrainingSet { window_length: 2, units: 1 })
        ));
    }

    #[test]
    fn test_missing_corpus_file_is_fatal() {
        let dir = tempdir().unwrap();
        let cfg = tiny_config(&dir.path().join("absent.txt"), dir.path());
        let err = TrainUseCase::new(cfg).prepare().unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::MissingCorpus(_))));
    }

    #[test]
    fn test_verification_sample_is_bounded() {
        let unit = (0..1000).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let sample = verification_sample(&unit, VERIFY_TOKENS);
        assert_eq!(sample.split_whitespace().count(), VERIFY_TOKENS);
        assert!(sample.starts_with("w0 w1 w2"));
        assert_eq!(verification_sample("kurz und gut", VERIFY_TOKENS), "kurz und gut");
    }

    #[test]
    fn test_full_run_writes_every_artefact() {
        let dir    = tempdir().unwrap();
        let corpus = dir.path().join("cleaned.txt");
        let out    = dir.path().join("export");
        fs::write(&corpus, "der hund bellt laut. der hund bellt leise. die katze schläft").unwrap();

        let outcome = TrainUseCase::new(tiny_config(&corpus, &out))
            .execute_on::<Autodiff<NdArray>>(Default::default())
            .unwrap();

        for name in [
            "vocab.json", "tokenizer.json", "config.json", "train_config.json",
            "model_compact.mpk", "model.bin", "metrics.csv", "evaluation.json",
            "web_model/model.json",
        ] {
            assert!(out.join(name).exists(), "missing {name}");
        }

        // The persisted window length is the one the windows were built with
        let sidecars = TokenizerStore::new(&out);
        assert_eq!(sidecars.load_window_config().unwrap().window_length, 2);
        assert_eq!(sidecars.load_vocabulary().unwrap(), outcome.vocabulary);
        assert_eq!(ModelStore::new(&out).load_config().unwrap().seed, Some(3));

        // 11 tokens in one unit
        assert_eq!(outcome.evaluation.examples, 9);
        assert_eq!(outcome.window_length, 2);
    }
}
