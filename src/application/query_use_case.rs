// ============================================================
// Layer 2 — Query Use Case
// ============================================================
// Interactive next-word loop over a trained model.
//
// One QueryContext is built per process (from an export
// directory, or straight from a training run) and borrowed by
// every query:
//
//   text ──Normalizer──► tokens ──Vocabulary──► indices
//        ──keep last W, left-pad with 0──► context ──predictor──► probs
//
// Per input line the loop prints:
//   - the top-k next tokens with their probabilities
//   - the single best suggestion
//   - a greedy continuation of up to N tokens, which stops early
//     as soon as the best index has no token (e.g. padding)
//
// The loop ends on the exit keyword (any case) or end of input;
// neither reaches the predictor.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::Path;
use burn::prelude::*;

use crate::data::preprocessor::Normalizer;
use crate::domain::{
    error::PipelineError,
    traits::NextTokenPredictor,
    vocabulary::{Vocabulary, PAD_INDEX},
};
use crate::infra::{checkpoint::ModelStore, tokenizer_store::TokenizerStore};
use crate::ml::inferencer::{InferBackend, Inferencer};

pub const EXIT_KEYWORD:   &str = "exit";
pub const UNKNOWN_MARKER: &str = "<UNK>";

#[derive(Debug, Clone, Copy)]
pub struct QuerySettings {
    /// How many ranked predictions to print
    pub top_k:        usize,
    /// Maximum number of tokens the greedy continuation adds
    pub continuation: usize,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self { top_k: 5, continuation: 20 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub index:       u32,
    pub token:       String,
    pub probability: f32,
}

pub struct QueryContext<P: NextTokenPredictor> {
    vocabulary:    Vocabulary,
    window_length: usize,
    normalizer:    Normalizer,
    predictor:     P,
    settings:      QuerySettings,
}

impl<P: NextTokenPredictor> QueryContext<P> {
    pub fn new(
        vocabulary:    Vocabulary,
        window_length: usize,
        predictor:     P,
        settings:      QuerySettings,
    ) -> Result<Self, PipelineError> {
        if window_length == 0 {
            return Err(PipelineError::InvalidWindowLength(window_length));
        }
        Ok(Self {
            vocabulary,
            window_length,
            normalizer: Normalizer::new(),
            predictor,
            settings,
        })
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// Normalize and map `text` to indices (unknown tokens → OOV).
    pub fn encode_text(&self, text: &str) -> Vec<u32> {
        self.vocabulary.encode(&self.normalizer.clean(text))
    }

    /// The last `window_length` indices, left-padded with PAD_INDEX.
    pub fn window(&self, ids: &[u32]) -> Vec<u32> {
        let w     = self.window_length;
        let tail  = &ids[ids.len().saturating_sub(w)..];
        let mut c = vec![PAD_INDEX; w - tail.len()];
        c.extend_from_slice(tail);
        c
    }

    pub fn encode_context(&self, text: &str) -> Vec<u32> {
        self.window(&self.encode_text(text))
    }

    /// The `k` most probable next tokens, ties broken by lower index.
    pub fn top_k(&self, text: &str, k: usize) -> Result<Vec<Prediction>> {
        let probs = self.predictor.next_token_distribution(&self.encode_context(text))?;
        Ok(rank(&probs)
            .into_iter()
            .take(k)
            .map(|(index, probability)| Prediction {
                index,
                token: self.vocabulary.token(index).unwrap_or(UNKNOWN_MARKER).to_string(),
                probability,
            })
            .collect())
    }

    /// The single most probable next token.
    pub fn suggest(&self, text: &str) -> Result<Option<Prediction>> {
        Ok(self.top_k(text, 1)?.into_iter().next())
    }

    /// Append the argmax token up to `steps` times. Stops as soon
    /// as the argmax index has no token in the vocabulary.
    pub fn continue_greedy(&self, seed: &str, steps: usize) -> Result<String> {
        let mut output = seed.trim().to_string();
        let mut ids    = self.encode_text(seed);

        for _ in 0..steps {
            let probs = self.predictor.next_token_distribution(&self.window(&ids))?;
            let Some(&(index, _)) = rank(&probs).first() else { break };
            let Some(token) = self.vocabulary.token(index) else { break };

            if !output.is_empty() {
                output.push(' ');
            }
            output.push_str(token);
            ids.push(index);
        }

        Ok(output)
    }

    /// Read queries line by line until `exit` or end of input.
    /// Returns the number of queries answered.
    pub fn run<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<usize> {
        writeln!(writer, "Type a start text (or '{EXIT_KEYWORD}' to quit).")?;
        let mut answered = 0usize;
        let mut line     = String::new();

        loop {
            write!(writer, "\n> ")?;
            writer.flush()?;

            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let seed = line.trim();
            if seed.eq_ignore_ascii_case(EXIT_KEYWORD) {
                break;
            }

            writeln!(writer, "\nTop-{} next words:", self.settings.top_k)?;
            for p in self.top_k(seed, self.settings.top_k)? {
                writeln!(writer, "  {:<15} {:.2}%", p.token, p.probability * 100.0)?;
            }

            let suggestion = self.suggest(seed)?.map(|p| p.token).unwrap_or_default();
            writeln!(writer, "\nSuggestion (top-1): {suggestion}")?;

            writeln!(writer, "\nContinuation ({} words):", self.settings.continuation)?;
            writeln!(writer, "{}", self.continue_greedy(seed, self.settings.continuation)?)?;

            answered += 1;
        }

        tracing::debug!("Query loop finished after {} queries", answered);
        Ok(answered)
    }
}

/// (index, probability) pairs by descending probability, then index.
fn rank(probs: &[f32]) -> Vec<(u32, f32)> {
    let mut ranked: Vec<(u32, f32)> = probs.iter().enumerate().map(|(i, &p)| (i as u32, p)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

// ─── Loading from an export directory ────────────────────────────────────────
/// Rebuild the query context from the files `train` wrote.
pub fn load_query_context(
    export_dir: &Path,
    settings:   QuerySettings,
) -> Result<QueryContext<Inferencer<InferBackend>>> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    load_query_context_on::<InferBackend>(export_dir, settings, device)
}

pub fn load_query_context_on<B: Backend>(
    export_dir: &Path,
    settings:   QuerySettings,
    device:     B::Device,
) -> Result<QueryContext<Inferencer<B>>> {
    let sidecars   = TokenizerStore::new(export_dir);
    let window     = sidecars.load_window_config()?.window_length;
    let vocabulary = sidecars.load_vocabulary()?;

    let store     = ModelStore::new(export_dir);
    let train_cfg = store.load_config()?;
    if train_cfg.window_length != window {
        return Err(PipelineError::WindowLengthMismatch {
            trained:    train_cfg.window_length,
            configured: window,
        }
        .into());
    }

    let model_cfg = train_cfg.model_config(vocabulary.class_count());
    let model     = store.load_model(model_cfg.init::<B>(&device), &device)?;
    tracing::info!(
        "Loaded model from '{}' ({} classes, window {})",
        export_dir.display(), model_cfg.class_count, window,
    );

    Ok(QueryContext::new(vocabulary, window, Inferencer::new(model, device), settings)?)
}
