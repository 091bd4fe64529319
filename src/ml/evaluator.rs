// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Scores a fitted model on a set of windows:
//   - top-1/5/10/20/100 accuracy: is the true next token
//     among the k most probable ones (ties ranked by index)?
//   - perplexity: exp of the mean negative log-probability of
//     the true token, probabilities floored at 1e-8
//
// The per-row bookkeeping is plain Rust (EvalAccumulator) so it
// is tested without a backend; `evaluate` only feeds it rows.

use anyhow::Result;
use burn::{data::dataloader::batcher::Batcher, prelude::*};
use serde::{Deserialize, Serialize};

use crate::data::{batcher::WindowBatcher, dataset::WindowSample};
use crate::ml::model::NextWordModel;

const TOP_KS: [usize; 5] = [1, 5, 10, 20, 100];
const MIN_PROBABILITY: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub examples:   usize,
    pub top1:       f64,
    pub top5:       f64,
    pub top10:      f64,
    pub top20:      f64,
    pub top100:     f64,
    pub perplexity: f64,
}

#[derive(Debug, Default)]
pub struct EvalAccumulator {
    examples: usize,
    hits:     [usize; TOP_KS.len()],
    nll_sum:  f64,
}

impl EvalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one probability row and the index of the true token.
    pub fn add(&mut self, probs: &[f32], target: usize) {
        let p_target = probs.get(target).copied().unwrap_or(0.0);

        // Rows ranked ahead of the target: higher probability, or equal with a lower index
        let rank = probs
            .iter()
            .enumerate()
            .filter(|&(i, &p)| p > p_target || (p == p_target && i < target))
            .count();

        for (slot, &k) in TOP_KS.iter().enumerate() {
            if rank < k {
                self.hits[slot] += 1;
            }
        }

        self.nll_sum  -= f64::from(p_target).max(MIN_PROBABILITY).ln();
        self.examples += 1;
    }

    pub fn finish(&self) -> EvalReport {
        let n    = self.examples.max(1) as f64;
        let rate = |slot: usize| self.hits[slot] as f64 / n;
        EvalReport {
            examples:   self.examples,
            top1:       rate(0),
            top5:       rate(1),
            top10:      rate(2),
            top20:      rate(3),
            top100:     rate(4),
            perplexity: if self.examples == 0 { f64::NAN } else { (self.nll_sum / n).exp() },
        }
    }
}

/// Run the model over `samples` in chunks of `batch_size`.
pub fn evaluate<B: Backend>(
    model:      &NextWordModel<B>,
    samples:    &[WindowSample],
    batcher:    &WindowBatcher<B>,
    batch_size: usize,
) -> Result<EvalReport> {
    let mut acc = EvalAccumulator::new();

    for chunk in samples.chunks(batch_size.max(1)) {
        let batch = batcher.batch(chunk.to_vec());
        let probs: Vec<f32> = model
            .forward_probs(batch.contexts)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities: {e:?}"))?;

        let width = batcher.class_count;
        for (row, sample) in probs.chunks(width).zip(chunk) {
            acc.add(row, sample.target as usize);
        }
    }

    let report = acc.finish();
    tracing::info!(
        "Evaluation on {} windows: top1={:.1}% top5={:.1}% top10={:.1}% top20={:.1}% top100={:.1}% perplexity={:.2}",
        report.examples,
        report.top1 * 100.0,
        report.top5 * 100.0,
        report.top10 * 100.0,
        report.top20 * 100.0,
        report.top100 * 100.0,
        report.perplexity,
    );
    Ok(report)
}
