// ============================================================
// Layer 4 — Sequence Builder
// ============================================================
// Turns the normalized corpus into fixed-width training windows.
//
//   corpus ──split on '.'──► sentence units
//   unit   ──vocabulary───► [i0, i1, ..., iL-1]
//   ids    ──slide W──────► ([i0..iW-1] → iW), ([i1..iW] → iW+1), ...
//
// A unit of L tokens yields exactly L − W windows when L > W and
// none otherwise. A corpus that yields no window at all cannot
// be trained on and is reported as an error.
//
// Example with W = 2, unit "a b c d":
//   [a b] → c
//   [b c] → d

use crate::data::dataset::WindowSample;
use crate::domain::error::PipelineError;
use crate::domain::vocabulary::Vocabulary;

#[derive(Debug, Clone, Copy)]
pub struct SequenceBuilder {
    window_length: usize,
}

impl SequenceBuilder {
    pub fn new(window_length: usize) -> Result<Self, PipelineError> {
        if window_length == 0 {
            return Err(PipelineError::InvalidWindowLength(window_length));
        }
        Ok(Self { window_length })
    }

    /// Slide the window over one tokenized unit.
    pub fn windows(&self, ids: &[u32]) -> Vec<WindowSample> {
        let w = self.window_length;
        (w..ids.len())
            .map(|i| WindowSample::new(ids[i - w..i].to_vec(), ids[i]))
            .collect()
    }

    /// Build every training window of the corpus.
    pub fn build(&self, corpus: &str, vocab: &Vocabulary) -> Result<Vec<WindowSample>, PipelineError> {
        let mut samples = Vec::new();
        let mut units   = 0usize;

        for unit in sentence_units(corpus) {
            units += 1;
            samples.extend(self.windows(&vocab.encode(unit)));
        }

        if samples.is_empty() {
            return Err(PipelineError::EmptyTrainingSet {
                window_length: self.window_length,
                units,
            });
        }

        tracing::debug!("{} sentence units → {} windows", units, samples.len());
        Ok(samples)
    }
}

/// Period-delimited pieces of the corpus. Empty pieces are skipped.
pub fn sentence_units(corpus: &str) -> impl Iterator<Item = &str> {
    corpus.split('.').filter(|unit| !unit.trim().is_empty())
}

/// Expand a target index into a one-hot row of `width` floats.
pub fn one_hot(target: u32, width: usize) -> Vec<f32> {
    let mut row = vec![0.0f32; width];
    if let Some(slot) = row.get_mut(target as usize) {
        *slot = 1.0;
    }
    row
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_windows_slide_one_token_at_a_time() {
        let b = SequenceBuilder::new(2).unwrap();
        let w = b.windows(&[5, 6, 7, 8]);
        assert_eq!(w.len(), 2);
        assert_eq!(w[0].context, vec![5, 6]);
        assert_eq!(w[0].target, 7);
        assert_eq!(w[1].context, vec![6, 7]);
        assert_eq!(w[1].target, 8);
    }

    #[test]
    fn test_short_units_contribute_nothing() {
        let b = SequenceBuilder::new(3).unwrap();
        assert!(b.windows(&[1, 2, 3]).is_empty());
        assert!(b.windows(&[1]).is_empty());
        assert!(b.windows(&[]).is_empty());
    }

    #[test]
    fn test_build_respects_sentence_boundaries() {
        let corpus = "a b c. d e f g";
        let vocab  = Vocabulary::fit_corpus(corpus, 100);
        let b      = SequenceBuilder::new(2).unwrap();

        let samples = b.build(corpus, &vocab).unwrap();
        // "a b c" → 1 window, "d e f g" → 2 windows, none across the '.'
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].target, vocab.index_of("c"));
        assert_eq!(samples[1].context, vec![vocab.index_of("d"), vocab.index_of("e")]);
    }

    #[test]
    fn test_unknown_tokens_map_to_oov() {
        let vocab  = Vocabulary::fit_corpus("a a b", 1);
        let b      = SequenceBuilder::new(1).unwrap();
        let samples = b.build("a b a", &vocab).unwrap();
        assert_eq!(samples[0].target, crate::domain::vocabulary::OOV_INDEX);
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let vocab = Vocabulary::fit_corpus("", 10);
        let b     = SequenceBuilder::new(2).unwrap();
        assert_eq!(
            b.build("", &vocab).unwrap_err(),
            PipelineError::EmptyTrainingSet { window_length: 2, units: 0 }
        );
    }

    #[test]
    fn test_window_too_long_is_an_error() {
        let corpus = "eins zwei. drei vier fuenf";
        let vocab  = Vocabulary::fit_corpus(corpus, 10);
        let b      = SequenceBuilder::new(3).unwrap();
        assert_eq!(
            b.build(corpus, &vocab).unwrap_err(),
            PipelineError::EmptyTrainingSet { window_length: 3, units: 2 }
        );
    }

    #[test]
    fn test_zero_window_rejected() {
        assert_eq!(
            SequenceBuilder::new(0).unwrap_err(),
            PipelineError::InvalidWindowLength(0)
        );
    }

    #[test]
    fn test_one_hot() {
        assert_eq!(one_hot(2, 4), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(one_hot(9, 3), vec![0.0, 0.0, 0.0]);
    }

    proptest! {
        #[test]
        fn prop_window_count_is_length_minus_width(len in 0usize..60, w in 1usize..20) {
            let b   = SequenceBuilder::new(w).unwrap();
            let ids: Vec<u32> = (0..len as u32).collect();
            prop_assert_eq!(b.windows(&ids).len(), len.saturating_sub(w));
        }
    }
}
