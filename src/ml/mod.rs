// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model math lives here. The other layers hand in
// WindowSamples and get back probabilities.
//
//   model.rs      — Embedding → LSTM (sequence) → LSTM (final
//                   state) → Linear over the vocabulary
//
//   trainer.rs    — Epoch loop: forward pass, categorical
//                   cross-entropy on one-hot targets, backward
//                   pass, Adam step
//
//   evaluator.rs  — Top-k accuracy and perplexity of a fitted
//                   model over a set of windows
//
//   inferencer.rs — Wraps a fitted model as a NextTokenPredictor
//                   for the query loop
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Word-level LSTM next-token model
pub mod model;

/// Training loop
pub mod trainer;

/// Top-k accuracy / perplexity scoring
pub mod evaluator;

/// Inference engine: single-window forward passes
pub mod inferencer;
