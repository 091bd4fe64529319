// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a file on disk and a tensor batch.
//
//   input.txt                   corpus tree (*.txt)
//       │                             │
//       ▼                             ▼
//   LineCleaner               TextTreeLoader   → Documents
//       │                             │
//       ▼                             ▼
//   cleaned.txt               Normalizer       → one normalized blob
//                                     │
//                                     ▼
//                             SequenceBuilder  → (context, target) windows
//                                     │
//                                     ▼
//                             WindowDataset    → burn Dataset
//                                     │
//                                     ▼
//                             WindowBatcher    → one-hot tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Removes leading line numbers from a text file
pub mod line_cleaner;

/// Walks a directory tree and reads the text files in it
pub mod loader;

/// Lowercases and filters text down to the fixed alphabet
pub mod preprocessor;

/// Cuts the normalized corpus into sliding training windows
pub mod sequencer;

/// Implements Burn's Dataset trait for training windows
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
