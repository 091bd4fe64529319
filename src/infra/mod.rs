// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the network or writes artefacts:
//
//   http_source.rs     — Blocking download of the corpus archive
//                        (implements ArchiveSource)
//
//   archive.rs         — In-memory ZIP extraction
//
//   tokenizer_store.rs — vocab.json, tokenizer.json and the
//                        { "windowLength": W } config sidecar
//
//   checkpoint.rs      — Model weights in burn's two native
//                        formats plus train_config.json
//
//   web_export.rs      — Portable topology JSON + weight shards
//                        and the post-export sanity check
//
//   metrics.rs         — Per-epoch CSV and evaluation.json
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Records and Checkpointing)

/// HTTP download of the corpus archive
pub mod http_source;

/// ZIP extraction
pub mod archive;

/// Vocabulary, tokenizer and window-length sidecars
pub mod tokenizer_store;

/// Native model formats and training config
pub mod checkpoint;

/// Portable export for other runtimes
pub mod web_export;

/// Training metrics CSV logger
pub mod metrics;
