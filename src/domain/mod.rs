// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits that describe what the pipeline
// works with. Nothing in here touches burn, the network, or the
// filesystem:
//
//   document.rs   — one raw text file loaded from disk
//   vocabulary.rs — the fitted token <-> index mapping
//   error.rs      — pipeline-level failures callers can match on
//   traits.rs     — seams implemented by the outer layers
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// A raw document loaded from disk
pub mod document;

/// Bidirectional word-level vocabulary with an OOV slot
pub mod vocabulary;

/// Typed pipeline errors
pub mod error;

/// Core abstractions (traits) that other layers implement
pub mod traits;
