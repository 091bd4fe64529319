// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, so each
// stage can be tested with an in-memory stand-in:
//   - TextTreeLoader        implements DocumentSource
//   - HttpArchiveSource     implements ArchiveSource
//   - Inferencer            implements NextTokenPredictor
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::document::Document;

// ─── DocumentSource ───────────────────────────────────────────────────────────
/// Any component that can load the raw documents of a corpus.
pub trait DocumentSource {
    /// Load all available documents from this source.
    fn load_all(&self) -> Result<Vec<Document>>;
}

// ─── ArchiveSource ────────────────────────────────────────────────────────────
/// Anything that can hand back the bytes of a remote archive.
pub trait ArchiveSource {
    /// Download the whole body behind `url` into memory.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

// ─── NextTokenPredictor ───────────────────────────────────────────────────────
/// A trained next-token model seen from the query side.
pub trait NextTokenPredictor {
    /// Given exactly `window_length` vocabulary indices, return a
    /// probability for every vocabulary index (length = class count).
    fn next_token_distribution(&self, context: &[u32]) -> Result<Vec<f32>>;
}
